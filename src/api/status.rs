use super::AppState;
use crate::bus::ConnectionStatus;
use crate::commands::LastCommandStatus;
use crate::payload::{Node, Status};
use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    prefix: String,
    /// Header line shown above the logs
    header: String,
    status: Status,
    connection: ConnectionStatus,
    /// Banner of the last command, while still visible
    last_command: Option<LastCommandStatus>,
    message_count: usize,
}

#[derive(Serialize)]
struct NodeEntry {
    name: Option<String>,
    description: Option<String>,
    /// Openable resource link, if any
    resource: Option<String>,
    record: serde_json::Value,
}

impl From<&Node> for NodeEntry {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name().map(str::to_string),
            description: node.description().map(str::to_string),
            resource: node.resource().map(str::to_string),
            record: node.record().clone(),
        }
    }
}

/// Create status router
pub fn create_status_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/nodes", get(get_nodes))
        .with_state(state)
}

/// GET /api/status
async fn get_status(State(state): State<Arc<AppState>>) -> Response {
    let connection = *state.connection.borrow();
    let last_command = state.console.last_status(Utc::now());

    let response = state.monitor.read(|m| StatusResponse {
        prefix: m.prefix().to_string(),
        header: m.status().header_text(),
        status: m.status().clone(),
        connection,
        last_command,
        message_count: m.history().len(),
    });

    Json(response).into_response()
}

/// GET /api/nodes - discovered nodes in discovery order
async fn get_nodes(State(state): State<Arc<AppState>>) -> Response {
    let nodes: Vec<NodeEntry> = state
        .monitor
        .read(|m| m.nodes().iter().map(NodeEntry::from).collect());

    Json(nodes).into_response()
}
