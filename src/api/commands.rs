use super::{error_response, AppState};
use crate::commands::{ApiLog, CommandForm, CommandKind};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Serialize)]
struct CommandResponse {
    command: CommandKind,
    endpoint: String,
    response: Value,
}

#[derive(Serialize)]
struct ModeResponse {
    prefix: String,
    mode: String,
}

#[derive(Serialize)]
struct SavedLog {
    path: String,
}

/// Create manager command router
pub fn create_commands_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/commands/mode", get(get_mode))
        .route("/api/commands/log", get(get_log).delete(clear_log))
        .route("/api/commands/log/save", post(save_log))
        .route("/api/commands/:command", post(run_command))
        .with_state(state)
}

/// POST /api/commands/:command - init, start, stop or update
///
/// Inputs are validated before anything reaches the manager. Manager
/// failures come back as 502 with the recorded error text.
async fn run_command(
    State(state): State<Arc<AppState>>,
    Path(command): Path<String>,
    Json(form): Json<CommandForm>,
) -> Response {
    let kind: CommandKind = match serde_json::from_value(Value::String(command.clone())) {
        Ok(kind) => kind,
        Err(_) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("unknown command '{}'", command),
            );
        }
    };

    let request = match form.into_request(kind) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let prefix = state.monitor.read(|m| m.prefix().to_string());
    match state.console.run(&prefix, request).await {
        Ok(response) => Json(CommandResponse {
            command: kind,
            endpoint: kind.endpoint(&prefix),
            response,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

/// GET /api/commands/mode - execution mode reported by the manager
async fn get_mode(State(state): State<Arc<AppState>>) -> Response {
    let prefix = state.monitor.read(|m| m.prefix().to_string());
    match state.console.client().mode(&prefix).await {
        Ok(mode) => Json(ModeResponse { prefix, mode }).into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

/// GET /api/commands/log
async fn get_log(State(state): State<Arc<AppState>>) -> Response {
    let log: ApiLog = state.console.log();
    Json(log).into_response()
}

/// DELETE /api/commands/log
async fn clear_log(State(state): State<Arc<AppState>>) -> Response {
    state.console.clear_log();
    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/commands/log/save - write the log into the export directory
async fn save_log(State(state): State<Arc<AppState>>) -> Response {
    match state.console.log().save_to_dir(&state.export_dir, Utc::now()) {
        Ok(path) => {
            info!(path = %path.display(), "Saved API log");
            (
                StatusCode::CREATED,
                Json(SavedLog {
                    path: path.display().to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to save API log");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to save API log")
        }
    }
}
