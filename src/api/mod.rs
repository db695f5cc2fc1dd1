// Console HTTP and WebSocket APIs

pub mod commands;
pub mod settings;
pub mod status;
pub mod views;
pub mod websocket;

use crate::bus::ConnectionStatus;
use crate::commands::CommandConsole;
use crate::settings::SettingsStore;
use crate::state::{MonitorError, MonitorHandle};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

pub use commands::create_commands_router;
pub use settings::create_settings_router;
pub use status::create_status_router;
pub use views::create_views_router;
pub use websocket::{create_ws_router, ws_handler};

/// Shared application state for all console routes
pub struct AppState {
    pub monitor: MonitorHandle,
    pub console: Arc<CommandConsole>,
    pub settings: Arc<SettingsStore>,
    /// Bus connection status, published by the MQTT adapter
    pub connection: watch::Receiver<ConnectionStatus>,
    /// Directory for server-side log exports and API log saves
    pub export_dir: PathBuf,
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match self {
            MonitorError::ViewNotFound(_) => StatusCode::NOT_FOUND,
            MonitorError::Topic(_) => StatusCode::BAD_REQUEST,
        };
        error_response(status, self.to_string())
    }
}

/// Build the full console router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(create_views_router(state.clone()))
        .merge(create_status_router(state.clone()))
        .merge(create_settings_router(state.clone()))
        .merge(create_commands_router(state.clone()))
        .merge(create_ws_router(state))
        .layer(CorsLayer::permissive())
}
