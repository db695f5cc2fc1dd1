use super::{error_response, AppState};
use crate::settings::{Settings, Theme, ViewLayout};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Partial update body; only fields present are changed.
#[derive(Deserialize)]
pub struct SettingsUpdate {
    pub prefix: Option<String>,
    pub theme: Option<Theme>,
    pub view: Option<ViewLayout>,
}

/// Create settings router
pub fn create_settings_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/settings/theme/toggle", post(toggle_theme))
        .with_state(state)
}

fn current_settings(state: &AppState) -> Result<Settings, Response> {
    let prefix = state.monitor.read(|m| m.prefix().to_string());
    state.settings.load(&prefix).map_err(|e| {
        warn!(error = %e, "Failed to load settings");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load settings")
    })
}

fn settings_response(state: &AppState) -> Response {
    match current_settings(state) {
        Ok(settings) => Json(settings).into_response(),
        Err(response) => response,
    }
}

/// GET /api/settings
async fn get_settings(State(state): State<Arc<AppState>>) -> Response {
    settings_response(&state)
}

/// PUT /api/settings
///
/// A prefix change resets the whole session.
async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    if let Some(prefix) = update.prefix {
        let current = state.monitor.read(|m| m.prefix().to_string());
        if prefix != current {
            if let Err(e) = state.monitor.change_prefix(&prefix) {
                return e.into_response();
            }
            if let Err(e) = state.settings.save_prefix(&prefix) {
                warn!(error = %e, "Failed to persist prefix");
            }
        }
    }

    if let Some(theme) = update.theme {
        if let Err(e) = state.settings.save_theme(theme) {
            warn!(error = %e, "Failed to persist theme");
        }
    }

    if let Some(view) = update.view {
        if let Err(e) = state.settings.save_view(view) {
            warn!(error = %e, "Failed to persist layout");
        }
    }

    settings_response(&state)
}

/// POST /api/settings/theme/toggle
async fn toggle_theme(State(state): State<Arc<AppState>>) -> Response {
    let settings = match current_settings(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let theme = settings.theme.toggled();
    if let Err(e) = state.settings.save_theme(theme) {
        warn!(error = %e, "Failed to persist theme");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to save theme");
    }
    info!(theme = theme.as_str(), "Theme toggled");

    settings_response(&state)
}
