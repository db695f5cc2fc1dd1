use super::{error_response, AppState};
use crate::export::{self, ExportFormat};
use crate::message::Message;
use crate::state::{LogView, MonitorError};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Serialize)]
struct ViewsResponse {
    count: usize,
    views: Vec<LogView>,
}

#[derive(Deserialize)]
pub struct ViewCountBody {
    pub count: usize,
}

#[derive(Deserialize)]
pub struct TopicsBody {
    pub topics: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxCountBody {
    pub max_count: usize,
}

#[derive(Deserialize)]
pub struct ExportParams {
    /// `txt` (default) or `json`
    pub format: Option<String>,
}

#[derive(Serialize)]
struct SavedExport {
    path: String,
}

/// Create log view router
pub fn create_views_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/views", get(get_views).put(put_view_count))
        .route("/api/views/:view/logs", get(get_logs))
        .route("/api/views/:view/topics", get(get_topics))
        .route("/api/views/:view/selection", put(put_selection))
        .route("/api/views/:view/exclusion", put(put_exclusion))
        .route("/api/views/:view/count", put(put_max_count))
        .route(
            "/api/views/:view/export",
            get(download_export).post(save_export),
        )
        .with_state(state)
}

fn views_response(state: &AppState) -> ViewsResponse {
    state.monitor.read(|m| ViewsResponse {
        count: m.views().len(),
        views: m.views().to_vec(),
    })
}

/// GET /api/views
async fn get_views(State(state): State<Arc<AppState>>) -> Response {
    Json(views_response(&state)).into_response()
}

/// PUT /api/views - set the number of log panels (persisted)
async fn put_view_count(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ViewCountBody>,
) -> Response {
    let count = state.monitor.write(|m| m.set_view_count(body.count));
    if let Err(e) = state.settings.save_logs_count(count) {
        warn!(error = %e, "Failed to persist panel count");
    }
    info!(count = count, "Log panel count changed");

    Json(views_response(&state)).into_response()
}

/// GET /api/views/:view/logs
///
/// Returns the display window of a panel, newest first.
async fn get_logs(State(state): State<Arc<AppState>>, Path(view): Path<usize>) -> Response {
    match snapshot(&state, view) {
        Ok(messages) => Json(messages).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/views/:view/topics
async fn get_topics(State(state): State<Arc<AppState>>, Path(view): Path<usize>) -> Response {
    match state.monitor.read(|m| m.topics(view)) {
        Ok(topics) => Json(topics).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/views/:view/selection
async fn put_selection(
    State(state): State<Arc<AppState>>,
    Path(view): Path<usize>,
    Json(body): Json<TopicsBody>,
) -> Response {
    let result = state.monitor.write(|m| {
        m.set_selection(view, body.topics)?;
        m.view(view).cloned()
    });
    view_result(result)
}

/// PUT /api/views/:view/exclusion
async fn put_exclusion(
    State(state): State<Arc<AppState>>,
    Path(view): Path<usize>,
    Json(body): Json<TopicsBody>,
) -> Response {
    let result = state.monitor.write(|m| {
        m.set_exclusion(view, body.topics)?;
        m.view(view).cloned()
    });
    view_result(result)
}

/// PUT /api/views/:view/count
async fn put_max_count(
    State(state): State<Arc<AppState>>,
    Path(view): Path<usize>,
    Json(body): Json<MaxCountBody>,
) -> Response {
    let result = state.monitor.write(|m| {
        m.set_max_count(view, body.max_count)?;
        m.view(view).cloned()
    });
    view_result(result)
}

/// Copy of a panel's display window, taken under the read lock.
fn snapshot(state: &AppState, view: usize) -> Result<Vec<Message>, MonitorError> {
    state
        .monitor
        .read(|m| -> Result<Vec<Message>, MonitorError> {
            Ok(m.display(view)?.into_iter().cloned().collect())
        })
}

fn view_result(result: Result<LogView, MonitorError>) -> Response {
    match result {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_format(params: &ExportParams) -> Result<ExportFormat, Response> {
    params
        .format
        .as_deref()
        .unwrap_or("txt")
        .parse()
        .map_err(|e: anyhow::Error| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

/// GET /api/views/:view/export?format=txt|json
///
/// Downloads the current display window as an attachment.
async fn download_export(
    State(state): State<Arc<AppState>>,
    Path(view): Path<usize>,
    Query(params): Query<ExportParams>,
) -> Response {
    let format = match parse_format(&params) {
        Ok(f) => f,
        Err(response) => return response,
    };

    let rendered = state.monitor.read(|m| {
        m.display(view)
            .map(|display| export::render(format, &display))
    });

    match rendered {
        Ok(Ok(content)) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export::file_name(format, Utc::now())
            );
            (
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                content,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to render export");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to render export")
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/views/:view/export?format=txt|json
///
/// Writes the current display window into the export directory.
async fn save_export(
    State(state): State<Arc<AppState>>,
    Path(view): Path<usize>,
    Query(params): Query<ExportParams>,
) -> Response {
    let format = match parse_format(&params) {
        Ok(f) => f,
        Err(response) => return response,
    };

    let messages = match snapshot(&state, view) {
        Ok(messages) => messages,
        Err(e) => return e.into_response(),
    };
    let display: Vec<&Message> = messages.iter().collect();

    match export::write_to_dir(&state.export_dir, format, &display, Utc::now()) {
        Ok(path) => {
            info!(path = %path.display(), "Exported logs");
            (
                StatusCode::CREATED,
                Json(SavedExport {
                    path: path.display().to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to write export");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to write export")
        }
    }
}
