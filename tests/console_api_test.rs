// Integration tests for the console HTTP API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use testbed_monitor::api::{create_router, AppState};
use testbed_monitor::bus::ConnectionStatus;
use testbed_monitor::commands::{CommandConsole, ManagerApiConfig, ManagerClient};
use testbed_monitor::message::BusEvent;
use testbed_monitor::settings::SettingsStore;
use testbed_monitor::state::{Monitor, MonitorHandle, DEFAULT_MAX_COUNT};
use tokio::sync::watch;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    monitor: MonitorHandle,
    settings: Arc<SettingsStore>,
    export_dir: TempDir,
    _connection_tx: watch::Sender<ConnectionStatus>,
}

fn create_test_app(manager_url: &str) -> TestApp {
    let settings = Arc::new(SettingsStore::in_memory().unwrap());
    let monitor = MonitorHandle::new(Monitor::new("run42", 1, DEFAULT_MAX_COUNT));
    let client = ManagerClient::new(&ManagerApiConfig {
        base_url: manager_url.to_string(),
        ..Default::default()
    })
    .unwrap();
    let console = Arc::new(CommandConsole::new(client, Arc::clone(&settings)));
    let (connection_tx, connection_rx) = watch::channel(ConnectionStatus::Connected);
    let export_dir = TempDir::new().unwrap();

    let state = Arc::new(AppState {
        monitor: monitor.clone(),
        console,
        settings: Arc::clone(&settings),
        connection: connection_rx,
        export_dir: export_dir.path().to_path_buf(),
    });

    TestApp {
        router: create_router(state),
        monitor,
        settings,
        export_dir,
        _connection_tx: connection_tx,
    }
}

fn feed_run(monitor: &MonitorHandle) {
    monitor.ingest(BusEvent::json("run42/a", &json!({"x": 1})));
    monitor.ingest(BusEvent::json(
        "run42-manager/time",
        &json!({"properties": {"simTime": "2024-01-01T00:00:00.000Z", "time": "2024-05-01T12:00:00Z", "timeScalingFactor": 60}}),
    ));
    monitor.ingest(BusEvent::json("run42/b", &json!({"x": 2})));
    monitor.ingest(BusEvent::json("run42/c", &json!({"x": 3})));
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn topics(logs: &Value) -> Vec<&str> {
    logs.as_array()
        .unwrap()
        .iter()
        .map(|m| m["topic"].as_str().unwrap())
        .collect()
}

/// Display window is newest first and capped by the panel's max count.
#[tokio::test]
async fn test_logs_newest_first_with_max_count() {
    let app = create_test_app("http://127.0.0.1:9");
    feed_run(&app.monitor);

    let (status, view) =
        send_json(&app, "PUT", "/api/views/0/count", Some(json!({"maxCount": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["maxCount"], 2);

    let (status, logs) = send_json(&app, "GET", "/api/views/0/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics(&logs), vec!["run42/c", "run42/b"]);
}

/// Noise and excluded topics never reach the display or the topic selector.
#[tokio::test]
async fn test_exclusion_and_selection() {
    let app = create_test_app("http://127.0.0.1:9");
    feed_run(&app.monitor);

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/views/0/exclusion",
        Some(json!({"topics": ["run42/b"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, logs) = send_json(&app, "GET", "/api/views/0/logs", None).await;
    assert_eq!(topics(&logs), vec!["run42/c", "run42/a"]);

    let (_, available) = send_json(&app, "GET", "/api/views/0/topics", None).await;
    assert_eq!(available, json!(["run42/a", "run42/c", "run42/#"]));

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/views/0/selection",
        Some(json!({"topics": ["run42/a"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, logs) = send_json(&app, "GET", "/api/views/0/logs", None).await;
    assert_eq!(topics(&logs), vec!["run42/a"]);
}

#[tokio::test]
async fn test_invalid_topic_and_missing_view() {
    let app = create_test_app("http://127.0.0.1:9");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/views/0/exclusion",
        Some(json!({"topics": ["run42/+"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(&app, "GET", "/api/views/3/logs", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Panel count changes are persisted.
#[tokio::test]
async fn test_view_count_persisted() {
    let app = create_test_app("http://127.0.0.1:9");

    let (status, body) = send_json(&app, "PUT", "/api/views", Some(json!({"count": 3}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["views"].as_array().unwrap().len(), 3);
    assert_eq!(app.settings.load("run42").unwrap().logs_count, 3);

    let (_, body) = send_json(&app, "PUT", "/api/views", Some(json!({"count": 0}))).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_status_header_and_connection() {
    let app = create_test_app("http://127.0.0.1:9");

    let (_, body) = send_json(&app, "GET", "/api/status", None).await;
    assert_eq!(body["header"], "Simulation Not Running");
    assert_eq!(body["connection"], "connected");
    assert_eq!(body["prefix"], "run42");

    feed_run(&app.monitor);

    let (status, body) = send_json(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["simTime"], "2024-01-01T00:00:00.000Z");
    assert_eq!(body["status"]["timeScalingFactor"], 60.0);
    assert_eq!(body["messageCount"], 4);
    assert!(body["header"]
        .as_str()
        .unwrap()
        .starts_with("Simulation Time: 2024-01-01T00:00:00 |"));
}

#[tokio::test]
async fn test_nodes_deduplicated() {
    let app = create_test_app("http://127.0.0.1:9");
    let node = json!({"name": "sat-1", "description": "Satellite", "properties": {"resource": "https://example.org/sat-1"}});
    app.monitor.ingest(BusEvent::json("run42/logs/info", &node));
    app.monitor.ingest(BusEvent::json("run42/logs/info", &node));

    let (_, body) = send_json(&app, "GET", "/api/nodes", None).await;
    let nodes = body.as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["name"], "sat-1");
    assert_eq!(nodes[0]["resource"], "https://example.org/sat-1");
}

#[tokio::test]
async fn test_export_download_txt() {
    let app = create_test_app("http://127.0.0.1:9");
    feed_run(&app.monitor);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/views/0/export?format=txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"logs-"));
    assert!(disposition.ends_with(".txt\""));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(r#" run42/c: {"x":3}"#));
    assert!(lines[2].ends_with(r#" run42/a: {"x":1}"#));
}

#[tokio::test]
async fn test_export_unknown_format() {
    let app = create_test_app("http://127.0.0.1:9");

    let (status, _) = send_json(&app, "GET", "/api/views/0/export?format=csv", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_saved_to_dir() {
    let app = create_test_app("http://127.0.0.1:9");
    feed_run(&app.monitor);

    let (status, body) =
        send_json(&app, "POST", "/api/views/0/export?format=json", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let path = std::path::PathBuf::from(body["path"].as_str().unwrap());
    assert!(path.starts_with(app.export_dir.path()));
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 3);
}

/// Changing the prefix persists it and starts a fresh session.
#[tokio::test]
async fn test_prefix_change_resets_session() {
    let app = create_test_app("http://127.0.0.1:9");
    feed_run(&app.monitor);

    let (status, body) =
        send_json(&app, "PUT", "/api/settings", Some(json!({"prefix": "run7"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prefix"], "run7");

    let (_, logs) = send_json(&app, "GET", "/api/views/0/logs", None).await;
    assert_eq!(logs, json!([]));
    let (_, available) = send_json(&app, "GET", "/api/views/0/topics", None).await;
    assert_eq!(available, json!(["run7/#"]));

    let (status, _) =
        send_json(&app, "PUT", "/api/settings", Some(json!({"prefix": "bad/prefix"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_theme_toggle() {
    let app = create_test_app("http://127.0.0.1:9");

    let (_, body) = send_json(&app, "GET", "/api/settings", None).await;
    assert_eq!(body["theme"], "default");

    let (status, body) = send_json(&app, "POST", "/api/settings/theme/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");
}

/// Invalid datetimes are rejected before the manager is called.
#[tokio::test]
async fn test_command_rejects_invalid_datetime() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/stop/run42")
        .expect(0)
        .create_async()
        .await;
    let app = create_test_app(&server.url());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/commands/stop",
        Some(json!({"simStopTime": "01/01/2024"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("simStopTime"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_command_sent_and_logged() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/init/run42")
        .match_body(mockito::Matcher::PartialJson(json!({
            "sim_start_time": "2024-01-01T00:00:00Z",
            "sim_stop_time": "2024-01-01T06:00:00Z"
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;
    let app = create_test_app(&server.url());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/commands/init",
        Some(json!({
            "simStartTime": "2024-01-01T00:00:00Z",
            "simStopTime": "2024-01-01T06:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoint"], "init/run42");
    assert_eq!(body["response"], json!({"ok": true}));
    mock.assert_async().await;

    let (_, log) = send_json(&app, "GET", "/api/commands/log", None).await;
    let records = log.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["command"], "init");
    assert_eq!(records[0]["outcome"]["status"], "success");

    let (_, status_body) = send_json(&app, "GET", "/api/status", None).await;
    assert_eq!(status_body["lastCommand"]["message"], "Success!");

    let (status, _) = send(&app, "DELETE", "/api/commands/log", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, log) = send_json(&app, "GET", "/api/commands/log", None).await;
    assert_eq!(log, json!([]));
}

#[tokio::test]
async fn test_command_rejected_by_manager() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/update/run42")
        .with_status(422)
        .with_body("bad scale")
        .create_async()
        .await;
    let app = create_test_app(&server.url());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/commands/update",
        Some(json!({"simUpdateTime": "2024-01-01T01:00:00Z", "timeScaleFactor": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Error: bad scale");
}

#[tokio::test]
async fn test_unknown_command() {
    let app = create_test_app("http://127.0.0.1:9");

    let (status, _) = send_json(&app, "POST", "/api/commands/reboot", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manager_mode() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/status/run42")
        .with_status(200)
        .with_body("\"EXECUTING\"")
        .create_async()
        .await;
    let app = create_test_app(&server.url());

    let (status, body) = send_json(&app, "GET", "/api/commands/mode", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prefix": "run42", "mode": "EXECUTING"}));
}
