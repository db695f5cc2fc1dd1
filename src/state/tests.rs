use super::*;
use crate::message::BusEvent;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn feed(monitor: &mut Monitor, events: &[(&str, serde_json::Value)]) {
    for (i, (topic, payload)) in events.iter().enumerate() {
        monitor.ingest_at(BusEvent::json(*topic, payload), at(i as i64));
    }
}

fn display_topics(monitor: &Monitor, view: usize) -> Vec<String> {
    monitor
        .display(view)
        .unwrap()
        .iter()
        .map(|m| m.topic.clone())
        .collect()
}

#[test]
fn test_run_scenario_end_to_end() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    monitor.set_max_count(0, 2).unwrap();

    feed(
        &mut monitor,
        &[
            ("run42/a", json!({"x": 1})),
            (
                "run42-manager/time",
                json!({"properties": {"simTime": "2024-01-01T00:00:00Z"}}),
            ),
            ("run42/b", json!({"x": 2})),
            ("run42/c", json!({"x": 3})),
        ],
    );

    assert_eq!(display_topics(&monitor, 0), vec!["run42/c", "run42/b"]);
    assert_eq!(monitor.history().len(), 4);
    assert_eq!(
        monitor.status().sim_time.as_deref(),
        Some("2024-01-01T00:00:00Z")
    );
}

#[test]
fn test_default_view_selects_run_wildcard() {
    let monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    let view = monitor.view(0).unwrap();

    assert!(view.selection.contains("run42/#"));
    assert!(view.exclusion.is_empty());
    assert_eq!(view.max_count, 200);
    assert_eq!(monitor.topics(0).unwrap(), vec!["run42/#"]);
}

#[test]
fn test_history_is_unbounded_window_is_not() {
    let mut monitor = Monitor::new("run42", 1, 5);
    for i in 0..20 {
        monitor.ingest_at(BusEvent::json("run42/a", &json!({ "i": i })), at(i));
    }

    assert_eq!(monitor.history().len(), 20);
    assert_eq!(monitor.display(0).unwrap().len(), 5);
    assert_eq!(monitor.display(0).unwrap()[0].payload, json!({"i": 19}));
}

#[test]
fn test_status_replaced_wholesale() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[
            (
                "run42-manager/time",
                json!({"properties": {"simTime": "T1", "timeScalingFactor": 10}}),
            ),
            ("run42-manager/time", json!({"properties": {"simTime": "T2"}})),
        ],
    );

    let status = monitor.status();
    assert_eq!(status.sim_time.as_deref(), Some("T2"));
    assert_eq!(status.time_scaling_factor, None);
}

#[test]
fn test_malformed_status_keeps_previous() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[(
            "run42-manager/time",
            json!({"properties": {"simTime": "T1"}}),
        )],
    );
    let ingested = monitor.ingest(BusEvent::new("run42-manager/time", "garbage"));

    assert!(ingested.status.is_none());
    assert_eq!(monitor.status().sim_time.as_deref(), Some("T1"));
    // The message itself is still recorded
    assert_eq!(monitor.history().len(), 2);
}

#[test]
fn test_status_of_other_run_ignored() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[("run7-manager/time", json!({"properties": {"simTime": "T9"}}))],
    );
    assert!(monitor.status().is_idle());
}

#[test]
fn test_nodes_deduplicated() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    let fires = json!({"name": "fires", "description": "ignitions"});
    let sats = json!({"name": "constellation"});

    feed(
        &mut monitor,
        &[
            ("run42/logs/info", fires.clone()),
            ("run42/logs/info", sats.clone()),
            ("run42/logs/info", fires.clone()),
            ("run42/logs/info", sats.clone()),
            ("run42/logs/info", fires),
        ],
    );

    let names: Vec<_> = monitor.nodes().iter().filter_map(|n| n.name()).collect();
    assert_eq!(names, vec!["fires", "constellation"]);
}

#[test]
fn test_nodes_with_equal_numbers_deduplicated() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[
            ("run42/logs/info", json!({"name": "a", "properties": {"x": 1}})),
            ("run42/logs/info", json!({"name": "a", "properties": {"x": 1.0}})),
        ],
    );

    assert_eq!(monitor.nodes().len(), 1);
}

#[test]
fn test_node_ingest_reports_only_new_nodes() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    let first = monitor.ingest(BusEvent::json("run42/logs/info", &json!({"name": "a"})));
    let again = monitor.ingest(BusEvent::json("run42/logs/info", &json!({"name": "a"})));

    assert!(first.node.is_some());
    assert!(again.node.is_none());
}

#[test]
fn test_info_messages_are_also_logged() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(&mut monitor, &[("run42/logs/info", json!({"name": "a"}))]);
    assert_eq!(display_topics(&monitor, 0), vec!["run42/logs/info"]);
}

#[test]
fn test_registry_ignores_selection_but_honors_exclusion() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[
            ("run42/a", json!({})),
            ("run42/b", json!({})),
            ("run42/c", json!({})),
            ("elsewhere/d", json!({})),
        ],
    );
    monitor
        .set_selection(0, vec!["run42/a".to_string()])
        .unwrap();
    monitor
        .set_exclusion(0, vec!["run42/b".to_string()])
        .unwrap();

    assert_eq!(display_topics(&monitor, 0), vec!["run42/a"]);
    assert_eq!(
        monitor.topics(0).unwrap(),
        vec!["run42/a", "run42/c", "run42/#"]
    );
}

#[test]
fn test_views_are_independent() {
    let mut monitor = Monitor::new("run42", 2, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[("run42/a", json!({})), ("run42/b", json!({}))],
    );
    monitor
        .set_selection(1, vec!["run42/a".to_string()])
        .unwrap();

    assert_eq!(display_topics(&monitor, 0), vec!["run42/b", "run42/a"]);
    assert_eq!(display_topics(&monitor, 1), vec!["run42/a"]);
}

#[test]
fn test_unknown_view() {
    let monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    assert_eq!(monitor.display(3).unwrap_err(), MonitorError::ViewNotFound(3));
}

#[test]
fn test_selection_validation() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);

    assert!(monitor
        .set_selection(0, vec!["run42/#".to_string(), "run42/a".to_string()])
        .is_ok());
    assert!(matches!(
        monitor.set_selection(0, vec!["run7/#".to_string()]),
        Err(MonitorError::Topic(_))
    ));
    assert!(matches!(
        monitor.set_exclusion(0, vec!["run42/#".to_string()]),
        Err(MonitorError::Topic(_))
    ));
    // Failed edits leave the selection untouched
    assert_eq!(monitor.view(0).unwrap().selection.len(), 2);
}

#[test]
fn test_set_view_count() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    monitor.set_max_count(0, 10).unwrap();

    assert_eq!(monitor.set_view_count(3), 3);
    assert_eq!(monitor.views().len(), 3);
    assert_eq!(monitor.view(0).unwrap().max_count, 10);
    assert_eq!(monitor.view(2).unwrap().max_count, 200);

    assert_eq!(monitor.set_view_count(0), 1);
    assert_eq!(monitor.views().len(), 1);
}

#[test]
fn test_change_prefix_resets_session() {
    let mut monitor = Monitor::new("run42", 2, DEFAULT_MAX_COUNT);
    feed(
        &mut monitor,
        &[
            ("run42/a", json!({})),
            ("run42/logs/info", json!({"name": "a"})),
            ("run42-manager/time", json!({"properties": {"simTime": "T"}})),
        ],
    );

    monitor.change_prefix("run43").unwrap();

    assert_eq!(monitor.prefix(), "run43");
    assert!(monitor.history().is_empty());
    assert!(monitor.nodes().is_empty());
    assert!(monitor.status().is_idle());
    assert_eq!(monitor.views().len(), 2);
    assert!(monitor.view(1).unwrap().selection.contains("run43/#"));
}

#[test]
fn test_change_prefix_rejects_invalid() {
    let mut monitor = Monitor::new("run42", 1, DEFAULT_MAX_COUNT);
    assert!(monitor.change_prefix("a/b").is_err());
    assert_eq!(monitor.prefix(), "run42");
}

#[tokio::test]
async fn test_handle_broadcasts_updates() {
    let handle = MonitorHandle::new(Monitor::new("run42", 1, DEFAULT_MAX_COUNT));
    let mut rx = handle.subscribe();

    handle.ingest(BusEvent::json(
        "run42-manager/time",
        &json!({"properties": {"simTime": "T1"}}),
    ));
    handle.ingest(BusEvent::json("run42/logs/info", &json!({"name": "a"})));

    assert!(matches!(rx.try_recv().unwrap(), MonitorUpdate::Message(_)));
    match rx.try_recv().unwrap() {
        MonitorUpdate::Status(status) => assert_eq!(status.sim_time.as_deref(), Some("T1")),
        other => panic!("Expected status update, got {:?}", other),
    }
    assert!(matches!(rx.try_recv().unwrap(), MonitorUpdate::Message(_)));
    assert!(matches!(
        rx.try_recv().unwrap(),
        MonitorUpdate::NodeDiscovered(_)
    ));
}

#[tokio::test]
async fn test_run_ingest_preserves_delivery_order() {
    let handle = MonitorHandle::new(Monitor::new("run42", 1, DEFAULT_MAX_COUNT));
    let (tx, rx) = tokio::sync::mpsc::channel(16);

    for topic in ["run42/a", "run42/b", "run42/c"] {
        tx.send(BusEvent::json(topic, &json!({}))).await.unwrap();
    }
    drop(tx);

    handle.clone().run_ingest(rx).await;

    let topics: Vec<String> = handle.read(|m| m.history().iter().map(|m| m.topic.clone()).collect());
    assert_eq!(topics, vec!["run42/a", "run42/b", "run42/c"]);
}
