use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Manager commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Init,
    Start,
    Stop,
    Update,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Init => "init",
            CommandKind::Start => "start",
            CommandKind::Stop => "stop",
            CommandKind::Update => "update",
        }
    }

    /// Endpoint path relative to the API base URL
    pub fn endpoint(&self, prefix: &str) -> String {
        format!("{}/{}", self.as_str(), prefix)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /init/{prefix}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitRequest {
    pub sim_start_time: DateTime<Utc>,
    pub sim_stop_time: DateTime<Utc>,
    #[serde(default)]
    pub required_apps: Vec<String>,
}

/// Body of `POST /start/{prefix}`
///
/// Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub sim_start_time: DateTime<Utc>,
    pub sim_stop_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_step: Option<f64>,
    pub time_scale_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_status_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_status_init: Option<DateTime<Utc>>,
}

/// Body of `POST /stop/{prefix}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRequest {
    pub sim_stop_time: DateTime<Utc>,
}

/// Body of `POST /update/{prefix}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub time_scale_factor: f64,
    pub sim_update_time: DateTime<Utc>,
}

/// A command ready to send
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    Init(InitRequest),
    Start(StartRequest),
    Stop(StopRequest),
    Update(UpdateRequest),
}

impl CommandRequest {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandRequest::Init(_) => CommandKind::Init,
            CommandRequest::Start(_) => CommandKind::Start,
            CommandRequest::Stop(_) => CommandKind::Stop,
            CommandRequest::Update(_) => CommandKind::Update,
        }
    }

    /// JSON body sent to the manager
    pub fn body(&self) -> serde_json::Value {
        let body = match self {
            CommandRequest::Init(r) => serde_json::to_value(r),
            CommandRequest::Start(r) => serde_json::to_value(r),
            CommandRequest::Stop(r) => serde_json::to_value(r),
            CommandRequest::Update(r) => serde_json::to_value(r),
        };
        // Plain structs with string keys always serialize
        body.unwrap_or(serde_json::Value::Null)
    }
}
