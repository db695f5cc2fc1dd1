use super::client::{CommandError, ManagerClient};
use super::log::{ApiCallRecord, ApiLog, CallOutcome};
use super::request::{CommandKind, CommandRequest};
use crate::settings::{SettingsStore, KEY_API_LOG};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// How long the last-command banner stays visible
pub const STATUS_BANNER_SECONDS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Error,
}

/// Banner describing the most recent command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastCommandStatus {
    pub command: CommandKind,
    pub status: CommandStatus,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl LastCommandStatus {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.at >= Duration::seconds(STATUS_BANNER_SECONDS)
    }
}

/// Runs manager commands and keeps the persisted call log.
///
/// Failures never propagate past the call that caused them: they are
/// recorded in the log and in the status banner, and returned to the caller.
pub struct CommandConsole {
    client: ManagerClient,
    settings: Arc<SettingsStore>,
    log: Mutex<ApiLog>,
    last_status: Mutex<Option<LastCommandStatus>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CommandConsole {
    /// Create a console, restoring the call log from settings.
    pub fn new(client: ManagerClient, settings: Arc<SettingsStore>) -> Self {
        let log = match settings.get(KEY_API_LOG) {
            Ok(Some(json)) => ApiLog::from_json(&json),
            Ok(None) => ApiLog::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read API log, starting empty");
                ApiLog::new()
            }
        };

        Self {
            client,
            settings,
            log: Mutex::new(log),
            last_status: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &ManagerClient {
        &self.client
    }

    /// Send a command and record its outcome.
    pub async fn run(&self, prefix: &str, request: CommandRequest) -> Result<Value, CommandError> {
        let kind = request.kind();
        let result = self.client.send(prefix, &request).await;
        let now = Utc::now();

        let (outcome, status, message) = match &result {
            Ok(response) => (
                CallOutcome::Success {
                    response: response.clone(),
                },
                CommandStatus::Success,
                "Success!",
            ),
            Err(e) => (
                CallOutcome::Error {
                    message: e.to_string(),
                },
                CommandStatus::Error,
                "Error occurred!",
            ),
        };
        info!(command = %kind, status = ?status, "Command finished");

        self.record(ApiCallRecord {
            timestamp: now,
            command: kind,
            endpoint: kind.endpoint(prefix),
            request: request.body(),
            outcome,
        });
        *lock(&self.last_status) = Some(LastCommandStatus {
            command: kind,
            status,
            message: message.to_string(),
            at: now,
        });

        result
    }

    fn record(&self, record: ApiCallRecord) {
        let mut log = lock(&self.log);
        log.push(record);
        self.persist(&log);
    }

    fn persist(&self, log: &ApiLog) {
        let saved = log
            .to_json()
            .and_then(|json| self.settings.set(KEY_API_LOG, &json));
        if let Err(e) = saved {
            warn!(error = %e, "Failed to persist API log");
        }
    }

    /// Snapshot of the call log
    pub fn log(&self) -> ApiLog {
        lock(&self.log).clone()
    }

    pub fn clear_log(&self) {
        let mut log = lock(&self.log);
        log.clear();
        self.persist(&log);
        info!("API log cleared");
    }

    /// Banner for the last command, unless it has expired.
    pub fn last_status(&self, now: DateTime<Utc>) -> Option<LastCommandStatus> {
        let mut last = lock(&self.last_status);
        if last.as_ref().is_some_and(|s| s.is_expired(now)) {
            *last = None;
        }
        last.clone()
    }
}
