use super::request::CommandKind;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// How a command call ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    Success { response: Value },
    Error { message: String },
}

/// One manager command call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallRecord {
    pub timestamp: DateTime<Utc>,
    pub command: CommandKind,
    pub endpoint: String,
    pub request: Value,
    pub outcome: CallOutcome,
}

/// History of manager command calls, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiLog {
    records: Vec<ApiCallRecord>,
}

impl ApiLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted log; unreadable data yields an empty log.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable API log");
            Self::default()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize API log")
    }

    pub fn push(&mut self, record: ApiCallRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[ApiCallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the log as pretty JSON into `dir`, named after `now`.
    pub fn save_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        let path = dir.join(format!("api-log-{}.json", now.format("%Y-%m-%d_%H-%M-%S")));
        let json = serde_json::to_string_pretty(self).context("Failed to serialize API log")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write API log to {}", path.display()))?;
        Ok(path)
    }
}
