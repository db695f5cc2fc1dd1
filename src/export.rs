//! Log export to `.txt` and `.json`.

use crate::message::Message;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "txt" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow!("unsupported export format '{}'", other)),
        }
    }
}

/// Export file name: `logs-YYYY-MM-DD_HH-mm-ss.<ext>`.
pub fn file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "logs-{}.{}",
        now.format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}

/// One line per message, in the given order:
/// `<capture time to the second> <topic>: <compact JSON payload>`.
pub fn to_txt(messages: &[&Message]) -> String {
    messages
        .iter()
        .map(|m| {
            format!(
                "{} {}: {}",
                m.received_at.format("%Y-%m-%dT%H:%M:%S"),
                m.topic,
                m.payload
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed JSON array of messages with four-space indentation.
pub fn to_json(messages: &[&Message]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    messages
        .serialize(&mut serializer)
        .context("Failed to serialize messages")?;
    String::from_utf8(buf).context("Serialized messages are not UTF-8")
}

/// Render messages in the requested format.
pub fn render(format: ExportFormat, messages: &[&Message]) -> Result<String> {
    match format {
        ExportFormat::Txt => Ok(to_txt(messages)),
        ExportFormat::Json => to_json(messages),
    }
}

/// Write an export file into `dir` and return its path.
pub fn write_to_dir(
    dir: &Path,
    format: ExportFormat,
    messages: &[&Message],
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = dir.join(file_name(format, now));
    let content = render(format, messages)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    Ok(path)
}
