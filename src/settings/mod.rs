//! Persisted console settings.
//!
//! A small key/value store standing in for browser local storage. Values
//! are plain strings; anything unreadable falls back to its default.

use serde::{Deserialize, Serialize};

mod store;

pub use store::SettingsStore;

pub const KEY_PREFIX: &str = "prefix";
pub const KEY_THEME: &str = "theme";
pub const KEY_LOGS_COUNT: &str = "logsCount";
pub const KEY_VIEW: &str = "view";
pub const KEY_API_LOG: &str = "apiLog";

/// Console color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Theme::Default),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Default => Theme::Dark,
            Theme::Dark => Theme::Default,
        }
    }
}

/// Arrangement of log panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLayout {
    Grid,
    #[default]
    Infinite,
}

impl ViewLayout {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "grid" => Some(ViewLayout::Grid),
            "infinite" => Some(ViewLayout::Infinite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewLayout::Grid => "grid",
            ViewLayout::Infinite => "infinite",
        }
    }
}

/// Settings restored at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub prefix: String,
    pub theme: Theme,
    /// Number of log panels
    pub logs_count: usize,
    pub view: ViewLayout,
}

impl Settings {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            theme: Theme::default(),
            logs_count: 1,
            view: ViewLayout::default(),
        }
    }
}
