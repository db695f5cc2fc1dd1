use anyhow::{Context, Result};
use serde::Deserialize;

pub use crate::bus::MqttConfig;
pub use crate::commands::ManagerApiConfig;
use crate::state::DEFAULT_MAX_COUNT;

/// Complete monitor configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub manager_api: ManagerApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Messages per display window
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Prefix used until one is chosen and persisted
    #[serde(default = "default_prefix")]
    pub default_prefix: String,
}

fn default_max_count() -> usize {
    DEFAULT_MAX_COUNT
}

fn default_prefix() -> String {
    "nost".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            default_prefix: default_prefix(),
        }
    }
}

/// Settings storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Directory for saved exports and API logs
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_db_path() -> String {
    std::env::var("MONITOR_DB").unwrap_or_else(|_| "monitor.db".to_string())
}

fn default_export_dir() -> String {
    ".".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            export_dir: default_export_dir(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    std::env::var("MONITOR_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<MonitorConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path))
}

/// Load configuration from `MONITOR_CONFIG` if set, otherwise use defaults
pub fn load_from_env() -> Result<MonitorConfig> {
    match std::env::var("MONITOR_CONFIG") {
        Ok(path) => load_config(&path),
        Err(_) => Ok(MonitorConfig::default()),
    }
}
