//! SQLite-backed settings storage.

use super::{
    Settings, Theme, ViewLayout, KEY_LOGS_COUNT, KEY_PREFIX, KEY_THEME, KEY_VIEW,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Key/value settings storage backed by SQLite.
///
/// # Schema
/// ```sql
/// CREATE TABLE settings (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     updated_at TEXT NOT NULL   -- ISO 8601 timestamp
/// );
/// ```
///
/// The connection is wrapped in a Mutex; every call is a single statement.
pub struct SettingsStore {
    conn: Mutex<Connection>,
}

impl SettingsStore {
    /// Creates or opens a settings store at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open settings database")?;
        Self::with_connection(conn)
    }

    /// Creates a throwaway in-memory store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )
        .context("Failed to create settings table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a raw value.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting '{}'", key))
    }

    /// Writes a raw value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()
            .execute(
                r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write setting '{}'", key))?;

        debug!(key = %key, "Setting saved");
        Ok(())
    }

    /// Loads console settings, using `default_prefix` when none is stored.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn load(&self, default_prefix: &str) -> Result<Settings> {
        let mut settings = Settings::with_prefix(default_prefix);

        if let Some(prefix) = self.get(KEY_PREFIX)?.filter(|p| !p.is_empty()) {
            settings.prefix = prefix;
        }
        if let Some(theme) = self.get(KEY_THEME)?.as_deref().and_then(Theme::parse) {
            settings.theme = theme;
        }
        if let Some(count) = self
            .get(KEY_LOGS_COUNT)?
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|c| *c >= 1)
        {
            settings.logs_count = count;
        }
        if let Some(view) = self.get(KEY_VIEW)?.as_deref().and_then(ViewLayout::parse) {
            settings.view = view;
        }

        Ok(settings)
    }

    pub fn save_prefix(&self, prefix: &str) -> Result<()> {
        self.set(KEY_PREFIX, prefix)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.set(KEY_THEME, theme.as_str())
    }

    pub fn save_logs_count(&self, count: usize) -> Result<()> {
        self.set(KEY_LOGS_COUNT, &count.to_string())
    }

    pub fn save_view(&self, view: ViewLayout) -> Result<()> {
        self.set(KEY_VIEW, view.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let store = SettingsStore::in_memory().unwrap();
        let settings = store.load("nost").unwrap();

        assert_eq!(settings, Settings::with_prefix("nost"));
        assert_eq!(settings.logs_count, 1);
        assert_eq!(settings.view, ViewLayout::Infinite);
        assert_eq!(settings.theme, Theme::Default);
    }

    #[test]
    fn test_set_get_overwrite() {
        let store = SettingsStore::in_memory().unwrap();

        assert_eq!(store.get("prefix").unwrap(), None);
        store.set("prefix", "run42").unwrap();
        store.set("prefix", "run43").unwrap();
        assert_eq!(store.get("prefix").unwrap().as_deref(), Some("run43"));
    }

    #[test]
    fn test_typed_round_trip() {
        let store = SettingsStore::in_memory().unwrap();
        store.save_prefix("run42").unwrap();
        store.save_theme(Theme::Dark).unwrap();
        store.save_logs_count(3).unwrap();
        store.save_view(ViewLayout::Grid).unwrap();

        let settings = store.load("nost").unwrap();
        assert_eq!(settings.prefix, "run42");
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.logs_count, 3);
        assert_eq!(settings.view, ViewLayout::Grid);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let store = SettingsStore::in_memory().unwrap();
        store.set(KEY_THEME, "neon").unwrap();
        store.set(KEY_LOGS_COUNT, "many").unwrap();
        store.set(KEY_VIEW, "carousel").unwrap();

        assert_eq!(store.load("nost").unwrap(), Settings::with_prefix("nost"));

        store.set(KEY_LOGS_COUNT, "0").unwrap();
        assert_eq!(store.load("nost").unwrap().logs_count, 1);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.db");

        SettingsStore::new(&path).unwrap().save_prefix("run42").unwrap();

        let reopened = SettingsStore::new(&path).unwrap();
        assert_eq!(reopened.load("nost").unwrap().prefix, "run42");
    }
}
