//! Store configuration.
//!
//! # Responsibility
//! - Collect the knobs a host needs to open a task store.
//! - Open the configured backing connection.
//!
//! # Invariants
//! - `storage_key` is never blank.
//! - `db_path = None` means an in-memory database.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level};
use crate::service::task_store::DEFAULT_STORAGE_KEY;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Host-level configuration for one task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListConfig {
    storage_key: String,
    db_path: Option<PathBuf>,
    log_level: &'static str,
}

impl Default for TaskListConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: None,
            log_level: default_log_level(),
        }
    }
}

impl TaskListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the key the collection is stored under.
    ///
    /// Blank keys fall back to the default.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        self.storage_key = if trimmed.is_empty() {
            DEFAULT_STORAGE_KEY.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Sets the log level used by [`crate::init_logging`] callers.
    ///
    /// # Errors
    /// Returns an error for levels outside `trace|debug|info|warn|error`.
    pub fn with_log_level(mut self, level: &str) -> Result<Self, String> {
        self.log_level = normalize_level(level)?;
        Ok(self)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn log_level(&self) -> &'static str {
        self.log_level
    }

    /// Opens the configured database with migrations applied.
    pub fn open_connection(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}
