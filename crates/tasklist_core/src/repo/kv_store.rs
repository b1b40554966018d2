//! Key-value persistence adapters.
//!
//! # Responsibility
//! - Load and save opaque byte values under string keys.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` replaces any previous value under the same key.
//! - `load` returns `None` for keys that were never written.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::repo::snapshot::SnapshotError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure raised by a persistence adapter.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    /// The adapter refused or failed the write.
    WriteFailed { key: String, message: String },
    /// The collection could not be serialized.
    Snapshot(SnapshotError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteFailed { key, message } => {
                write!(f, "failed to persist `{key}`: {message}")
            }
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with `open_db`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SnapshotError> for PersistError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Byte-string store the task store loads from on start and saves to after
/// every mutation.
pub trait KvStore {
    fn load(&self, key: &str) -> PersistResult<Option<Vec<u8>>>;
    fn save(&mut self, key: &str, value: &[u8]) -> PersistResult<()>;
}

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when `kv_entries` does not exist.
    pub fn try_new(conn: &'conn Connection) -> PersistResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(PersistError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries');",
            [],
            |row| row.get(0),
        )?;
        if has_table == 0 {
            return Err(PersistError::MissingRequiredTable("kv_entries"));
        }

        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn load(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process key-value store.
///
/// Clones share the same backing map, so a second task store built from a
/// clone observes everything the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Writes a raw value, bypassing the failure switch.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }
}

impl KvStore for MemoryKvStore {
    fn load(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        if self.fail_writes.get() {
            return Err(PersistError::WriteFailed {
                key: key.to_string(),
                message: "writes are disabled".to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvStore, MemoryKvStore, PersistError};

    #[test]
    fn memory_store_clones_share_entries() {
        let mut first = MemoryKvStore::new();
        let second = first.clone();

        first.save("tasks", b"[]").unwrap();
        assert_eq!(second.load("tasks").unwrap().as_deref(), Some(&b"[]"[..]));
        assert_eq!(second.load("other").unwrap(), None);
    }

    #[test]
    fn memory_store_failure_switch_keeps_previous_value() {
        let mut store = MemoryKvStore::new();
        store.save("tasks", b"v1").unwrap();

        store.set_fail_writes(true);
        let err = store.save("tasks", b"v2").unwrap_err();
        assert!(matches!(err, PersistError::WriteFailed { ref key, .. } if key == "tasks"));
        assert_eq!(store.load("tasks").unwrap().as_deref(), Some(&b"v1"[..]));

        store.set_fail_writes(false);
        store.save("tasks", b"v3").unwrap();
        assert_eq!(store.load("tasks").unwrap().as_deref(), Some(&b"v3"[..]));
    }
}
