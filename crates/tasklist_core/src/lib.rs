//! Core domain logic for the task list.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::TaskListConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskDraft, TaskField, TaskId, TaskValidationError};
pub use repo::kv_store::{KvStore, MemoryKvStore, PersistError, PersistResult, SqliteKvStore};
pub use repo::snapshot::{
    decode_snapshot, encode_snapshot, SnapshotError, SnapshotSource, SNAPSHOT_VERSION,
};
pub use search::name_filter::filter_by_name;
pub use service::board::{TaskBoard, TaskView, ViewIntent};
pub use service::edit_session::{EditSession, SubmitRoute};
pub use service::task_store::{
    Mutation, PlacedTask, StoreError, StoreResult, TaskEvent, TaskStore, DEFAULT_STORAGE_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
