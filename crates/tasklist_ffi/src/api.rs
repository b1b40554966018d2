//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level task operations to Dart via FRB.
//! - Keep error semantics simple: every call returns a plain envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Tasks are addressed by stable id strings, never by list position.
//! - Each call loads the persisted collection, applies one operation and
//!   writes it back before returning.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Mutation, SqliteKvStore, StoreError, Task, TaskDraft, TaskEvent, TaskId, TaskStore,
};
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "tasklist.sqlite3";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the SQLite file used by every task call.
///
/// # FFI contract
/// - Must be called before the first task call to take effect.
/// - Repeating the same path is a no-op; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Task row returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID in string form.
    pub task_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub done: bool,
}

/// List envelope for full and filtered views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Tasks in display order.
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation was applied.
    pub ok: bool,
    /// ID of the affected task.
    pub task_id: Option<String>,
    /// `completed` or `deleted` when the UI should play feedback.
    pub event: Option<String>,
    /// Set when the change was applied but could not be saved.
    pub warning: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn applied<T>(message: impl Into<String>, task_id: TaskId, mutation: &Mutation<T>) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id.to_string()),
            event: mutation.event.map(|event| event_label(event).to_string()),
            warning: mutation
                .persist_warning
                .as_ref()
                .map(|err| err.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            event: None,
            warning: None,
            message: message.into(),
        }
    }
}

/// Lists every task in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    task_search(String::new())
}

/// Lists tasks whose name contains `query`, ignoring case.
///
/// # FFI contract
/// - Blank query returns the full list.
/// - Never writes to the store.
#[flutter_rust_bridge::frb(sync)]
pub fn task_search(query: String) -> TaskListResponse {
    match with_task_store(|store| Ok(store.search(&query))) {
        Ok(tasks) => {
            let items = tasks.into_iter().map(to_task_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            TaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("task_search failed: {err}"),
        },
    }
}

/// Creates a task from the form fields.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    name: String,
    description: String,
    category: String,
    date: String,
) -> TaskActionResponse {
    let draft = TaskDraft::new(name, description, category, date);
    match with_task_store(|store| {
        let mutation = store.create(&draft)?;
        let id = mutation.value.task.id;
        Ok(TaskActionResponse::applied("Task created.", id, &mutation))
    }) {
        Ok(response) => response,
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Replaces the fields of an existing task; completion is reset.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    task_id: String,
    name: String,
    description: String,
    category: String,
    date: String,
) -> TaskActionResponse {
    let draft = TaskDraft::new(name, description, category, date);
    run_keyed("task_update", &task_id, |store, id| {
        let mutation = store.update(id, &draft)?;
        Ok(TaskActionResponse::applied("Task updated.", id, &mutation))
    })
}

/// Marks a task done. Completing a done task succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_complete(task_id: String) -> TaskActionResponse {
    run_keyed("task_complete", &task_id, |store, id| {
        let mutation = store.complete(id)?;
        Ok(TaskActionResponse::applied("Task completed.", id, &mutation))
    })
}

/// Deletes a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    run_keyed("task_delete", &task_id, |store, id| {
        let mutation = store.delete(id)?;
        Ok(TaskActionResponse::applied("Task deleted.", id, &mutation))
    })
}

fn run_keyed(
    operation: &str,
    task_id: &str,
    f: impl FnOnce(
        &mut TaskStore<SqliteKvStore<'_>>,
        TaskId,
    ) -> Result<TaskActionResponse, StoreError>,
) -> TaskActionResponse {
    let id = match Uuid::parse_str(task_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            return TaskActionResponse::failure(format!(
                "{operation} failed: invalid task id `{task_id}`"
            ))
        }
    };
    match with_task_store(|store| f(store, id)) {
        Ok(response) => response,
        Err(err) => TaskActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| std::env::temp_dir().join(STORE_DB_FILE_NAME))
        .clone()
}

fn with_task_store<T>(
    f: impl FnOnce(&mut TaskStore<SqliteKvStore<'_>>) -> Result<T, StoreError>,
) -> Result<T, String> {
    let db_path = resolve_store_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error_code=db_open_failed");
        format!("store DB open failed: {err}")
    })?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    let mut store = TaskStore::new(kv);
    store.initialize();
    f(&mut store).map_err(|err| err.to_string())
}

fn to_task_item(task: Task) -> TaskItem {
    TaskItem {
        task_id: task.id.to_string(),
        name: task.name,
        description: task.description,
        category: task.category,
        date: task.date,
        done: task.done,
    }
}

fn event_label(event: TaskEvent) -> &'static str {
    match event {
        TaskEvent::Completed(_) => "completed",
        TaskEvent::Deleted(_) => "deleted",
    }
}
