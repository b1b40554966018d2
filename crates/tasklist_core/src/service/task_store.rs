//! Task state manager.
//!
//! # Responsibility
//! - Own the ordered task collection for one session.
//! - Validate, mutate and query it under positional and id-keyed addressing.
//! - Write the full collection through the persistence adapter after every
//!   mutation.
//!
//! # Invariants
//! - Insertion order is display order; create appends.
//! - Validation and bounds checks run before any mutation.
//! - A failed save never rolls back the in-memory mutation; it is reported
//!   as `Mutation::persist_warning`.
//! - Unreadable persisted state loads as an empty collection.

use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::kv_store::{KvStore, PersistError};
use crate::repo::snapshot::{decode_snapshot, encode_snapshot, SnapshotSource};
use crate::search::name_filter::filter_by_name;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejection raised before any state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(TaskValidationError),
    OutOfBounds { position: usize, len: usize },
    NotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::OutOfBounds { position, len } => {
                write!(f, "task position {position} is out of bounds (len {len})")
            }
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Side effect a caller may surface, e.g. by playing a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    Completed(TaskId),
    Deleted(TaskId),
}

/// Result of a successful mutation.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub event: Option<TaskEvent>,
    /// Set when the in-memory change could not be written through.
    pub persist_warning: Option<PersistError>,
}

impl<T> Mutation<T> {
    pub fn is_persisted(&self) -> bool {
        self.persist_warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// A task together with its position at the time of the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTask {
    pub position: usize,
    pub task: Task,
}

/// Ordered, persisted task collection.
pub struct TaskStore<S: KvStore> {
    adapter: S,
    storage_key: String,
    tasks: Vec<Task>,
}

impl<S: KvStore> TaskStore<S> {
    /// Creates an empty store writing under [`DEFAULT_STORAGE_KEY`].
    ///
    /// Call [`TaskStore::initialize`] to load persisted state.
    pub fn new(adapter: S) -> Self {
        Self::with_storage_key(adapter, DEFAULT_STORAGE_KEY)
    }

    pub fn with_storage_key(adapter: S, storage_key: impl Into<String>) -> Self {
        Self {
            adapter,
            storage_key: storage_key.into(),
            tasks: Vec::new(),
        }
    }

    /// Loads the persisted collection, replacing in-memory state.
    ///
    /// Missing, unreadable or schema-invalid data yields an empty collection.
    /// A legacy snapshot is written back as an envelope right away so the ids
    /// assigned on import stay valid for later sessions.
    pub fn initialize(&mut self) -> &[Task] {
        let (tasks, source) = match self.adapter.load(&self.storage_key) {
            Ok(Some(bytes)) => match decode_snapshot(&bytes) {
                Ok((tasks, SnapshotSource::Envelope)) => (tasks, "snapshot"),
                Ok((tasks, SnapshotSource::Legacy)) => (tasks, "legacy"),
                Err(err) => {
                    warn!(
                        "event=store_init module=store status=recovered error_code=snapshot_invalid error={}",
                        err
                    );
                    (Vec::new(), "recovered")
                }
            },
            Ok(None) => (Vec::new(), "empty"),
            Err(err) => {
                warn!(
                    "event=store_init module=store status=recovered error_code=load_failed error={}",
                    err
                );
                (Vec::new(), "recovered")
            }
        };

        self.tasks = tasks;
        if source == "legacy" && self.persist().is_ok() {
            info!(
                "event=store_migrate module=store status=ok task_count={}",
                self.tasks.len()
            );
        }
        info!(
            "event=store_init module=store status=ok source={} task_count={}",
            source,
            self.tasks.len()
        );
        &self.tasks
    }

    /// Current collection in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Resolves a stable id to its current position.
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn adapter(&self) -> &S {
        &self.adapter
    }

    /// Validates `draft` and appends it as a new, not-done task.
    pub fn create(&mut self, draft: &TaskDraft) -> StoreResult<Mutation<PlacedTask>> {
        let task = Task::from_draft(draft).inspect_err(|err| {
            warn!(
                "event=task_create module=store status=rejected error_code=validation field={}",
                err.field()
            );
        })?;

        self.tasks.push(task.clone());
        let position = self.tasks.len() - 1;
        info!(
            "event=task_create module=store status=ok position={} task_count={}",
            position,
            self.tasks.len()
        );

        Ok(self.finish(PlacedTask { position, task }, None))
    }

    /// Replaces the task at `position` wholesale.
    ///
    /// The replacement keeps the task id but starts not-done again, like a
    /// freshly created task.
    pub fn update_at(&mut self, position: usize, draft: &TaskDraft) -> StoreResult<Mutation<Task>> {
        let id = self.id_at(position)?;
        self.update(id, draft)
    }

    /// Replaces the task identified by `id` wholesale; see [`TaskStore::update_at`].
    pub fn update(&mut self, id: TaskId, draft: &TaskDraft) -> StoreResult<Mutation<Task>> {
        let position = self.require_position(id)?;
        let replacement = Task::with_id(id, draft).inspect_err(|err| {
            warn!(
                "event=task_update module=store status=rejected error_code=validation field={}",
                err.field()
            );
        })?;

        self.tasks[position] = replacement.clone();
        info!(
            "event=task_update module=store status=ok position={}",
            position
        );

        Ok(self.finish(replacement, None))
    }

    /// Marks the task at `position` done. Completing a done task succeeds.
    pub fn complete_at(&mut self, position: usize) -> StoreResult<Mutation<Task>> {
        let id = self.id_at(position)?;
        self.complete(id)
    }

    pub fn complete(&mut self, id: TaskId) -> StoreResult<Mutation<Task>> {
        let position = self.require_position(id)?;
        let task = &mut self.tasks[position];
        task.mark_done();
        let task = task.clone();
        info!(
            "event=task_complete module=store status=ok position={}",
            position
        );

        Ok(self.finish(task, Some(TaskEvent::Completed(id))))
    }

    /// Removes the task at `position`; later tasks shift down by one.
    ///
    /// Returns the removed task.
    pub fn delete_at(&mut self, position: usize) -> StoreResult<Mutation<Task>> {
        let id = self.id_at(position)?;
        self.delete(id)
    }

    pub fn delete(&mut self, id: TaskId) -> StoreResult<Mutation<Task>> {
        let position = self.require_position(id)?;
        let removed = self.tasks.remove(position);
        info!(
            "event=task_delete module=store status=ok position={} task_count={}",
            position,
            self.tasks.len()
        );

        Ok(self.finish(removed, Some(TaskEvent::Deleted(id))))
    }

    /// Filters by name without touching stored state.
    ///
    /// Positions in the result are not store positions; use each hit's `id`.
    pub fn search(&self, query: &str) -> Vec<Task> {
        filter_by_name(&self.tasks, query)
    }

    fn id_at(&self, position: usize) -> StoreResult<TaskId> {
        self.tasks
            .get(position)
            .map(|task| task.id)
            .ok_or(StoreError::OutOfBounds {
                position,
                len: self.tasks.len(),
            })
    }

    fn require_position(&self, id: TaskId) -> StoreResult<usize> {
        self.position_of(id).ok_or(StoreError::NotFound(id))
    }

    fn finish<T>(&mut self, value: T, event: Option<TaskEvent>) -> Mutation<T> {
        Mutation {
            value,
            event,
            persist_warning: self.persist().err(),
        }
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        let result = encode_snapshot(&self.tasks)
            .map_err(PersistError::from)
            .and_then(|bytes| self.adapter.save(&self.storage_key, &bytes));

        if let Err(err) = &result {
            warn!(
                "event=store_save module=store status=error error_code=persist_failed task_count={} error={}",
                self.tasks.len(),
                err
            );
        }
        result
    }
}
