//! Persisted snapshot codec for the task collection.
//!
//! # Responsibility
//! - Serialize the ordered collection into one self-describing value.
//! - Decode current envelopes and the legacy bare-array layout.
//!
//! # Invariants
//! - Decoding is all-or-nothing: any schema mismatch is an error.
//! - Decoded order equals persisted order.
//! - Task ids in a decoded collection are unique.

use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Envelope version written by [`encode_snapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot encode/decode failure.
#[derive(Debug)]
pub enum SnapshotError {
    /// Bytes are not JSON, or fields are missing/mistyped.
    Malformed(serde_json::Error),
    UnsupportedVersion(u32),
    /// Top-level value is neither an envelope object nor an array.
    UnexpectedShape(&'static str),
    DuplicateId(TaskId),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed task snapshot: {err}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "task snapshot version {version} is not supported (expected {SNAPSHOT_VERSION})"
            ),
            Self::UnexpectedShape(kind) => {
                write!(f, "task snapshot must be an object or array, got {kind}")
            }
            Self::DuplicateId(id) => write!(f, "task snapshot repeats id {id}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    tasks: &'a [Task],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    version: u32,
    tasks: Vec<Task>,
}

/// Record shape written before tasks carried ids.
#[derive(Deserialize)]
struct LegacyTask {
    name: String,
    description: String,
    category: String,
    date: String,
    done: bool,
}

impl From<LegacyTask> for Task {
    fn from(value: LegacyTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: value.name,
            description: value.description,
            category: value.category,
            date: value.date,
            done: value.done,
        }
    }
}

/// Encodes the ordered collection as a versioned JSON envelope.
pub fn encode_snapshot(tasks: &[Task]) -> Result<Vec<u8>, SnapshotError> {
    let envelope = EnvelopeRef {
        version: SNAPSHOT_VERSION,
        tasks,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Persisted layout a snapshot was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Versioned envelope; ids were read from storage.
    Envelope,
    /// Bare array without ids; ids were generated during decode and exist
    /// nowhere else until the collection is written back.
    Legacy,
}

/// Decodes persisted bytes into an ordered collection.
///
/// Accepts the versioned envelope and the legacy bare array of
/// `{name, description, category, date, done}` records; legacy records are
/// assigned fresh ids.
pub fn decode_snapshot(bytes: &[u8]) -> Result<(Vec<Task>, SnapshotSource), SnapshotError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let (tasks, source) = match value {
        Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.version != SNAPSHOT_VERSION {
                return Err(SnapshotError::UnsupportedVersion(envelope.version));
            }
            (envelope.tasks, SnapshotSource::Envelope)
        }
        Value::Array(_) => {
            let tasks = serde_json::from_value::<Vec<LegacyTask>>(value)?
                .into_iter()
                .map(Task::from)
                .collect();
            (tasks, SnapshotSource::Legacy)
        }
        Value::Null => return Err(SnapshotError::UnexpectedShape("null")),
        Value::Bool(_) => return Err(SnapshotError::UnexpectedShape("boolean")),
        Value::Number(_) => return Err(SnapshotError::UnexpectedShape("number")),
        Value::String(_) => return Err(SnapshotError::UnexpectedShape("string")),
    };

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id) {
            return Err(SnapshotError::DuplicateId(task.id));
        }
    }

    Ok((tasks, source))
}
