//! Task record and candidate validation.
//!
//! # Responsibility
//! - Define the persisted task shape and its stable identity.
//! - Validate user-entered candidates before they reach the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `name`, `description` and `category` contain only ASCII letters and spaces.
//! - `done` starts as `false` and is never reset by `mark_done`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static LETTERS_AND_SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z ]+$").expect("valid letters regex"));

/// Stable identifier for a task.
///
/// Positions shift on delete and differ inside filtered views; ids do not.
pub type TaskId = Uuid;

/// Names the candidate field a validation rule rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Name,
    Description,
    Category,
    Date,
}

impl TaskField {
    /// Returns the wire/display label of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Category => "category",
            Self::Date => "date",
        }
    }
}

impl Display for TaskField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure for a task candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// A required field was left empty.
    MissingField { field: TaskField },
    /// A text field contains something other than letters and spaces.
    InvalidCharacters { field: TaskField },
}

impl TaskValidationError {
    /// Returns the field this error refers to.
    pub fn field(&self) -> TaskField {
        match self {
            Self::MissingField { field } | Self::InvalidCharacters { field } => *field,
        }
    }
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "all fields are required: `{field}` is empty")
            }
            Self::InvalidCharacters { field } => {
                write!(f, "`{field}` must contain letters and spaces only")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Candidate fields submitted by the view for create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Caller-formatted due date; only checked for emptiness.
    pub date: String,
}

impl TaskDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    /// Checks required fields first, then the character rule.
    ///
    /// Character checks run on the raw value; trimming happens afterwards in
    /// [`Task::from_draft`].
    ///
    /// # Errors
    /// - `MissingField` for the first empty field in name/description/category/date order.
    /// - `InvalidCharacters` for the first text field outside `[A-Za-z ]`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        for (field, value) in self.fields() {
            if value.is_empty() {
                return Err(TaskValidationError::MissingField { field });
            }
        }

        for (field, value) in self.fields() {
            if field == TaskField::Date {
                continue;
            }
            if !LETTERS_AND_SPACES_RE.is_match(value) {
                return Err(TaskValidationError::InvalidCharacters { field });
            }
        }

        Ok(())
    }

    fn fields(&self) -> [(TaskField, &str); 4] {
        [
            (TaskField::Name, self.name.as_str()),
            (TaskField::Description, self.description.as_str()),
            (TaskField::Category, self.category.as_str()),
            (TaskField::Date, self.date.as_str()),
        ]
    }
}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub done: bool,
}

impl Task {
    /// Validates `draft` and builds a fresh, not-done task with a new id.
    pub fn from_draft(draft: &TaskDraft) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Validates `draft` and builds a not-done task under a caller-provided id.
    ///
    /// Used by update, where identity survives replacement.
    pub fn with_id(id: TaskId, draft: &TaskDraft) -> Result<Self, TaskValidationError> {
        draft.validate()?;
        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            date: draft.date.clone(),
            done: false,
        })
    }

    /// Marks this task as completed. Completing twice is a no-op.
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Returns the editable fields, used to prefill an edit form.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::new(
            self.name.clone(),
            self.description.clone(),
            self.category.clone(),
            self.date.clone(),
        )
    }
}
