//! Explicit edit-session state for the create/update form.
//!
//! # Invariants
//! - `is_active()` is true exactly when a target id is held.

use crate::model::task::TaskId;

/// Where a form submission should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRoute {
    Create,
    Update(TaskId),
}

/// Tracks whether the form currently edits an existing task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<TaskId>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `id`, replacing any previous target.
    pub fn begin(&mut self, id: TaskId) {
        self.target = Some(id);
    }

    pub fn clear(&mut self) {
        self.target = None;
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<TaskId> {
        self.target
    }

    pub fn route(&self) -> SubmitRoute {
        match self.target {
            Some(id) => SubmitRoute::Update(id),
            None => SubmitRoute::Create,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditSession, SubmitRoute};
    use uuid::Uuid;

    #[test]
    fn routes_follow_session_state() {
        let mut session = EditSession::new();
        assert!(!session.is_active());
        assert_eq!(session.route(), SubmitRoute::Create);

        let id = Uuid::new_v4();
        session.begin(id);
        assert!(session.is_active());
        assert_eq!(session.target(), Some(id));
        assert_eq!(session.route(), SubmitRoute::Update(id));

        session.clear();
        assert_eq!(session.route(), SubmitRoute::Create);
    }
}
