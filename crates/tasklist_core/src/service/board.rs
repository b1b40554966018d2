//! View-intent dispatcher.
//!
//! # Responsibility
//! - Translate view intents carrying display positions into store calls.
//! - Hold the edit session and active search query explicitly.
//! - Re-render the view after every intent.
//!
//! # Invariants
//! - Intent positions index the last rendered list, never the store directly.
//!   They are resolved to task ids before any store call.
//! - The active search filter survives mutations.
//! - Deleting the task under edit ends the edit session.

use crate::model::task::{Task, TaskDraft, TaskId};
use crate::repo::kv_store::{KvStore, PersistError};
use crate::service::edit_session::{EditSession, SubmitRoute};
use crate::service::task_store::{Mutation, StoreError, StoreResult, TaskEvent, TaskStore};
use log::debug;

/// Presentation collaborator driven by [`TaskBoard`].
pub trait TaskView {
    /// Redraws to match `tasks` exactly, in order.
    fn render(&mut self, tasks: &[Task]);

    /// Fills the form with an existing task for editing.
    fn prefill(&mut self, draft: &TaskDraft);

    /// Surfaces a completion/deletion side effect.
    fn notify(&mut self, _event: TaskEvent) {}

    /// Tells the user an operation was rejected or not saved.
    fn alert(&mut self, message: &str);
}

/// User intent reported by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewIntent {
    Complete(usize),
    Delete(usize),
    UpdateRequest(usize),
    Search(String),
    Submit(TaskDraft),
}

/// Composes a task store with a view and the state between them.
pub struct TaskBoard<S: KvStore, V: TaskView> {
    store: TaskStore<S>,
    view: V,
    session: EditSession,
    query: String,
    displayed: Vec<Task>,
}

impl<S: KvStore, V: TaskView> TaskBoard<S, V> {
    /// Loads persisted state and renders the initial list.
    pub fn start(mut store: TaskStore<S>, view: V) -> Self {
        let displayed = store.initialize().to_vec();
        let mut board = Self {
            store,
            view,
            session: EditSession::new(),
            query: String::new(),
            displayed,
        };
        board.view.render(&board.displayed);
        board
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    /// Tasks as last rendered.
    pub fn displayed(&self) -> &[Task] {
        &self.displayed
    }

    /// Applies one intent. Rejections are alerted and returned.
    pub fn dispatch(&mut self, intent: ViewIntent) -> StoreResult<()> {
        debug!("event=intent module=board intent={}", intent_label(&intent));
        let result = self.apply(intent);
        if let Err(err) = &result {
            self.view.alert(&err.to_string());
        }
        result
    }

    fn apply(&mut self, intent: ViewIntent) -> StoreResult<()> {
        match intent {
            ViewIntent::Complete(position) => {
                let id = self.resolve(position)?;
                let mutation = self.store.complete(id)?;
                self.after_mutation(mutation);
            }
            ViewIntent::Delete(position) => {
                let id = self.resolve(position)?;
                let mutation = self.store.delete(id)?;
                if self.session.target() == Some(id) {
                    self.session.clear();
                }
                self.after_mutation(mutation);
            }
            ViewIntent::UpdateRequest(position) => {
                let id = self.resolve(position)?;
                let draft = self
                    .store
                    .get(id)
                    .map(Task::to_draft)
                    .ok_or(StoreError::NotFound(id))?;
                self.session.begin(id);
                self.view.prefill(&draft);
            }
            ViewIntent::Search(query) => {
                self.query = query;
                self.refresh();
            }
            ViewIntent::Submit(draft) => {
                match self.session.route() {
                    SubmitRoute::Create => {
                        let mutation = self.store.create(&draft)?;
                        self.report_persist_warning(mutation.persist_warning);
                    }
                    SubmitRoute::Update(id) => {
                        let mutation = self.store.update(id, &draft)?;
                        self.report_persist_warning(mutation.persist_warning);
                    }
                }
                self.session.clear();
                self.refresh();
            }
        }
        Ok(())
    }

    fn resolve(&self, position: usize) -> StoreResult<TaskId> {
        self.displayed
            .get(position)
            .map(|task| task.id)
            .ok_or(StoreError::OutOfBounds {
                position,
                len: self.displayed.len(),
            })
    }

    fn after_mutation(&mut self, mutation: Mutation<Task>) {
        if let Some(event) = mutation.event {
            self.view.notify(event);
        }
        self.report_persist_warning(mutation.persist_warning);
        self.refresh();
    }

    fn report_persist_warning(&mut self, warning: Option<PersistError>) {
        if let Some(err) = warning {
            self.view
                .alert(&format!("change kept but may not have been saved: {err}"));
        }
    }

    fn refresh(&mut self) {
        self.displayed = self.store.search(&self.query);
        self.view.render(&self.displayed);
    }
}

fn intent_label(intent: &ViewIntent) -> &'static str {
    match intent {
        ViewIntent::Complete(_) => "complete",
        ViewIntent::Delete(_) => "delete",
        ViewIntent::UpdateRequest(_) => "update_request",
        ViewIntent::Search(_) => "search",
        ViewIntent::Submit(_) => "submit",
    }
}
