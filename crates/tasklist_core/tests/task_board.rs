use tasklist_core::{
    MemoryKvStore, StoreError, Task, TaskBoard, TaskDraft, TaskEvent, TaskStore, TaskView,
    ViewIntent,
};

#[derive(Default)]
struct RecordingView {
    renders: Vec<Vec<String>>,
    prefilled: Vec<TaskDraft>,
    events: Vec<TaskEvent>,
    alerts: Vec<String>,
}

impl TaskView for RecordingView {
    fn render(&mut self, tasks: &[Task]) {
        self.renders
            .push(tasks.iter().map(|task| task.name.clone()).collect());
    }

    fn prefill(&mut self, draft: &TaskDraft) {
        self.prefilled.push(draft.clone());
    }

    fn notify(&mut self, event: TaskEvent) {
        self.events.push(event);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

fn draft(name: &str) -> TaskDraft {
    TaskDraft::new(name, "Some work", "Work", "2024-01-01")
}

fn board_with(names: &[&str]) -> TaskBoard<MemoryKvStore, RecordingView> {
    let mut board = TaskBoard::start(
        TaskStore::new(MemoryKvStore::new()),
        RecordingView::default(),
    );
    for name in names {
        board.dispatch(ViewIntent::Submit(draft(name))).unwrap();
    }
    board
}

fn last_render(board: &TaskBoard<MemoryKvStore, RecordingView>) -> Vec<String> {
    board.view().renders.last().cloned().unwrap_or_default()
}

#[test]
fn start_renders_persisted_tasks() {
    let backing = MemoryKvStore::new();
    let mut store = TaskStore::new(backing.clone());
    store.initialize();
    store.create(&draft("Groceries")).unwrap();

    let board = TaskBoard::start(TaskStore::new(backing), RecordingView::default());
    assert_eq!(board.view().renders, vec![vec!["Groceries".to_string()]]);
}

#[test]
fn filtered_positions_resolve_to_the_displayed_task() {
    let mut board = board_with(&["Groceries", "Write report", "Rewrite notes"]);

    board
        .dispatch(ViewIntent::Search("write".to_string()))
        .unwrap();
    assert_eq!(last_render(&board), vec!["Write report", "Rewrite notes"]);

    // Position 1 of the filtered view is "Rewrite notes", store position 2.
    board.dispatch(ViewIntent::Complete(1)).unwrap();
    let tasks = board.store().tasks();
    assert!(!tasks[0].done);
    assert!(!tasks[1].done);
    assert!(tasks[2].done);
    assert_eq!(board.view().events, vec![TaskEvent::Completed(tasks[2].id)]);

    // The filter stays active after a mutation.
    assert_eq!(last_render(&board), vec!["Write report", "Rewrite notes"]);
}

#[test]
fn update_request_then_submit_routes_to_update() {
    let mut board = board_with(&["Groceries", "Write report"]);
    let target = board.store().tasks()[1].id;

    board.dispatch(ViewIntent::Complete(1)).unwrap();
    board.dispatch(ViewIntent::UpdateRequest(1)).unwrap();
    assert_eq!(board.session().target(), Some(target));
    assert_eq!(board.view().prefilled, vec![draft("Write report")]);

    board
        .dispatch(ViewIntent::Submit(draft("Finish report")))
        .unwrap();
    assert!(!board.session().is_active());
    assert_eq!(board.store().len(), 2);
    let updated = &board.store().tasks()[1];
    assert_eq!(updated.id, target);
    assert_eq!(updated.name, "Finish report");
    assert!(!updated.done);
}

#[test]
fn rejected_submit_alerts_and_keeps_session() {
    let mut board = board_with(&["Groceries"]);
    board.dispatch(ViewIntent::UpdateRequest(0)).unwrap();

    let err = board
        .dispatch(ViewIntent::Submit(draft("Buy 2 eggs")))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(board.view().alerts.len(), 1);
    assert!(board.session().is_active());
    assert_eq!(board.store().tasks()[0].name, "Groceries");
}

#[test]
fn deleting_edited_task_ends_session() {
    let mut board = board_with(&["Groceries", "Write report"]);
    board.dispatch(ViewIntent::UpdateRequest(0)).unwrap();

    board.dispatch(ViewIntent::Delete(0)).unwrap();
    assert!(!board.session().is_active());
    assert_eq!(last_render(&board), vec!["Write report"]);
    assert!(matches!(board.view().events[0], TaskEvent::Deleted(_)));

    board.dispatch(ViewIntent::Submit(draft("Call mom"))).unwrap();
    assert_eq!(last_render(&board), vec!["Write report", "Call mom"]);
}

#[test]
fn stale_display_position_is_rejected() {
    let mut board = board_with(&["Groceries"]);

    let err = board.dispatch(ViewIntent::Delete(3)).unwrap_err();
    assert_eq!(
        err,
        StoreError::OutOfBounds {
            position: 3,
            len: 1
        }
    );
    assert_eq!(board.store().len(), 1);
    assert_eq!(board.view().alerts.len(), 1);
}

#[test]
fn save_failure_is_alerted_but_change_is_shown() {
    let backing = MemoryKvStore::new();
    let mut board = TaskBoard::start(TaskStore::new(backing.clone()), RecordingView::default());
    backing.set_fail_writes(true);

    board.dispatch(ViewIntent::Submit(draft("Groceries"))).unwrap();
    assert_eq!(last_render(&board), vec!["Groceries"]);
    assert_eq!(board.view().alerts.len(), 1);
    assert!(board.view().alerts[0].contains("may not have been saved"));
}
