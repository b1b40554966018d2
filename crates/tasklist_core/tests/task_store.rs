use tasklist_core::{
    encode_snapshot, KvStore, MemoryKvStore, StoreError, TaskDraft, TaskEvent, TaskField,
    TaskStore, TaskValidationError, DEFAULT_STORAGE_KEY,
};

fn groceries() -> TaskDraft {
    TaskDraft::new("Groceries", "Buy milk", "Errand", "2024-01-01")
}

fn report() -> TaskDraft {
    TaskDraft::new("Write report", "Finish report", "Work", "2024-01-02")
}

fn fresh_store() -> TaskStore<MemoryKvStore> {
    let mut store = TaskStore::new(MemoryKvStore::new());
    store.initialize();
    store
}

#[test]
fn create_appends_not_done_task_at_end() {
    let mut store = fresh_store();

    let first = store.create(&groceries()).unwrap();
    assert!(first.is_persisted());
    assert_eq!(first.event, None);
    assert_eq!(first.value.position, 0);

    let second = store.create(&report()).unwrap().into_value();
    assert_eq!(second.position, 1);
    assert!(!second.task.done);
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[1].name, "Write report");
}

#[test]
fn create_rejects_invalid_candidates_without_mutation() {
    let mut store = fresh_store();
    store.create(&groceries()).unwrap();

    let mut empty_date = report();
    empty_date.date = String::new();
    assert_eq!(
        store.create(&empty_date).unwrap_err(),
        StoreError::Validation(TaskValidationError::MissingField {
            field: TaskField::Date
        })
    );

    let mut punctuated = report();
    punctuated.category = "Work!".to_string();
    assert_eq!(
        store.create(&punctuated).unwrap_err(),
        StoreError::Validation(TaskValidationError::InvalidCharacters {
            field: TaskField::Category
        })
    );

    assert_eq!(store.len(), 1);
}

#[test]
fn create_accepts_whitespace_only_text_and_stores_it_trimmed() {
    let mut store = fresh_store();

    let created = store
        .create(&TaskDraft::new("   ", "Buy milk", "Errand", "2024-01-01"))
        .unwrap()
        .into_value();
    assert_eq!(created.task.name, "");
    assert_eq!(store.tasks()[0].name, "");
    assert_eq!(store.len(), 1);
}

#[test]
fn complete_is_idempotent_and_signals_each_time() {
    let mut store = fresh_store();
    let id = store.create(&groceries()).unwrap().value.task.id;

    let first = store.complete_at(0).unwrap();
    assert!(first.value.done);
    assert_eq!(first.event, Some(TaskEvent::Completed(id)));

    let second = store.complete_at(0).unwrap();
    assert!(second.value.done);
    assert_eq!(second.event, Some(TaskEvent::Completed(id)));
}

#[test]
fn delete_shifts_later_positions_down() {
    let mut store = fresh_store();
    store.create(&groceries()).unwrap();
    store.create(&report()).unwrap();
    store
        .create(&TaskDraft::new("Call mom", "Weekly call", "Family", "2024-01-03"))
        .unwrap();
    let last_id = store.tasks()[2].id;

    let removed = store.delete_at(1).unwrap();
    assert_eq!(removed.value.name, "Write report");
    assert_eq!(removed.event, Some(TaskEvent::Deleted(removed.value.id)));
    assert_eq!(store.len(), 2);
    assert_eq!(store.position_of(last_id), Some(1));
}

#[test]
fn out_of_range_positions_fail_without_mutation() {
    let mut store = fresh_store();
    store.create(&groceries()).unwrap();

    let expected = StoreError::OutOfBounds {
        position: 1,
        len: 1,
    };
    assert_eq!(store.delete_at(1).unwrap_err(), expected);
    assert_eq!(store.complete_at(1).unwrap_err(), expected);
    assert_eq!(store.update_at(1, &report()).unwrap_err(), expected);
    assert_eq!(store.len(), 1);
    assert!(!store.tasks()[0].done);
}

#[test]
fn id_keyed_operations_reject_unknown_ids() {
    let mut store = fresh_store();
    let id = store.create(&groceries()).unwrap().value.task.id;
    store.delete(id).unwrap();

    assert_eq!(store.complete(id).unwrap_err(), StoreError::NotFound(id));
    assert_eq!(store.update(id, &report()).unwrap_err(), StoreError::NotFound(id));
    assert_eq!(store.delete(id).unwrap_err(), StoreError::NotFound(id));
}

#[test]
fn search_matches_name_substring_case_insensitively() {
    let mut store = fresh_store();
    store.create(&groceries()).unwrap();
    store.create(&report()).unwrap();

    assert_eq!(store.search(""), store.tasks().to_vec());
    let hits = store.search("  write");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Write report");
    assert!(store.search("milk").is_empty());
}

#[test]
fn search_complete_delete_scenario() {
    let mut store = fresh_store();
    store.create(&groceries()).unwrap();
    let b = store.create(&report()).unwrap().value.task;

    let hits = store.search("Write");
    assert_eq!(hits, vec![b.clone()]);

    store.complete_at(0).unwrap();
    assert!(store.tasks()[0].done);
    assert_eq!(store.tasks()[1], b);

    store.delete_at(0).unwrap();
    assert_eq!(store.tasks(), &[b][..]);
}

#[test]
fn fresh_store_reloads_identical_collection() {
    let backing = MemoryKvStore::new();
    let mut store = TaskStore::new(backing.clone());
    store.initialize();
    store.create(&groceries()).unwrap();
    store.create(&report()).unwrap();
    store
        .create(&TaskDraft::new("Gym", "Leg day", "Health", "2024-01-04"))
        .unwrap();
    store
        .update_at(2, &TaskDraft::new("Gym", "Arm day", "Health", "2024-01-05"))
        .unwrap();
    store.complete_at(1).unwrap();
    store.delete_at(0).unwrap();

    let mut reloaded = TaskStore::new(backing);
    let loaded = reloaded.initialize().to_vec();
    assert_eq!(loaded, store.tasks().to_vec());
    assert!(loaded[0].done);
    assert_eq!(loaded[1].description, "Arm day");
}

#[test]
fn corrupt_or_missing_data_loads_as_empty() {
    let backing = MemoryKvStore::new();
    let mut store = TaskStore::new(backing.clone());
    assert!(store.initialize().is_empty());

    backing.insert_raw(DEFAULT_STORAGE_KEY, "{not json");
    assert!(store.initialize().is_empty());

    backing.insert_raw(DEFAULT_STORAGE_KEY, r#"{"version":1,"tasks":[{"name":"x"}]}"#);
    assert!(store.initialize().is_empty());
}

#[test]
fn legacy_array_snapshot_is_loaded_in_order() {
    let backing = MemoryKvStore::new();
    backing.insert_raw(
        DEFAULT_STORAGE_KEY,
        r#"[{"name":"Groceries","description":"Buy milk","category":"Errand","date":"2024-01-01","done":false},
            {"name":"Write report","description":"Finish report","category":"Work","date":"2024-01-02","done":true}]"#,
    );

    let mut store = TaskStore::new(backing.clone());
    let loaded = store.initialize().to_vec();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "Groceries");
    assert!(loaded[1].done);

    store.complete_at(0).unwrap();
    let saved = backing.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(saved, encode_snapshot(store.tasks()).unwrap());
}

#[test]
fn failed_save_keeps_in_memory_change_and_warns() {
    let backing = MemoryKvStore::new();
    let mut store = TaskStore::new(backing.clone());
    store.initialize();
    store.create(&groceries()).unwrap();

    backing.set_fail_writes(true);
    let mutation = store.create(&report()).unwrap();
    assert!(!mutation.is_persisted());
    assert_eq!(store.len(), 2);

    let mut reloaded = TaskStore::new(backing);
    assert_eq!(reloaded.initialize().len(), 1);
}

#[test]
fn custom_storage_key_is_isolated() {
    let backing = MemoryKvStore::new();
    let mut work = TaskStore::with_storage_key(backing.clone(), "work");
    work.initialize();
    work.create(&report()).unwrap();

    let mut default = TaskStore::new(backing);
    assert!(default.initialize().is_empty());
}
