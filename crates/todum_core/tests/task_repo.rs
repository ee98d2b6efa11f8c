use chrono::{TimeZone, Utc};
use todum_core::{
    KeyValueStore, MemorySlotStore, RepoError, SqliteSlotStore, StoreError, StoreResult, Task,
    TaskId, TaskRepository, TASKS_STORAGE_KEY,
};

fn sample_tasks() -> Vec<Task> {
    let due = Utc.timestamp_millis_opt(1_767_605_400_123).unwrap();
    vec![
        Task::with_id(TaskId::parse("1").unwrap(), "Pay rent", "", due),
        Task::with_id(
            TaskId::parse("2").unwrap(),
            "Dentist",
            "bring insurance card",
            due + chrono::TimeDelta::days(3),
        )
        .completed(true),
    ]
}

/// Store whose reads and writes always fail.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

#[test]
fn save_then_load_round_trips_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");
    let tasks = sample_tasks();

    let repo = TaskRepository::new(SqliteSlotStore::open(&path).unwrap());
    assert!(repo.save(&tasks));
    drop(repo);

    let reopened = TaskRepository::new(SqliteSlotStore::open(&path).unwrap());
    let loaded = reopened.load();
    assert_eq!(loaded, tasks);
    assert_eq!(loaded[0].due_epoch_ms(), 1_767_605_400_123);
}

#[test]
fn load_on_absent_slot_is_empty() {
    let repo = TaskRepository::new(MemorySlotStore::new());
    assert!(repo.load().is_empty());
    assert!(repo.try_load().unwrap().is_empty());
}

#[test]
fn save_replaces_previous_collection() {
    let store = MemorySlotStore::new();
    let repo = TaskRepository::new(store.clone());
    let tasks = sample_tasks();

    repo.save(&tasks);
    repo.save(&tasks[..1]);

    assert_eq!(repo.load(), tasks[..1].to_vec());
    assert!(store.get(TASKS_STORAGE_KEY).unwrap().is_some());
}

#[test]
fn malformed_blob_loads_as_empty() {
    let store = MemorySlotStore::new();
    store.set(TASKS_STORAGE_KEY, "[{\"id\": 1,").unwrap();
    let repo = TaskRepository::new(store);

    assert!(repo.load().is_empty());
    assert!(matches!(repo.try_load(), Err(RepoError::Decode(_))));
}

#[test]
fn invalid_due_date_makes_blob_malformed() {
    let store = MemorySlotStore::new();
    store
        .set(
            TASKS_STORAGE_KEY,
            r#"[{"id":"1","title":"A","description":"","completed":false,"dueDate":"not a date"}]"#,
        )
        .unwrap();
    let repo = TaskRepository::new(store);

    assert!(repo.load().is_empty());
}

#[test]
fn out_of_range_due_dates_make_blob_malformed() {
    let max_ms = chrono::DateTime::<Utc>::MAX_UTC.timestamp_millis();
    for due in [
        max_ms.to_string(),
        r#""+262142-12-31T23:59:59.999Z""#.to_string(),
        r#""9999-12-31T23:00:00.000-05:00""#.to_string(),
    ] {
        let store = MemorySlotStore::new();
        let blob = format!(r#"[{{"id":"1","title":"A","dueDate":{due}}}]"#);
        store.set(TASKS_STORAGE_KEY, &blob).unwrap();
        let repo = TaskRepository::new(store);

        assert!(matches!(repo.try_load(), Err(RepoError::Decode(_))), "{blob}");
        let tasks = repo.load();
        assert!(tasks.is_empty());
        assert!(todum_core::group_tasks_by_date(&tasks, &Utc::now()).is_empty());
    }
}

#[test]
fn latest_storable_due_date_round_trips() {
    let due = Utc.timestamp_millis_opt(253_402_300_799_999).unwrap();
    let tasks = vec![Task::with_id(TaskId::parse("1").unwrap(), "A", "", due)];
    let repo = TaskRepository::new(MemorySlotStore::new());

    assert!(repo.save(&tasks));
    assert_eq!(
        repo.store().get(TASKS_STORAGE_KEY).unwrap().as_deref(),
        Some(r#"[{"id":"1","title":"A","description":"","completed":false,"dueDate":"9999-12-31T23:59:59.999Z"}]"#)
    );
    let loaded = repo.load();
    assert_eq!(loaded, tasks);
    assert!(!todum_core::is_overdue(&loaded[0], Utc::now()));
    assert_eq!(todum_core::group_tasks_by_date(&loaded, &Utc::now()).task_count(), 1);
}

#[test]
fn legacy_blob_shapes_are_accepted() {
    let store = MemorySlotStore::new();
    store
        .set(
            TASKS_STORAGE_KEY,
            r#"[
                {"id":"1736000000000","title":"A","description":"x","completed":true,"dueDate":"2026-01-05T09:30:00.000Z"},
                {"id":"1736000000001","title":"B","dueDate":1767605400000},
                {"id":"1736000000002","title":"C","description":"","completed":false,"dueDate":"2026-01-05T11:30:00+02:00"}
            ]"#,
        )
        .unwrap();
    let repo = TaskRepository::new(store);

    let loaded = repo.load();
    assert_eq!(loaded.len(), 3);
    assert!(loaded[0].completed);
    assert_eq!(loaded[0].description, "x");
    assert_eq!(loaded[1].description, "");
    assert!(!loaded[1].completed);
    assert_eq!(loaded[1].due_epoch_ms(), 1_767_605_400_000);
    assert_eq!(
        loaded[2].due_date,
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap()
    );
}

#[test]
fn duplicate_ids_keep_first_record() {
    let store = MemorySlotStore::new();
    store
        .set(
            TASKS_STORAGE_KEY,
            r#"[
                {"id":"1","title":"first","description":"","completed":false,"dueDate":"2026-01-05T09:30:00.000Z"},
                {"id":"1","title":"second","description":"","completed":false,"dueDate":"2026-01-06T09:30:00.000Z"}
            ]"#,
        )
        .unwrap();

    let loaded = TaskRepository::new(store).load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "first");
}

#[test]
fn store_failures_degrade_without_errors() {
    let repo = TaskRepository::new(BrokenStore);

    assert!(repo.load().is_empty());
    assert!(!repo.save(&sample_tasks()));
    assert!(matches!(repo.try_save(&[]), Err(RepoError::Store(_))));
}

#[test]
fn custom_slot_keys_are_isolated() {
    let store = MemorySlotStore::new();
    let main = TaskRepository::new(store.clone());
    let scratch = TaskRepository::with_key(store, "@TodumApp:scratch");

    main.save(&sample_tasks());
    assert!(scratch.load().is_empty());
    assert_eq!(scratch.key(), "@TodumApp:scratch");
}
