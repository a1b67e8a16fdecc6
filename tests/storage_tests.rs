use std::fs;

use chrono::NaiveDate;
use ticknext::storage::SCHEMA_VERSION;
use ticknext::{JsonFileStorage, NewTask, Priority, StorageError, Storage, TaskError, TaskStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("tasks.json"));
    let store = TaskStore::open(storage).unwrap();
    assert!(store.get_all_tasks().is_empty());
    assert_eq!(store.get_categories().len(), 5);
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tasks.json");

    let mut store = TaskStore::open(JsonFileStorage::new(&path)).unwrap();
    store.add_category("Side Projects", None).unwrap();
    let a = store
        .add_task(NewTask::new("Ship it", date(2025, 12, 1)).priority(Priority::High).category("side-projects").subtask("Tag release"))
        .unwrap();
    store.add_task(NewTask::new("Call mum", date(2025, 12, 2)).category("personal")).unwrap();
    store.toggle_subtask_completion(&a.id, &a.subtasks[0].id).unwrap();
    store.toggle_task_completion(&a.id).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = TaskStore::open(JsonFileStorage::new(&path)).unwrap();
    assert_eq!(reopened.get_all_tasks(), store.get_all_tasks());
    assert_eq!(reopened.get_categories(), store.get_categories());
}

#[test]
fn test_document_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut store = TaskStore::open(JsonFileStorage::new(&path)).unwrap();
    store.add_task(NewTask::new("Report", date(2025, 12, 1)).category("work")).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["version"], SCHEMA_VERSION);
    assert_eq!(doc["tasks"][0]["dueDate"], "2025-12-01");
    assert_eq!(doc["tasks"][0]["category"], "work");
    assert_eq!(doc["tasks"][0]["completed"], false);
    assert_eq!(doc["categories"].as_array().unwrap().len(), 5);
}

#[test]
fn test_newer_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, format!(r#"{{"version": {}, "tasks": [], "categories": []}}"#, SCHEMA_VERSION + 1)).unwrap();

    let err = JsonFileStorage::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::UnsupportedVersion { .. }));
    assert!(matches!(TaskStore::open(JsonFileStorage::new(&path)), Err(TaskError::Persistence(_))));
}

#[test]
fn test_unversioned_task_array_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[{"id": "abc", "title": "Old task", "dueDate": "2024-01-05", "priority": "low",
             "category": "home", "createdAt": "2024-01-01T10:00:00Z"}]"#,
    )
    .unwrap();

    let snapshot = JsonFileStorage::new(&path).load().unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
    let task = &snapshot.tasks[0];
    assert_eq!(task.due_date, date(2024, 1, 5));
    assert!(!task.completed);
    assert!(task.subtasks.is_empty());
    assert!(snapshot.categories.is_empty());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(JsonFileStorage::new(&path).load(), Err(StorageError::Parse(_))));

    fs::write(&path, r#"{"version": 1, "tasks": [{"id": "x", "title": "t", "dueDate": "2024-13-40"}]}"#).unwrap();
    assert!(JsonFileStorage::new(&path).load().is_err());
}
