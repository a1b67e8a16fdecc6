use chrono::NaiveDate;
use ticknext::category::{is_hex_color, DEFAULT_CATEGORIES, OTHERS};
use ticknext::{MemoryStorage, NewTask, Priority, StorageError, Storage, Subtask, TaskError, TaskPatch, TaskStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn empty_store() -> TaskStore<MemoryStorage> {
    TaskStore::open(MemoryStorage::new()).unwrap()
}

#[test]
fn test_add_task_defaults() {
    let mut store = empty_store();
    let task = store
        .add_task(NewTask::new("  Write report ", date(2025, 3, 12)).priority(Priority::High).category("work"))
        .unwrap();

    assert_eq!(task.title, "Write report");
    assert!(!task.completed);
    assert!(task.subtasks.is_empty());
    assert_eq!(store.get_all_tasks().len(), 1);
    assert_eq!(store.get_task(&task.id), Some(&task));
    assert_eq!(store.storage().saves(), 1);
    assert_eq!(store.storage().snapshot().tasks, vec![task]);
}

#[test]
fn test_ids_are_unique() {
    let mut store = empty_store();
    let mut ids = std::collections::HashSet::new();
    for i in 0..50 {
        let t = store
            .add_task(NewTask::new(format!("Task {}", i), date(2025, 3, 12)).subtask("a").subtask("b"))
            .unwrap();
        assert!(ids.insert(t.id.clone()));
        for s in &t.subtasks {
            assert!(ids.insert(s.id.clone()));
        }
    }
}

#[test]
fn test_add_task_validation() {
    let mut store = empty_store();
    let due = date(2025, 3, 12);

    assert!(matches!(store.add_task(NewTask::new("   ", due)), Err(TaskError::Validation(_))));
    assert!(matches!(
        store.add_task(NewTask::new("Title", due).category("nope")),
        Err(TaskError::Validation(_))
    ));
    assert!(matches!(
        store.add_task(NewTask::new("Title", due).subtask(" ")),
        Err(TaskError::Validation(_))
    ));
    assert!(store.get_all_tasks().is_empty());
    assert_eq!(store.storage().saves(), 0);
}

#[test]
fn test_toggle_twice_restores_state() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Flip", date(2025, 3, 12))).unwrap();

    assert!(store.toggle_task_completion(&task.id).unwrap());
    assert!(!store.toggle_task_completion(&task.id).unwrap());
    assert!(!store.get_task(&task.id).unwrap().completed);
}

#[test]
fn test_toggle_unknown_task() {
    let mut store = empty_store();
    let err = store.toggle_task_completion("missing").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_update_merges_fields() {
    let mut store = empty_store();
    let task = store
        .add_task(NewTask::new("Groceries", date(2025, 3, 12)).subtask("Milk").subtask("Bread"))
        .unwrap();
    let milk = task.subtasks[0].id.clone();
    assert!(store.toggle_subtask_completion(&task.id, &milk).unwrap());

    let patch = TaskPatch { title: Some("Weekly groceries".into()), ..TaskPatch::default() };
    let updated = store.update_task(&task.id, patch).unwrap();

    assert_eq!(updated.title, "Weekly groceries");
    assert_eq!(updated.due_date, task.due_date);
    assert_eq!(updated.priority, task.priority);
    assert_eq!(updated.subtasks.len(), 2);
    assert!(updated.subtasks[0].completed);
    assert!(!updated.subtasks[1].completed);
    assert_eq!(updated.created_at, task.created_at);
}

#[test]
fn test_update_rejects_bad_input_without_change() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Keep me", date(2025, 3, 12))).unwrap();
    let saves = store.storage().saves();

    let patch = TaskPatch {
        title: Some("".into()),
        priority: Some(Priority::Low),
        ..TaskPatch::default()
    };
    assert!(matches!(store.update_task(&task.id, patch), Err(TaskError::Validation(_))));
    assert_eq!(store.get_task(&task.id), Some(&task));
    assert_eq!(store.storage().saves(), saves);

    let err = store.update_task("missing", TaskPatch::default()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_update_replaces_subtasks() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Groceries", date(2025, 3, 12)).subtask("Milk")).unwrap();

    let eggs = Subtask { id: "eggs".into(), text: " Eggs ".into(), completed: true };
    let patch = TaskPatch { subtasks: Some(vec![eggs]), ..TaskPatch::default() };
    let updated = store.update_task(&task.id, patch).unwrap();

    assert_eq!(updated.subtasks.len(), 1);
    assert_eq!(updated.subtasks[0].id, "eggs");
    assert!(updated.subtasks[0].completed);
    assert_eq!(updated.title, "Groceries");
}

#[test]
fn test_update_rejects_bad_subtasks_without_change() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Groceries", date(2025, 3, 12)).subtask("Milk")).unwrap();
    let saves = store.storage().saves();

    let sub = |id: &str, text: &str| Subtask { id: id.into(), text: text.into(), completed: false };
    let bad = [
        vec![sub("s", "Bread"), sub("s", "Butter")],
        vec![sub("", "Bread")],
        vec![sub("s", "  ")],
    ];
    for subtasks in bad {
        let patch = TaskPatch { subtasks: Some(subtasks), ..TaskPatch::default() };
        assert!(matches!(store.update_task(&task.id, patch), Err(TaskError::Validation(_))));
    }
    assert_eq!(store.get_task(&task.id), Some(&task));
    assert_eq!(store.storage().saves(), saves);
}

#[test]
fn test_update_rejects_unknown_category_without_change() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Report", date(2025, 3, 12)).category("work")).unwrap();
    let saves = store.storage().saves();

    let patch = TaskPatch {
        category: Some("nope".into()),
        priority: Some(Priority::High),
        ..TaskPatch::default()
    };
    assert!(matches!(store.update_task(&task.id, patch), Err(TaskError::Validation(_))));
    assert_eq!(store.get_task(&task.id), Some(&task));
    assert_eq!(store.storage().saves(), saves);
}

#[test]
fn test_delete_task_is_idempotent() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Gone soon", date(2025, 3, 12))).unwrap();

    assert!(store.delete_task(&task.id).unwrap());
    assert!(!store.delete_task(&task.id).unwrap());
    assert!(store.get_all_tasks().is_empty());
}

#[test]
fn test_subtasks() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Trip", date(2025, 3, 20))).unwrap();

    let first = store.add_subtask(&task.id, "Book hotel").unwrap();
    let second = store.add_subtask(&task.id, "Pack").unwrap();
    assert!(!first.completed);

    let stored = store.get_task(&task.id).unwrap();
    assert_eq!(stored.subtasks, vec![first.clone(), second]);

    assert!(store.add_subtask("missing", "x").unwrap_err().is_not_found());
    assert!(matches!(store.add_subtask(&task.id, ""), Err(TaskError::Validation(_))));
    assert!(store.toggle_subtask_completion(&task.id, "missing").unwrap_err().is_not_found());
    assert!(store.toggle_subtask_completion("missing", &first.id).unwrap_err().is_not_found());
    assert_eq!(store.get_task(&task.id).unwrap().subtask_progress(), (0, 2));
}

#[test]
fn test_clear_completed() {
    let mut store = empty_store();
    let a = store.add_task(NewTask::new("A", date(2025, 3, 12))).unwrap();
    store.add_task(NewTask::new("B", date(2025, 3, 12))).unwrap();
    store.toggle_task_completion(&a.id).unwrap();

    assert_eq!(store.clear_completed_tasks().unwrap(), 1);
    assert_eq!(store.get_all_tasks().len(), 1);
    assert_eq!(store.get_all_tasks()[0].title, "B");
}

#[test]
fn test_add_category_without_color() {
    let mut store = empty_store();
    let cat = store.add_category("Side Projects", None).unwrap();

    assert_eq!(cat.id, "side-projects");
    assert_eq!(cat.name, "Side Projects");
    assert!(is_hex_color(&cat.color), "bad color {}", cat.color);
    assert_eq!(store.get_category("side-projects"), Some(&cat));
    assert!(store.storage().snapshot().categories.contains(&cat));
}

#[test]
fn test_add_category_collision_rejected() {
    let mut store = empty_store();
    store.add_category("Side Projects", Some("#123456")).unwrap();
    let err = store.add_category("SIDE projects", None).unwrap_err();
    assert!(matches!(err, TaskError::CategoryExists(ref id) if id == "side-projects"));
    assert_eq!(store.get_categories().len(), DEFAULT_CATEGORIES.len() + 1);
}

#[test]
fn test_update_category() {
    let mut store = empty_store();
    assert!(store.update_category("work", Some("Office"), None).unwrap());
    let work = store.get_category("work").unwrap();
    assert_eq!(work.name, "Office");
    assert_eq!(work.color, "#ff5252");

    assert!(!store.update_category("missing", Some("X"), Some("#000000")).unwrap());
}

#[test]
fn test_update_category_unknown_id_before_name_check() {
    let mut store = empty_store();
    assert!(!store.update_category("nope", Some("  "), None).unwrap());

    let err = store.update_category("work", Some("  "), Some("#000000")).unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
    let work = store.get_category("work").unwrap();
    assert_eq!(work.name, "Work");
    assert_eq!(work.color, "#ff5252");
    assert_eq!(store.storage().saves(), 0);
}

#[test]
fn test_delete_unknown_category_is_not_found() {
    let mut store = empty_store();
    store.add_category("Garden", None).unwrap();
    let before = store.get_categories().to_vec();

    assert!(store.delete_category("nope").unwrap_err().is_not_found());
    assert_eq!(store.get_categories(), &before[..]);
    assert_eq!(store.storage().saves(), 1);
}

#[test]
fn test_delete_category_reassigns_tasks() {
    let mut store = empty_store();
    store.add_category("Garden", Some("#00aa00")).unwrap();
    let a = store.add_task(NewTask::new("Plant", date(2025, 3, 12)).category("garden")).unwrap();
    let b = store.add_task(NewTask::new("Water", date(2025, 3, 13)).category("garden")).unwrap();
    let c = store.add_task(NewTask::new("Email", date(2025, 3, 13)).category("work")).unwrap();

    assert_eq!(store.delete_category("garden").unwrap(), 2);
    assert!(store.get_category("garden").is_none());
    assert_eq!(store.get_task(&a.id).unwrap().category, OTHERS);
    assert_eq!(store.get_task(&b.id).unwrap().category, OTHERS);
    assert_eq!(store.get_task(&c.id).unwrap().category, "work");
}

#[test]
fn test_default_categories_cannot_be_deleted() {
    let mut store = empty_store();
    let t = store.add_task(NewTask::new("Study", date(2025, 3, 12)).category("study")).unwrap();

    for (id, _, _) in DEFAULT_CATEGORIES {
        let err = store.delete_category(id).unwrap_err();
        assert!(matches!(err, TaskError::ProtectedCategory(ref p) if p == id));
    }
    assert_eq!(store.get_categories().len(), DEFAULT_CATEGORIES.len());
    assert_eq!(store.get_task(&t.id).unwrap().category, "study");
    assert_eq!(store.storage().saves(), 1);
}

#[test]
fn test_failed_save_is_reported_and_kept_in_memory() {
    let mut store = empty_store();
    store.storage_mut().fail_saves(true);

    let err = store.add_task(NewTask::new("Unsaved", date(2025, 3, 12))).unwrap_err();
    assert!(matches!(err, TaskError::Persistence(_)));
    assert!(store.is_dirty());
    assert_eq!(store.get_all_tasks().len(), 1);
    assert!(store.storage().snapshot().tasks.is_empty());

    store.storage_mut().fail_saves(false);
    store.flush().unwrap();
    assert!(!store.is_dirty());
    assert_eq!(store.storage().snapshot().tasks.len(), 1);
}

#[test]
fn test_failed_save_keeps_category_reassignment() {
    let mut store = empty_store();
    store.add_category("Garden", None).unwrap();
    let task = store.add_task(NewTask::new("Plant", date(2025, 3, 12)).category("garden")).unwrap();
    store.storage_mut().fail_saves(true);

    let err = store.delete_category("garden").unwrap_err();
    assert!(matches!(err, TaskError::Persistence(_)));
    assert!(store.is_dirty());
    assert!(store.get_category("garden").is_none());
    assert_eq!(store.get_task(&task.id).unwrap().category, OTHERS);
    assert_eq!(store.storage().snapshot().tasks[0].category, "garden");

    store.storage_mut().fail_saves(false);
    store.flush().unwrap();
    assert!(!store.is_dirty());
    let saved = store.storage().snapshot();
    assert_eq!(saved.tasks[0].category, OTHERS);
    assert!(saved.categories.iter().all(|c| c.id != "garden"));
}

#[test]
fn test_failed_save_keeps_subtask_toggle() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Trip", date(2025, 3, 20)).subtask("Pack")).unwrap();
    let sub = task.subtasks[0].id.clone();
    store.storage_mut().fail_saves(true);

    let err = store.toggle_subtask_completion(&task.id, &sub).unwrap_err();
    assert!(matches!(err, TaskError::Persistence(_)));
    assert!(store.is_dirty());
    assert!(store.get_task(&task.id).unwrap().subtasks[0].completed);
    assert!(!store.storage().snapshot().tasks[0].subtasks[0].completed);

    store.storage_mut().fail_saves(false);
    store.flush().unwrap();
    assert!(!store.is_dirty());
    assert!(store.storage().snapshot().tasks[0].subtasks[0].completed);
}

#[test]
fn test_open_rejects_repeated_task_ids() {
    let mut store = empty_store();
    let task = store.add_task(NewTask::new("Twice", date(2025, 3, 12))).unwrap();
    let mut snapshot = store.storage().snapshot().clone();
    snapshot.tasks.push(task.clone());

    let err = TaskStore::open(MemoryStorage::with_snapshot(snapshot)).err().unwrap();
    assert!(matches!(err, TaskError::Persistence(StorageError::DuplicateId(ref id)) if *id == task.id));
}

#[test]
fn test_reopen_from_saved_snapshot() {
    let mut store = empty_store();
    store.add_category("Garden", None).unwrap();
    let task = store
        .add_task(NewTask::new("Plant", date(2025, 3, 12)).category("garden").subtask("Seeds"))
        .unwrap();

    let saved = store.storage().snapshot().clone();
    let reopened = TaskStore::open(MemoryStorage::with_snapshot(saved.clone())).unwrap();
    assert_eq!(reopened.get_all_tasks(), &[task][..]);
    assert_eq!(reopened.get_categories(), store.get_categories());
    assert_eq!(reopened.storage().load().unwrap(), saved);
}
