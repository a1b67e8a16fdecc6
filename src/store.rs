//! The canonical task collection and its persistence.
//!
//! Every mutating operation validates against the current state first and
//! only then changes it, so a rejected call leaves the store untouched. After
//! the change the full collection is written through the [`Storage`]. When
//! that write fails the change stays in memory, the store is marked dirty and
//! the caller receives [`TaskError::Persistence`].

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::category::{CategoryRegistry, OTHERS};
use crate::error::{Record, Result, StorageError, TaskError};
use crate::models::{Category, NewTask, Subtask, Task, TaskPatch};
use crate::storage::Storage;

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TaskError::validation("task title cannot be empty"));
    }
    Ok(())
}

fn validate_subtask_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(TaskError::validation("subtask text cannot be empty"));
    }
    Ok(())
}

pub struct TaskStore<S: Storage> {
    tasks: Vec<Task>,
    categories: CategoryRegistry,
    storage: S,
    dirty: bool,
}

impl<S: Storage> TaskStore<S> {
    /// Loads the full collection once from `storage`.
    pub fn open(storage: S) -> Result<Self> {
        let snapshot = storage.load()?;
        let mut seen = HashSet::new();
        if let Some(dup) = snapshot.tasks.iter().find(|t| !seen.insert(t.id.as_str())) {
            warn!(id = %dup.id, "refusing to open data with a repeated task id");
            return Err(StorageError::DuplicateId(dup.id.clone()).into());
        }
        let categories = CategoryRegistry::from_records(snapshot.categories);
        for task in snapshot.tasks.iter().filter(|t| !categories.contains(&t.category)) {
            warn!(task = %task.id, category = %task.category, "task references unknown category, reading it as '{}'", OTHERS);
        }
        debug!(tasks = snapshot.tasks.len(), categories = categories.all().len(), "task store opened");
        Ok(Self {
            tasks: snapshot.tasks,
            categories,
            storage,
            dirty: false,
        })
    }

    fn persist(&mut self) -> Result<()> {
        match self.storage.save(&self.tasks, self.categories.all()) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                warn!(error = %e, "failed to save, keeping unsaved changes in memory");
                Err(e.into())
            }
        }
    }

    /// Writes the in-memory state again, e.g. after a failed save.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    /// True when the last save attempt failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn next_task_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::not_found(Record::Task, id))
    }

    fn validate_category(&self, id: &str) -> Result<()> {
        if !self.categories.contains(id) {
            return Err(TaskError::validation(format!("unknown category '{}'", id)));
        }
        Ok(())
    }

    // Tasks

    pub fn get_all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Creates a task with a fresh id, `completed = false` and one subtask
    /// per supplied text.
    pub fn add_task(&mut self, new_task: NewTask) -> Result<Task> {
        validate_title(&new_task.title)?;
        self.validate_category(&new_task.category)?;
        for text in &new_task.subtasks {
            validate_subtask_text(text)?;
        }

        let task = Task {
            id: self.next_task_id(),
            title: new_task.title.trim().to_string(),
            due_date: new_task.due_date,
            priority: new_task.priority,
            category: new_task.category,
            completed: false,
            subtasks: new_task
                .subtasks
                .into_iter()
                .map(|text| Subtask { id: generate_id(), text: text.trim().to_string(), completed: false })
                .collect(),
            created_at: Utc::now(),
        };
        info!(id = %task.id, due = %task.due_date, "task added");
        self.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Merges the fields present in `patch` into the task; everything else,
    /// subtasks included, is kept.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let idx = self.index_of(id)?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(category) = &patch.category {
            self.validate_category(category)?;
        }
        if let Some(subtasks) = &patch.subtasks {
            for (i, s) in subtasks.iter().enumerate() {
                validate_subtask_text(&s.text)?;
                if s.id.is_empty() || subtasks[..i].iter().any(|o| o.id == s.id) {
                    return Err(TaskError::validation(format!("duplicate or empty subtask id '{}'", s.id)));
                }
            }
        }

        let mut patch = patch;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
        }
        let mut task = self.tasks[idx].clone();
        patch.apply_to(&mut task);
        self.tasks[idx] = task.clone();
        debug!(id = %id, "task updated");
        self.persist()?;
        Ok(task)
    }

    /// Removes the task if present. Returns whether anything was removed.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            info!(id = %id, "task deleted");
        }
        self.persist()?;
        Ok(removed)
    }

    /// Flips `completed` and returns the new value.
    pub fn toggle_task_completion(&mut self, id: &str) -> Result<bool> {
        let idx = self.index_of(id)?;
        let task = &mut self.tasks[idx];
        task.completed = !task.completed;
        let completed = task.completed;
        debug!(id = %id, completed, "task toggled");
        self.persist()?;
        Ok(completed)
    }

    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> Result<Subtask> {
        let idx = self.index_of(task_id)?;
        validate_subtask_text(text)?;
        let subtask = Subtask {
            id: generate_id(),
            text: text.trim().to_string(),
            completed: false,
        };
        self.tasks[idx].subtasks.push(subtask.clone());
        debug!(task = %task_id, subtask = %subtask.id, "subtask added");
        self.persist()?;
        Ok(subtask)
    }

    /// Flips the subtask's `completed` and returns the new value.
    pub fn toggle_subtask_completion(&mut self, task_id: &str, subtask_id: &str) -> Result<bool> {
        let idx = self.index_of(task_id)?;
        let subtask = self.tasks[idx]
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| TaskError::not_found(Record::Subtask, subtask_id))?;
        subtask.completed = !subtask.completed;
        let completed = subtask.completed;
        debug!(task = %task_id, subtask = %subtask_id, completed, "subtask toggled");
        self.persist()?;
        Ok(completed)
    }

    /// Removes every completed task. Returns how many were removed.
    pub fn clear_completed_tasks(&mut self) -> Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        info!(removed, "cleared completed tasks");
        self.persist()?;
        Ok(removed)
    }

    // Categories

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn get_categories(&self) -> &[Category] {
        self.categories.all()
    }

    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Adds a category; its id is derived from `name`. Without a color a
    /// random `#RRGGBB` is drawn.
    pub fn add_category(&mut self, name: &str, color: Option<&str>) -> Result<Category> {
        let category = self.categories.add(name, color)?;
        self.persist()?;
        Ok(category)
    }

    /// Updates only the supplied fields. Unknown ids return `Ok(false)`.
    pub fn update_category(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<bool> {
        if !self.categories.update(id, name, color)? {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Deletes a non-default category and moves its tasks to `others`.
    /// Returns the number of reassigned tasks.
    pub fn delete_category(&mut self, id: &str) -> Result<usize> {
        let removed = self.categories.remove(id)?;
        let mut moved = 0;
        for task in self.tasks.iter_mut().filter(|t| t.category == removed.id) {
            task.category = OTHERS.to_string();
            moved += 1;
        }
        info!(id = %removed.id, moved, "category deleted");
        self.persist()?;
        Ok(moved)
    }
}
