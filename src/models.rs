use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Format used for due dates on the wire and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TaskError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TaskError::validation("due date is required"));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| TaskError::validation(format!("invalid date '{}': {}. Use YYYY-MM-DD.", s, e)))
}

/// Task priority. Declaration order is the display order: high sorts first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(TaskError::validation(format!(
                "unknown priority '{}'. Supported: high, medium, low.",
                other
            ))),
        }
    }
}

/// A checklist item belonging to exactly one task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Represents a single task in the tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: String,
    pub title: String,
    /// Calendar date the task is due. Never carries a time of day.
    pub due_date: NaiveDate,
    pub priority: Priority,
    /// Category id. A dangling id is read as `others`.
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Informational only.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Overdue means due strictly before `today` and still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && !self.completed
    }

    /// Returns `(done, total)` for the subtask checklist.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }

    pub fn subtask(&self, id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == id)
    }
}

/// A labeled, colored grouping for tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Input for creating a task. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub category: String,
    /// Subtask texts, in display order.
    pub subtasks: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            due_date,
            priority: Priority::default(),
            category: crate::category::OTHERS.to_string(),
            subtasks: Vec::new(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn subtask(mut self, text: impl Into<String>) -> Self {
        self.subtasks.push(text.into());
        self
    }
}

/// Field-level update for a task. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    /// Replaces the whole checklist when present.
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.completed.is_none()
            && self.subtasks.is_none()
    }

    /// Merges the supplied fields into `task`.
    pub(crate) fn apply_to(self, task: &mut Task) {
        if let Some(t) = self.title { task.title = t; }
        if let Some(d) = self.due_date { task.due_date = d; }
        if let Some(p) = self.priority { task.priority = p; }
        if let Some(c) = self.category { task.category = c; }
        if let Some(c) = self.completed { task.completed = c; }
        if let Some(s) = self.subtasks { task.subtasks = s; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, Priority::ALL.to_vec());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
        assert_eq!(parse_date(" 2025-02-03 ").unwrap(), NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
    }

    #[test]
    fn task_serializes_with_iso_date() {
        let task = Task {
            id: "a1".into(),
            title: "Write report".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            priority: Priority::High,
            category: "work".into(),
            completed: false,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2025-12-01");
        assert_eq!(json["priority"], "high");
    }
}
