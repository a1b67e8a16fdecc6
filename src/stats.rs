//! Dashboard statistics. Always computed over the whole, unfiltered store.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::category::CategoryRegistry;
use crate::models::{Priority, Task};

/// Number of days in the trailing trend series, today included.
pub const TREND_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub id: String,
    pub name: String,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// One day of the trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendEntry {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Every known category in registry order, zero counts included.
    pub by_category: Vec<CategoryCount>,
    pub by_priority: PriorityCounts,
    /// Oldest first, ending today.
    pub weekly_trends: Vec<TrendEntry>,
}

impl TaskStatistics {
    /// Fraction of tasks completed, `0.0` for an empty store.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Pending tasks that are not yet overdue.
    pub fn on_track(&self) -> usize {
        self.pending - self.overdue
    }

    pub fn category_count(&self, id: &str) -> Option<usize> {
        self.by_category.iter().find(|c| c.id == id).map(|c| c.count)
    }
}

pub fn compute(tasks: &[Task], registry: &CategoryRegistry, today: NaiveDate) -> TaskStatistics {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();

    let mut by_category: Vec<CategoryCount> = registry
        .all()
        .iter()
        .map(|c| CategoryCount {
            id: c.id.clone(),
            name: c.name.clone(),
            color: c.color.clone(),
            count: 0,
        })
        .collect();
    for task in tasks {
        let id = registry.resolve(&task.category);
        if let Some(entry) = by_category.iter_mut().find(|c| c.id == id) {
            entry.count += 1;
        }
    }

    let mut by_priority = PriorityCounts::default();
    for task in tasks {
        match task.priority {
            Priority::High => by_priority.high += 1,
            Priority::Medium => by_priority.medium += 1,
            Priority::Low => by_priority.low += 1,
        }
    }

    TaskStatistics {
        total,
        completed,
        pending: total - completed,
        overdue,
        by_category,
        by_priority,
        weekly_trends: weekly_trends(tasks, today),
    }
}

/// Per-day totals for `[today - 6, today]`, by exact due date.
pub fn weekly_trends(tasks: &[Task], today: NaiveDate) -> Vec<TrendEntry> {
    (0..TREND_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let (total, completed) = tasks
                .iter()
                .filter(|t| t.due_date == date)
                .fold((0, 0), |(n, done), t| (n + 1, done + usize::from(t.completed)));
            TrendEntry { date, total, completed }
        })
        .collect()
}
