use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::category::CategoryRegistry;
use crate::models::{Priority, Task};

/// Active constraints on which tasks are listed. An empty set or a missing
/// date means that dimension matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub categories: BTreeSet<String>,
    pub date: Option<NaiveDate>,
    pub priorities: BTreeSet<Priority>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.date.is_none() && self.priorities.is_empty()
    }

    /// AND across dimensions. Category membership uses the task's effective
    /// category, so a dangling id matches `others`.
    pub fn matches(&self, task: &Task, registry: &CategoryRegistry) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(registry.resolve(&task.category)) {
            return false;
        }
        if let Some(date) = self.date {
            if task.due_date != date {
                return false;
            }
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        true
    }
}

/// Partial filter update. `None` leaves a dimension as it is;
/// `date: Some(None)` clears the date restriction.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub categories: Option<BTreeSet<String>>,
    pub date: Option<Option<NaiveDate>>,
    pub priorities: Option<BTreeSet<Priority>>,
}

impl FilterPatch {
    pub fn categories<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.categories = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        self.priorities = Some(priorities.into_iter().collect());
        self
    }
}

/// Holds the current [`FilterSpec`] and narrows task collections with it.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    spec: FilterSpec,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Merges the supplied dimensions into the current spec.
    pub fn set_filters(&mut self, patch: FilterPatch) {
        if let Some(c) = patch.categories { self.spec.categories = c; }
        if let Some(d) = patch.date { self.spec.date = d; }
        if let Some(p) = patch.priorities { self.spec.priorities = p; }
    }

    pub fn clear_filters(&mut self) {
        self.spec = FilterSpec::default();
    }

    /// Tasks passing every active dimension, in collection order.
    pub fn apply<'a>(&self, tasks: &'a [Task], registry: &CategoryRegistry) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.spec.matches(t, registry)).collect()
    }
}
