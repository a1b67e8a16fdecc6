use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::Result;
use crate::filter::{FilterEngine, FilterPatch, FilterSpec};
use crate::models::Task;
use crate::stats::{self, TaskStatistics};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::views;

/// One task tracker instance: a store, its list filter and a clock.
///
/// Listing views go through the filter; statistics and calendar markers
/// always read the whole store.
pub struct Planner<S: Storage, C: Clock> {
    store: TaskStore<S>,
    filter: FilterEngine,
    clock: C,
}

impl<S: Storage, C: Clock> Planner<S, C> {
    /// Loads the store from `storage`.
    pub fn open(storage: S, clock: C) -> Result<Self> {
        Ok(Self::new(TaskStore::open(storage)?, clock))
    }

    pub fn new(store: TaskStore<S>, clock: C) -> Self {
        Self { store, filter: FilterEngine::new(), clock }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Mutations go through the store directly.
    pub fn store_mut(&mut self) -> &mut TaskStore<S> {
        &mut self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // Filters

    pub fn filters(&self) -> &FilterSpec {
        self.filter.spec()
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filter.set_filters(patch);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear_filters();
    }

    pub fn get_all_tasks(&self) -> &[Task] {
        self.store.get_all_tasks()
    }

    pub fn get_filtered_tasks(&self) -> Vec<&Task> {
        self.filter.apply(self.store.get_all_tasks(), self.store.categories())
    }

    // Views

    pub fn get_daily_tasks(&self) -> Vec<&Task> {
        views::daily(&self.get_filtered_tasks(), self.today())
    }

    pub fn get_upcoming_tasks(&self) -> Vec<&Task> {
        views::upcoming(&self.get_filtered_tasks(), self.today())
    }

    pub fn get_missed_tasks(&self) -> Vec<&Task> {
        views::missed(&self.get_filtered_tasks(), self.today())
    }

    pub fn get_tasks_by_date(&self, date: NaiveDate) -> Vec<&Task> {
        views::on_date(&self.get_filtered_tasks(), date)
    }

    /// Dates in the month with at least one task, ignoring filters.
    pub fn calendar_markers(&self, year: i32, month: u32) -> BTreeSet<NaiveDate> {
        views::due_dates_in_month(self.store.get_all_tasks(), year, month)
    }

    pub fn get_task_statistics(&self) -> TaskStatistics {
        stats::compute(self.store.get_all_tasks(), self.store.categories(), self.today())
    }
}
