use chrono::{Local, NaiveDate};

/// Source of "today" for views and statistics.
pub trait Clock {
    /// The current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Reads the system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    pub fn set(&mut self, date: NaiveDate) {
        self.0 = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
