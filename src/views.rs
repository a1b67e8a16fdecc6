//! Time-based views over an already filtered task list.
//!
//! All views return tasks in display order: ascending due date, then
//! priority (high first), then original order.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::Task;

/// Length of the upcoming window in days, inclusive of both ends.
pub const UPCOMING_DAYS: i64 = 7;

/// Sorts by due date, then priority. Stable, so equal tasks keep their order.
pub fn sort_for_display(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.priority.cmp(&b.priority)));
}

fn select<'a>(tasks: &[&'a Task], pred: impl Fn(&Task) -> bool) -> Vec<&'a Task> {
    let mut out: Vec<&'a Task> = tasks.iter().copied().filter(|t| pred(t)).collect();
    sort_for_display(&mut out);
    out
}

/// Tasks due today.
pub fn daily<'a>(tasks: &[&'a Task], today: NaiveDate) -> Vec<&'a Task> {
    select(tasks, |t| t.due_date == today)
}

/// Tasks due within `[today, today + 7 days]`.
pub fn upcoming<'a>(tasks: &[&'a Task], today: NaiveDate) -> Vec<&'a Task> {
    let end = today + Duration::days(UPCOMING_DAYS);
    select(tasks, |t| t.due_date >= today && t.due_date <= end)
}

/// Open tasks due before today.
pub fn missed<'a>(tasks: &[&'a Task], today: NaiveDate) -> Vec<&'a Task> {
    select(tasks, |t| t.is_overdue(today))
}

/// Tasks due on exactly `date`.
pub fn on_date<'a>(tasks: &[&'a Task], date: NaiveDate) -> Vec<&'a Task> {
    select(tasks, |t| t.due_date == date)
}

/// Dates in the given month that have at least one task due, for calendar
/// markers. Returns an empty set for an invalid month.
pub fn due_dates_in_month(tasks: &[Task], year: i32, month: u32) -> BTreeSet<NaiveDate> {
    tasks
        .iter()
        .map(|t| t.due_date)
        .filter(|d| d.year() == year && d.month() == month)
        .collect()
}

/// How a due date reads relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    Other(NaiveDate),
}

pub fn relative_day(date: NaiveDate, today: NaiveDate) -> RelativeDay {
    if date == today {
        RelativeDay::Today
    } else if date == today + Duration::days(1) {
        RelativeDay::Tomorrow
    } else {
        RelativeDay::Other(date)
    }
}

impl std::fmt::Display for RelativeDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelativeDay::Today => f.write_str("Today"),
            RelativeDay::Tomorrow => f.write_str("Tomorrow"),
            RelativeDay::Other(d) => write!(f, "{}", d.format("%b %-d")),
        }
    }
}
