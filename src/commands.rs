//! Command handlers behind the `ticknext` binary. Each one drives a
//! [`Planner`] and prints the result as a table or a one-line message.

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::clock::Clock;
use crate::config::Theme;
use crate::error::{Record, Result, TaskError};
use crate::filter::FilterPatch;
use crate::models::{parse_date, NewTask, Priority, Task, TaskPatch};
use crate::planner::Planner;
use crate::storage::Storage;
use crate::views::{relative_day, sort_for_display};

/// Which task list to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ListView {
    /// Every task passing the filters.
    #[default]
    All,
    Today,
    /// Due within the next 7 days.
    Upcoming,
    /// Overdue and not completed.
    Missed,
}

/// Filter flags shared by the listing commands.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub categories: Vec<String>,
    pub priorities: Vec<String>,
    pub date: Option<String>,
}

impl FilterArgs {
    fn to_patch(&self) -> Result<FilterPatch> {
        let priorities = self
            .priorities
            .iter()
            .map(|p| p.parse::<Priority>())
            .collect::<Result<Vec<_>>>()?;
        let date = self.date.as_deref().map(parse_date).transpose()?;
        Ok(FilterPatch::default()
            .categories(self.categories.iter().cloned())
            .priorities(priorities)
            .date(date))
    }
}

/// Finds the single task whose id starts with `prefix`.
pub fn resolve_task_id<S: Storage, C: Clock>(planner: &Planner<S, C>, prefix: &str) -> Result<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(TaskError::validation("task id cannot be empty"));
    }
    if let Some(t) = planner.store().get_task(prefix) {
        return Ok(t.id.clone());
    }
    let mut matches = planner.get_all_tasks().iter().filter(|t| t.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(t), None) => Ok(t.id.clone()),
        (None, _) => Err(TaskError::not_found(Record::Task, prefix)),
        (Some(_), Some(_)) => Err(TaskError::validation(format!("task id prefix '{}' is ambiguous", prefix))),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn header_color(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Blue,
        Theme::Dark => Color::Cyan,
    }
}

fn header(theme: Theme, names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold).fg(header_color(theme)))
        .collect()
}

fn print_tasks<S: Storage, C: Clock>(planner: &Planner<S, C>, tasks: &[&Task], theme: Theme) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    let today = planner.today();
    let registry = planner.store().categories();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(theme, &["ID", "Title", "Category", "Priority", "Due", "Subtasks", "Status"]));

    for t in tasks {
        let category = registry
            .get(registry.resolve(&t.category))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        let (done, total) = t.subtask_progress();
        let subtasks = if total == 0 { "-".to_string() } else { format!("{}/{}", done, total) };
        let (status, status_color) = if t.completed {
            ("Done", Color::Green)
        } else if t.is_overdue(today) {
            ("Overdue", Color::Red)
        } else {
            ("Pending", Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(&t.title),
            Cell::new(category),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(relative_day(t.due_date, today))
                .fg(if t.is_overdue(today) { Color::Red } else { Color::Reset }),
            Cell::new(subtasks),
            Cell::new(status).fg(status_color),
        ]);
    }
    println!("{table}");
}

/// Adds a new task.
pub fn cmd_add<S: Storage, C: Clock>(
    planner: &mut Planner<S, C>,
    title: String,
    due: &str,
    priority: Option<&str>,
    category: Option<String>,
    subtasks: Vec<String>,
) -> Result<Task> {
    let mut new_task = NewTask::new(title, parse_date(due)?);
    if let Some(p) = priority {
        new_task = new_task.priority(p.parse()?);
    }
    if let Some(c) = category {
        new_task = new_task.category(c);
    }
    new_task.subtasks = subtasks;
    let task = planner.store_mut().add_task(new_task)?;
    println!("Task added (id = {})", short_id(&task.id));
    Ok(task)
}

/// Lists one view of the tasks, narrowed by `filters`.
pub fn cmd_list<S: Storage, C: Clock>(
    planner: &mut Planner<S, C>,
    view: ListView,
    filters: &FilterArgs,
    theme: Theme,
) -> Result<()> {
    planner.set_filters(filters.to_patch()?);
    let tasks = match view {
        ListView::All => {
            let mut tasks = planner.get_filtered_tasks();
            sort_for_display(&mut tasks);
            tasks
        }
        ListView::Today => planner.get_daily_tasks(),
        ListView::Upcoming => planner.get_upcoming_tasks(),
        ListView::Missed => planner.get_missed_tasks(),
    };
    print_tasks(planner, &tasks, theme);
    Ok(())
}

/// Lists tasks due on one date, with each task's subtasks.
pub fn cmd_day<S: Storage, C: Clock>(planner: &Planner<S, C>, date: &str, theme: Theme) -> Result<()> {
    let date = parse_date(date)?;
    let tasks = planner.get_tasks_by_date(date);
    println!("{}", date.format("%A, %B %-d, %Y"));
    print_tasks(planner, &tasks, theme);
    for t in tasks.iter().filter(|t| !t.subtasks.is_empty()) {
        println!("{} {}", short_id(&t.id), t.title);
        for s in &t.subtasks {
            println!("  [{}] {} ({})", if s.completed { "x" } else { " " }, s.text, short_id(&s.id));
        }
    }
    Ok(())
}

/// Flips a task between done and pending.
pub fn cmd_toggle<S: Storage, C: Clock>(planner: &mut Planner<S, C>, id: &str) -> Result<bool> {
    let id = resolve_task_id(planner, id)?;
    let completed = planner.store_mut().toggle_task_completion(&id)?;
    println!("Task {} marked as {}.", short_id(&id), if completed { "done" } else { "pending" });
    Ok(completed)
}

/// Edits an existing task's fields. Omitted fields are kept.
pub fn cmd_edit<S: Storage, C: Clock>(
    planner: &mut Planner<S, C>,
    id: &str,
    title: Option<String>,
    due: Option<&str>,
    priority: Option<&str>,
    category: Option<String>,
) -> Result<Task> {
    let id = resolve_task_id(planner, id)?;
    let patch = TaskPatch {
        title,
        due_date: due.map(parse_date).transpose()?,
        priority: priority.map(str::parse).transpose()?,
        category,
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        return Err(TaskError::validation("nothing to change"));
    }
    let task = planner.store_mut().update_task(&id, patch)?;
    println!("Task {} updated.", short_id(&id));
    Ok(task)
}

/// Removes a task.
pub fn cmd_remove<S: Storage, C: Clock>(planner: &mut Planner<S, C>, id: &str) -> Result<()> {
    let id = resolve_task_id(planner, id)?;
    planner.store_mut().delete_task(&id)?;
    println!("Task {} removed.", short_id(&id));
    Ok(())
}

pub fn cmd_subtask_add<S: Storage, C: Clock>(planner: &mut Planner<S, C>, task_id: &str, text: &str) -> Result<()> {
    let id = resolve_task_id(planner, task_id)?;
    let subtask = planner.store_mut().add_subtask(&id, text)?;
    println!("Subtask added to {} (id = {})", short_id(&id), short_id(&subtask.id));
    Ok(())
}

/// Toggles a subtask; `subtask_id` may be a unique prefix within the task.
pub fn cmd_subtask_toggle<S: Storage, C: Clock>(
    planner: &mut Planner<S, C>,
    task_id: &str,
    subtask_id: &str,
) -> Result<bool> {
    let id = resolve_task_id(planner, task_id)?;
    let subtask_id = {
        let task = planner
            .store()
            .get_task(&id)
            .ok_or_else(|| TaskError::not_found(Record::Task, &id))?;
        let matches: Vec<&str> = task
            .subtasks
            .iter()
            .filter(|s| s.id.starts_with(subtask_id))
            .map(|s| s.id.as_str())
            .collect();
        match matches.as_slice() {
            [one] => one.to_string(),
            [] => return Err(TaskError::not_found(Record::Subtask, subtask_id)),
            _ => return Err(TaskError::validation(format!("subtask id prefix '{}' is ambiguous", subtask_id))),
        }
    };
    let completed = planner.store_mut().toggle_subtask_completion(&id, &subtask_id)?;
    let text = planner
        .store()
        .get_task(&id)
        .and_then(|t| t.subtask(&subtask_id))
        .map_or("", |s| s.text.as_str());
    println!("Subtask {} ({}) marked as {}.", short_id(&subtask_id), text, if completed { "done" } else { "pending" });
    Ok(completed)
}

pub fn cmd_category_add<S: Storage, C: Clock>(planner: &mut Planner<S, C>, name: &str, color: Option<&str>) -> Result<()> {
    let category = planner.store_mut().add_category(name, color)?;
    println!("Category '{}' added (id = {}, color = {})", category.name, category.id, category.color);
    Ok(())
}

pub fn cmd_category_list<S: Storage, C: Clock>(planner: &Planner<S, C>, theme: Theme) {
    let stats = planner.get_task_statistics();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(header(theme, &["ID", "Name", "Color", "Tasks", "Built-in"]));
    for c in &stats.by_category {
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.name),
            Cell::new(&c.color),
            Cell::new(c.count),
            Cell::new(if crate::category::is_default(&c.id) { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
}

pub fn cmd_category_edit<S: Storage, C: Clock>(
    planner: &mut Planner<S, C>,
    id: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    if planner.store_mut().update_category(id, name, color)? {
        println!("Category '{}' updated.", id);
    } else {
        println!("Category '{}' not found.", id);
    }
    Ok(())
}

/// Deletes a category; its tasks move to "Others".
pub fn cmd_category_remove<S: Storage, C: Clock>(planner: &mut Planner<S, C>, id: &str) -> Result<usize> {
    let moved = planner.store_mut().delete_category(id)?;
    println!("Category '{}' removed, {} task(s) moved to Others.", id, moved);
    Ok(moved)
}

pub fn cmd_clear_completed<S: Storage, C: Clock>(planner: &mut Planner<S, C>) -> Result<usize> {
    let removed = planner.store_mut().clear_completed_tasks()?;
    println!("Removed {} completed task(s).", removed);
    Ok(removed)
}

/// Prints dashboard statistics, as tables or as JSON.
pub fn cmd_stats<S: Storage, C: Clock>(planner: &Planner<S, C>, json: bool, theme: Theme) {
    let stats = planner.get_task_statistics();
    if json {
        match serde_json::to_string_pretty(&stats) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to serialize statistics: {}", e),
        }
        return;
    }

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL).set_header(header(theme, &["Total", "Completed", "Pending", "Overdue", "Done %"]));
    summary.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.completed).fg(Color::Green),
        Cell::new(stats.pending).fg(Color::Yellow),
        Cell::new(stats.overdue).fg(if stats.overdue > 0 { Color::Red } else { Color::Reset }),
        Cell::new(format!("{:.0}", stats.completion_rate() * 100.0)),
    ]);
    println!("{summary}");

    let mut priorities = Table::new();
    priorities.load_preset(UTF8_FULL).set_header(header(theme, &["Priority", "Tasks"]));
    for p in Priority::ALL {
        priorities.add_row(vec![Cell::new(p).fg(priority_color(p)), Cell::new(stats.by_priority.get(p))]);
    }
    println!("{priorities}");

    let mut trends = Table::new();
    trends.load_preset(UTF8_FULL).set_header(header(theme, &["Day", "Due", "Completed"]));
    for entry in &stats.weekly_trends {
        trends.add_row(vec![
            Cell::new(entry.date.format("%a %b %-d")),
            Cell::new(entry.total),
            Cell::new(entry.completed),
        ]);
    }
    println!("{trends}");
}

/// Prints the days of a `YYYY-MM` month that have tasks due.
pub fn cmd_calendar<S: Storage, C: Clock>(planner: &Planner<S, C>, month: Option<&str>) -> Result<()> {
    let (year, month) = match month {
        Some(m) => {
            let first = parse_date(&format!("{}-01", m.trim()))
                .map_err(|_| TaskError::validation(format!("invalid month '{}'. Use YYYY-MM.", m)))?;
            (first.year(), first.month())
        }
        None => {
            let today = planner.today();
            (today.year(), today.month())
        }
    };
    let markers = planner.calendar_markers(year, month);
    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    if markers.is_empty() {
        println!("{}: no tasks due.", title);
        return Ok(());
    }
    println!("{}:", title);
    for date in markers {
        let n = planner.get_all_tasks().iter().filter(|t| t.due_date == date).count();
        println!("  {}  {} task(s)", date.format("%a %-d"), n);
    }
    Ok(())
}
