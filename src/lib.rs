//! # ticknext
//!
//! Personal task tracking: tasks with due dates, priorities, categories and
//! subtasks, bucketed into today / upcoming / missed / by-date views, with
//! dashboard statistics.
//!
//! [`Planner`] is the entry point. It owns a [`TaskStore`] (the source of
//! truth, persisted through a [`Storage`] after every change), a list filter,
//! and a [`Clock`] that decides what "today" is.
//!
//! ```no_run
//! use ticknext::{Planner, SystemClock, MemoryStorage, NewTask, Priority};
//! use chrono::NaiveDate;
//!
//! let mut planner = Planner::open(MemoryStorage::new(), SystemClock)?;
//! let due = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//! planner.store_mut().add_task(NewTask::new("Write report", due).priority(Priority::High).category("work"))?;
//! let stats = planner.get_task_statistics();
//! assert_eq!(stats.total, 1);
//! # Ok::<(), ticknext::TaskError>(())
//! ```

pub mod category;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod planner;
pub mod stats;
pub mod storage;
pub mod store;
pub mod views;

pub use category::CategoryRegistry;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{StorageError, TaskError};
pub use filter::{FilterEngine, FilterPatch, FilterSpec};
pub use models::{Category, NewTask, Priority, Subtask, Task, TaskPatch};
pub use planner::Planner;
pub use stats::TaskStatistics;
pub use storage::{JsonFileStorage, MemoryStorage, Snapshot, Storage};
pub use store::TaskStore;
