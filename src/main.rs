//! # ticknext
//!
//! A terminal task tracker. Tasks carry a due date, a priority, a category and
//! an optional checklist of subtasks; the tracker sorts them into today,
//! upcoming and missed views and keeps a small statistics dashboard.
//!
//! ## Usage
//!
//! **Adding tasks**
//! ```bash
//! ticknext add "Write report" --due 2025-12-01 --priority high --category work
//! ticknext add "Groceries" --due 2025-12-02 -s "Milk" -s "Bread"
//! ```
//!
//! **Views**
//! ```bash
//! ticknext list                   # everything, sorted by due date then priority
//! ticknext list today
//! ticknext list upcoming -c work  # next 7 days, only the Work category
//! ticknext list missed -p high
//! ticknext day 2025-12-01         # one calendar day, subtasks included
//! ticknext calendar 2025-12       # days of the month with tasks due
//! ```
//!
//! **Managing tasks**
//! ```bash
//! ticknext done <ID>              # toggles done / pending
//! ticknext edit <ID> --title "New title"
//! ticknext subtask add <ID> "Proofread"
//! ticknext subtask toggle <ID> <SUBTASK_ID>
//! ticknext remove <ID>
//! ticknext clear-completed
//! ```
//! Ids can be shortened to any unique prefix, as shown in listings.
//!
//! **Categories**: `home`, `personal`, `work`, `study` and `others` always
//! exist. Deleting any other category moves its tasks to `others`.
//! ```bash
//! ticknext category add "Side Projects"      # id side-projects, random color
//! ticknext category edit side-projects --color "#33d9b2"
//! ticknext category remove side-projects
//! ```
//!
//! ## Data storage
//!
//! Tasks and categories are saved as one JSON document in the local data
//! directory (`~/.local/share/ticknext/tasks.json` on Linux). Override it with
//! `data_path` in `config.toml` or the `TICKNEXT_DB` environment variable.
//! Set `RUST_LOG=debug` to see what the store is doing.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ticknext::commands::*;
use ticknext::config::Config;
use ticknext::logging::init_logging;
use ticknext::{JsonFileStorage, Planner, SystemClock, TaskError};

#[derive(Parser)]
#[command(name = "ticknext")]
#[command(about = "Personal task tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Due date in YYYY-MM-DD
        #[arg(short, long)]
        due: String,
        /// high, medium or low
        #[arg(short, long)]
        priority: Option<String>,
        /// Category id
        #[arg(short, long)]
        category: Option<String>,
        /// Subtask text, repeatable
        #[arg(short, long = "subtask")]
        subtasks: Vec<String>,
    },
    /// List tasks
    List {
        #[arg(value_enum, default_value_t = ListView::All)]
        view: ListView,
        /// Only these categories, repeatable
        #[arg(short, long = "category")]
        categories: Vec<String>,
        /// Only these priorities, repeatable
        #[arg(short, long = "priority")]
        priorities: Vec<String>,
        /// Only tasks due on this date
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the tasks due on one date
    Day {
        date: String,
    },
    /// Toggle a task between done and pending
    Done {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Manage subtasks
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Remove every completed task
    ClearCompleted,
    /// Show statistics over all tasks
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which days of a month have tasks due
    Calendar {
        /// Month in YYYY-MM, defaults to the current month
        month: Option<String>,
    },
    /// View or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum SubtaskCommands {
    /// Add a subtask to a task
    Add { task_id: String, text: String },
    /// Toggle a subtask
    Toggle { task_id: String, subtask_id: String },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add a category
    Add {
        name: String,
        /// Color such as #ff9a3c, random if omitted
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List categories
    List,
    /// Rename or recolor a category
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a category, moving its tasks to Others
    Remove { id: String },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print current settings
    Show,
    /// Switch between light and dark theme
    Theme,
    /// Turn due-task notifications on or off
    Notifications,
}

fn run(command: Commands, config: &Config) -> Result<(), TaskError> {
    let theme = config.theme;
    let storage = JsonFileStorage::new(config.db_path());
    let mut planner = Planner::open(storage, SystemClock)?;

    match command {
        Commands::Add { title, due, priority, category, subtasks } => {
            cmd_add(&mut planner, title, &due, priority.as_deref(), category, subtasks)?;
        }
        Commands::List { view, categories, priorities, date } => {
            let filters = FilterArgs { categories, priorities, date };
            cmd_list(&mut planner, view, &filters, theme)?;
        }
        Commands::Day { date } => cmd_day(&planner, &date, theme)?,
        Commands::Done { id } => {
            cmd_toggle(&mut planner, &id)?;
        }
        Commands::Edit { id, title, due, priority, category } => {
            cmd_edit(&mut planner, &id, title, due.as_deref(), priority.as_deref(), category)?;
        }
        Commands::Remove { id } => cmd_remove(&mut planner, &id)?,
        Commands::Subtask { command } => match command {
            SubtaskCommands::Add { task_id, text } => cmd_subtask_add(&mut planner, &task_id, &text)?,
            SubtaskCommands::Toggle { task_id, subtask_id } => {
                cmd_subtask_toggle(&mut planner, &task_id, &subtask_id)?;
            }
        },
        Commands::Category { command } => match command {
            CategoryCommands::Add { name, color } => cmd_category_add(&mut planner, &name, color.as_deref())?,
            CategoryCommands::List => cmd_category_list(&planner, theme),
            CategoryCommands::Edit { id, name, color } => {
                cmd_category_edit(&mut planner, &id, name.as_deref(), color.as_deref())?
            }
            CategoryCommands::Remove { id } => {
                cmd_category_remove(&mut planner, &id)?;
            }
        },
        Commands::ClearCompleted => {
            cmd_clear_completed(&mut planner)?;
        }
        Commands::Stats { json } => cmd_stats(&planner, json, theme),
        Commands::Calendar { month } => cmd_calendar(&planner, month.as_deref())?,
        // Handled in main without opening the store.
        Commands::Settings { .. } | Commands::Completions { .. } => {}
    }
    Ok(())
}

fn settings(command: Option<SettingsCommands>, config: &mut Config) -> io::Result<()> {
    match command {
        None | Some(SettingsCommands::Show) => {}
        Some(SettingsCommands::Theme) => {
            config.theme = config.theme.toggled();
            config.save()?;
        }
        Some(SettingsCommands::Notifications) => {
            config.notifications = !config.notifications;
            config.save()?;
        }
    }
    println!("theme         = {:?}", config.theme);
    println!("notifications = {}", config.notifications);
    println!("data file     = {}", config.db_path().display());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let mut config = Config::load();

    let command = cli.command.unwrap_or(Commands::List {
        view: ListView::Today,
        categories: Vec::new(),
        priorities: Vec::new(),
        date: None,
    });

    match command {
        Commands::Completions { shell } => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return ExitCode::FAILURE;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "ticknext", &mut io::stdout());
            ExitCode::SUCCESS
        }
        Commands::Settings { command } => match settings(command, &mut config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to save settings: {}", e);
                ExitCode::FAILURE
            }
        },
        command => match run(command, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
