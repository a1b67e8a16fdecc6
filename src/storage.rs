use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::models::{Category, Task};

/// Current on-disk document version.
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable that overrides the data file location.
pub const DB_ENV: &str = "TICKNEXT_DB";

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    /// Empty means "never saved": the registry seeds its defaults.
    pub categories: Vec<Category>,
}

/// Load/save contract the task store persists through.
pub trait Storage {
    fn load(&self) -> Result<Snapshot, StorageError>;
    fn save(&mut self, tasks: &[Task], categories: &[Category]) -> Result<(), StorageError>;
}

/// Returns the default path of the data file (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `TICKNEXT_DB` environment variable.
/// 2. `~/.local/share/ticknext/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
pub fn default_db_path() -> PathBuf {
    std::env::var(DB_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("ticknext");
        p.push("tasks.json");
        p
    })
}

#[derive(Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    tasks: &'a [Task],
    categories: &'a [Category],
}

/// Stores tasks and categories as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for JsonFileStorage {
    /// A missing file loads as an empty snapshot.
    fn load(&self) -> Result<Snapshot, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet");
            return Ok(Snapshot::default());
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;

        let value: serde_json::Value = serde_json::from_str(&s)?;
        // Unversioned files are a bare task array.
        if value.is_array() {
            let tasks: Vec<Task> = serde_json::from_value(value)?;
            return Ok(Snapshot { tasks, categories: Vec::new() });
        }
        let doc: Document = serde_json::from_value(value)?;
        if doc.version > SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: doc.version,
                supported: SCHEMA_VERSION,
            });
        }
        debug!(path = %self.path.display(), tasks = doc.tasks.len(), "loaded data file");
        Ok(Snapshot { tasks: doc.tasks, categories: doc.categories })
    }

    /// Writes to a sibling temp file and renames it over the target.
    fn save(&mut self, tasks: &[Task], categories: &[Category]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let doc = DocumentRef { version: SCHEMA_VERSION, tasks, categories };
        let s = serde_json::to_string_pretty(&doc)?;

        let tmp = self.path.with_extension("json.tmp");
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        f.write_all(s.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    snapshot: Snapshot,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot, ..Self::default() }
    }

    /// Makes every following `save` fail until switched back.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Snapshot, StorageError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, tasks: &[Task], categories: &[Category]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Unavailable("memory storage set to fail".into()));
        }
        self.snapshot = Snapshot { tasks: tasks.to_vec(), categories: categories.to_vec() };
        self.saves += 1;
        Ok(())
    }
}
