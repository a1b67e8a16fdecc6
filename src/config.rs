//! User settings stored in `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{default_db_path, DB_ENV};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the data file location. `TICKNEXT_DB` still wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub theme: Theme,
    /// Stored preference; reminders are delivered elsewhere.
    #[serde(default)]
    pub notifications: bool,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ticknext").join("config.toml"))
    }

    /// Loads from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(s) = fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&s).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring malformed config");
            Self::default()
        })
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    /// Resolves the data file: `TICKNEXT_DB`, then `data_path`, then the
    /// platform data directory.
    pub fn db_path(&self) -> PathBuf {
        if std::env::var_os(DB_ENV).is_some() {
            return default_db_path();
        }
        self.data_path.clone().unwrap_or_else(default_db_path)
    }
}
