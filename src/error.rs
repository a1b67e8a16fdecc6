use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Data file has version {found}, this build understands up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Data file contains task id '{0}' more than once")]
    DuplicateId(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// What kind of record a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Task,
    Subtask,
    Category,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Record::Task => "Task",
            Record::Subtask => "Subtask",
            Record::Category => "Category",
        })
    }
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: Record, id: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Category '{0}' is built in and cannot be deleted")]
    ProtectedCategory(String),

    #[error("Category '{0}' already exists")]
    CategoryExists(String),

    /// The change is applied in memory but could not be written.
    #[error("Failed to save: {0}")]
    Persistence(#[from] StorageError),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }

    pub fn not_found(kind: Record, id: impl Into<String>) -> Self {
        TaskError::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound { .. })
    }
}

pub type Result<T, E = TaskError> = std::result::Result<T, E>;
