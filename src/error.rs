//! Error types shared across the task manager.
//!
//! Storage and preference failures are typed so that callers can decide
//! between propagating and falling back to defaults. Everything meets in
//! `AppError` at the binary boundary.

use std::path::PathBuf;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Row store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying SQLite call failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A lookup by identifier matched no row.
    #[error("task not found: {0}")]
    NotFound(i32),

    /// The task has no identifier, so it cannot address a row.
    #[error("task has not been stored yet")]
    Unsaved,

    /// SQLite handed out a rowid that does not fit a task identifier.
    #[error("row id {0} is out of range for a task id")]
    IdOutOfRange(i64),
}

/// Preference file failures. Readers usually swallow these and use defaults.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to access preferences at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preferences: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory for application data")]
    NoProjectDirs,

    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
}

/// Top-level error of the terminal application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
