//! Core error types for studygarden-core.
//!
//! Domain errors (`InvalidSelection`, `NoActiveTask`, `InsufficientFunds`,
//! `InvalidInput`) are recoverable: the controller has already reverted to a
//! safe state by the time they are returned. Storage and config errors come
//! from the layers below.

use std::path::PathBuf;
use thiserror::Error;

use crate::rewards::Currency;

/// Core error type for studygarden-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Task is missing or already completed.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A focus session needs a selected, incomplete task.
    #[error("No active task: select a task before starting a focus session")]
    NoActiveTask,

    /// Spend exceeds the current balance.
    #[error("Not enough {currency}: need {needed}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        needed: u64,
        available: u64,
    },

    /// Rejected form input (empty text, non-positive or non-numeric values).
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Note {id} not found on {date}")]
    NoteNotFound { date: chrono::NaiveDate, id: String },

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Could not resolve or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
