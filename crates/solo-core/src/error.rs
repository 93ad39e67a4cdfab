//! Core error types for solo-core.
//!
//! This module defines the error hierarchy using thiserror. Conflict
//! errors are expected outcomes of the progression state machine, not
//! faults: `AlreadyCheckedIn` in particular is an idempotency signal a
//! caller should render as "already done" rather than as a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for solo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors. `StorageError::Unavailable` is the only
    /// kind where the caller may safely retry the whole operation.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// State conflicts raised by the progression engine
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// Malformed input rejected before it reaches the state machine
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No user exists for the given email
    #[error("No user found for '{email}'")]
    NotFound { email: String },

    /// No idea board entry with the given id
    #[error("No idea found with id '{id}'")]
    IdeaNotFound { id: String },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Conflicts between a request and the user's current habit state.
///
/// All of these are terminal for the current operation and none are
/// retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// The user has already checked in on this calendar day
    #[error("Already checked in on {date}")]
    AlreadyCheckedIn { date: chrono::NaiveDate },

    /// A user with this email already exists
    #[error("User '{email}' already exists")]
    AlreadyExists { email: String },

    /// The user already has an active habit and must finish it first
    #[error("Habit '{name}' is still active")]
    HabitAlreadyActive { name: String },

    /// A check-in requires an active habit
    #[error("No active habit")]
    NoActiveHabit,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// The database is busy or locked; no partial state was committed
    /// and the caller may retry the entire operation.
    #[error("Storage unavailable")]
    Unavailable,
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email missing an '@' or empty
    #[error("Valid email is required, got '{0}'")]
    InvalidEmail(String),

    /// Habit name/text missing
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Text over the allowed length
    #[error("'{field}' too long: {len} characters (max {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// No template with the given id
    #[error("Unknown habit template '{0}'")]
    UnknownTemplate(String),

    /// Reminder time not in HH:MM form
    #[error("Invalid reminder time '{0}', expected HH:MM")]
    InvalidReminderTime(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Unavailable
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
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

impl CoreError {
    /// Whether this error is the "already done today" idempotency signal.
    pub fn is_already_checked_in(&self) -> bool {
        matches!(
            self,
            CoreError::Conflict(ConflictError::AlreadyCheckedIn { .. })
        )
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_checked_in_is_distinguishable() {
        let err: CoreError = ConflictError::AlreadyCheckedIn {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        }
        .into();
        assert!(err.is_already_checked_in());

        let err: CoreError = ConflictError::NoActiveHabit.into();
        assert!(!err.is_already_checked_in());
    }

    #[test]
    fn busy_sqlite_error_maps_to_unavailable() {
        let inner = rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY);
        let err = rusqlite::Error::SqliteFailure(inner, None);
        assert!(matches!(StorageError::from(err), StorageError::Unavailable));
    }
}
