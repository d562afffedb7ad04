//! Error taxonomy for tracking and persistence.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::types::ValidationError;

/// Failures reported by a [`SessionPersistence`](crate::SessionPersistence) implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Persisted data exists but does not describe valid sessions.
    #[error("stored data is corrupt: {message}")]
    Corrupt { message: String },

    /// The underlying read or write failed.
    #[error("storage I/O failed: {message}")]
    Io {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    pub fn io(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Errors surfaced by the session store and tracking engine.
///
/// Every variant is returned to the caller unchanged; nothing is retried or repaired.
#[derive(Debug, Error)]
pub enum TrackError {
    /// Empty activity name or malformed category.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A session is already open.
    #[error("activity '{name}' is still being tracked since {since}; stop it first")]
    AlreadyTracking { name: String, since: NaiveDateTime },

    /// No session is open.
    #[error("no activity is currently being tracked")]
    NotTracking,

    /// Closing the session would give it a zero or negative duration.
    #[error("session would end at {end}, which is not after its start at {start}")]
    InvalidDuration {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Persisted data failed validation.
    #[error("stored data is corrupt: {0}")]
    StorageCorrupt(String),

    /// Reading or writing persisted data failed.
    #[error("storage I/O failed: {message}")]
    StorageIo {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// More than one open session was found.
    #[error("found {open} open sessions; at most one may be active")]
    InvariantViolation { open: usize },
}

impl TrackError {
    /// Process exit code for this failure kind. Each kind gets its own code.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::AlreadyTracking { .. } => 3,
            Self::NotTracking => 4,
            Self::InvalidDuration { .. } => 5,
            Self::StorageCorrupt(_) => 6,
            Self::StorageIo { .. } => 7,
            Self::InvariantViolation { .. } => 8,
        }
    }
}

impl From<ValidationError> for TrackError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<StorageError> for TrackError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Corrupt { message } => Self::StorageCorrupt(message),
            StorageError::Io { message, source } => Self::StorageIo { message, source },
        }
    }
}
