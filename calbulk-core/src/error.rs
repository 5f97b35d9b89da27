//! Error types for calbulk.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that stop a calbulk session.
#[derive(Error, Debug)]
pub enum CalbulkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied: {0} is not allowed to use this application")]
    AuthorizationDenied(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calbulk operations.
pub type CalbulkResult<T> = Result<T, CalbulkError>;

/// A failed call to the calendar service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Calendar service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode calendar service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// HTTP status code, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Transport(_) | ServiceError::Decode(_) => None,
        }
    }
}

/// Draft date/time fields that do not compose into a valid instant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Local time {0} does not exist in time zone {1}")]
    NonexistentLocalTime(NaiveDateTime, String),
}

/// Why a single event in a batch was not updated or deleted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Malformed date/time input: {0}")]
    MalformedTemporalInput(#[from] TemporalError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
