//! # Event Errors
//!
//! Error types for the event scheduling module.

use thiserror::Error;

use super::validate::ValidationErrors;

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

/// Errors raised by event storage and orchestration
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// Candidate event failed validation (client input error, returned as data)
    #[error("Event validation failed")]
    Validation(ValidationErrors),

    /// Event does not exist or belongs to another user
    #[error("Event not found")]
    NotFound,

    /// A validated candidate was missing a field needed to materialize the
    /// model. Validation guarantees presence, so this is a contract
    /// violation, not a client error.
    #[error("Internal error: incomplete candidate, missing '{0}'")]
    IncompleteCandidate(&'static str),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<ValidationErrors> for EventError {
    fn from(errors: ValidationErrors) -> Self {
        EventError::Validation(errors)
    }
}

impl EventError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            EventError::Validation(_) => 422,
            EventError::NotFound => 404,
            EventError::IncompleteCandidate(_) => 500,
            EventError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
