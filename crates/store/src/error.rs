//! Storage error model.

use thiserror::Error;

/// Result type used across the storage layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error.
///
/// These are integrity violations and infrastructure failures, as opposed to
/// domain errors (validation, authorization). The API layer maps `Conflict`
/// to 409 and `MissingReference` to 404; everything else is a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness guarantee was violated (duplicate email, duplicate
    /// enrollment).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist or is not usable for the operation
    /// (e.g. enrolling into a missing or unapproved course).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The backing storage failed.
    #[error("storage error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingReference(msg.into())
    }

    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}
