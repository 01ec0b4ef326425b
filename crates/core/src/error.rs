//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// conflicts, missing records). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty required field, negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict occurred (duplicate email, duplicate enrollment).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary (e.g. acting on a course
    /// owned by another instructor).
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_helpers_produce_matching_variants() {
        assert!(matches!(
            DomainError::validation("name is empty"),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            DomainError::conflict("email taken"),
            DomainError::Conflict(_)
        ));
        assert_eq!(DomainError::not_found(), DomainError::NotFound);
    }

    #[test]
    fn display_includes_detail_for_parameterized_variants() {
        let err = DomainError::validation("price must be non-negative");
        assert_eq!(err.to_string(), "validation failed: price must be non-negative");
    }
}
