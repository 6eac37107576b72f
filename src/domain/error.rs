//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors are configuration violations detected before any tree is built.
///
/// Data anomalies in the records themselves (orphans, duplicate or unindexable
/// ids, parent cycles) are never errors; the builder resolves them by policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid field name for '{option}': {reason}")]
    InvalidFieldName { option: String, reason: String },

    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("entity name must not be empty")]
    EmptyEntityName,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
