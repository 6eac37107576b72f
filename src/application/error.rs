//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::store::StoreError;

/// Application errors wrap domain errors and add provider-level context.
///
/// Lookups that find nothing are not errors; they return `None` or an empty list.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid record data: {message}")]
    DataFormat { message: String },

    #[error("fetching '{entity}' failed: {source}")]
    Store {
        entity: String,
        #[source]
        source: StoreError,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
