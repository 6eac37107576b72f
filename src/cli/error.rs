//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::{InfraError, StoreError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                    exitcode::NOINPUT
                }
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::DataFormat { .. } => exitcode::DATAERR,
                InfraError::Store(store) => store_exit_code(store),
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_) | ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::DataFormat { .. } => exitcode::DATAERR,
                    ApplicationError::Store { source, .. } => store_exit_code(source),
                },
            },
        }
    }
}

fn store_exit_code(e: &StoreError) -> i32 {
    match e {
        StoreError::UnknownEntity(_) => exitcode::NOINPUT,
        StoreError::DataFormat(_) => exitcode::DATAERR,
        StoreError::Backend(_) => exitcode::UNAVAILABLE,
    }
}
