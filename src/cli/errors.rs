//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::query::QueryError;
use crate::table::TableError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CliError::InvalidArgument(msg.into())
    }

    /// Stable error code, delegating to the underlying subsystem
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Table(e) => e.code(),
            CliError::Query(e) => e.code(),
            CliError::InvalidArgument(_) => "ROWQUERY_CLI_INVALID_ARGUMENT",
            CliError::Io(_) => "ROWQUERY_CLI_IO_ERROR",
            CliError::Json(_) => "ROWQUERY_CLI_JSON_ERROR",
        }
    }
}
