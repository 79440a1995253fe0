//! Query error types

use thiserror::Error;

use crate::table::{Severity, TableError};

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised by terminal query operations.
///
/// Configuring a builder never fails; everything here comes from execution.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Join against table {table:?} failed: {source}")]
    JoinFailed {
        table: String,
        #[source]
        source: Box<QueryError>,
    },
}

impl QueryError {
    /// Returns the stable error code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Table(e) => e.code(),
            QueryError::JoinFailed { source, .. } => source.code(),
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            QueryError::Table(e) => e.severity(),
            QueryError::JoinFailed { source, .. } => source.severity(),
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns true if a row vanished between scan and write
    pub fn is_not_found(&self) -> bool {
        match self {
            QueryError::Table(e) => e.is_not_found(),
            QueryError::JoinFailed { source, .. } => source.is_not_found(),
        }
    }
}
