//! Table error types
//!
//! Error codes:
//! - ROWQUERY_ROW_NOT_FOUND (ERROR)
//! - ROWQUERY_INVALID_* (ERROR)
//! - ROWQUERY_ID_SPACE_EXHAUSTED (ERROR)
//! - ROWQUERY_INDEX_MISSING (ERROR)
//! - ROWQUERY_DATA_CORRUPTION (FATAL)
//! - ROWQUERY_INDEX_INCONSISTENCY (FATAL)

use std::fmt;

use thiserror::Error;

use super::row::RowId;
use crate::backend::BackendError;

/// Severity levels for table and query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed, the table is still usable
    Error,
    /// Persisted state violates an invariant; stop using the table
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Row store errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Row not found: {0}")]
    NotFound(RowId),

    #[error("Invalid row id: {0:?}")]
    InvalidRowId(String),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0:?}")]
    InvalidColumn(String),

    #[error("Column {column:?} holds a non-scalar value")]
    InvalidValue { column: String },

    #[error("Row id space exhausted")]
    IdSpaceExhausted,

    #[error("No index table for column {0:?}")]
    IndexMissing(String),

    #[error("Corrupted file {path}: {reason}")]
    Corrupted { path: String, reason: String },

    #[error("Index on column {column:?} disagrees with row {id}")]
    IndexInconsistency { column: String, id: RowId },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl TableError {
    /// Create a corruption error for a persisted file
    pub fn corrupted(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        TableError::Corrupted {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::NotFound(_) => "ROWQUERY_ROW_NOT_FOUND",
            TableError::InvalidRowId(_) => "ROWQUERY_INVALID_ROW_ID",
            TableError::InvalidTableName(_) => "ROWQUERY_INVALID_TABLE_NAME",
            TableError::InvalidColumn(_) => "ROWQUERY_INVALID_COLUMN",
            TableError::InvalidValue { .. } => "ROWQUERY_INVALID_VALUE",
            TableError::IdSpaceExhausted => "ROWQUERY_ID_SPACE_EXHAUSTED",
            TableError::IndexMissing(_) => "ROWQUERY_INDEX_MISSING",
            TableError::Corrupted { .. } => "ROWQUERY_DATA_CORRUPTION",
            TableError::IndexInconsistency { .. } => "ROWQUERY_INDEX_INCONSISTENCY",
            TableError::Backend(e) => e.code(),
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            TableError::Corrupted { .. } | TableError::IndexInconsistency { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns true if a row id did not resolve to a row
    pub fn is_not_found(&self) -> bool {
        matches!(self, TableError::NotFound(_))
    }
}
