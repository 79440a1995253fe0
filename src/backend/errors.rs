//! # Backend Errors

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Persistence backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl BackendError {
    /// Wrap an I/O failure, folding `NotFound` into its own variant
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            BackendError::NotFound(path.to_string())
        } else {
            BackendError::Io {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::NotFound(_) => "ROWQUERY_BACKEND_NOT_FOUND",
            BackendError::Io { .. } => "ROWQUERY_BACKEND_IO_ERROR",
        }
    }

    /// Returns true for a missing path
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}
