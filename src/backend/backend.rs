//! # Storage Backend Trait

use super::errors::BackendResult;

/// Backend trait for table persistence.
///
/// Paths are relative and slash-separated (`movies/rows/0001.json`).
/// Directories are implicit: writing a path creates its parents, and a
/// directory exists for as long as something lives below it.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Write data to path, replacing any previous contents
    fn write(&self, path: &str, data: &[u8]) -> BackendResult<()>;

    /// Read data from path
    ///
    /// Returns `BackendError::NotFound` if nothing is stored there.
    fn read(&self, path: &str) -> BackendResult<Vec<u8>>;

    /// Delete the file at path
    ///
    /// Returns `BackendError::NotFound` if nothing is stored there.
    fn delete(&self, path: &str) -> BackendResult<()>;

    /// Check if a file exists at path
    fn exists(&self, path: &str) -> BackendResult<bool>;

    /// List the entry names directly below `dir`, sorted ascending.
    ///
    /// A missing directory lists as empty.
    fn list(&self, dir: &str) -> BackendResult<Vec<String>>;

    /// Remove `dir` and everything below it. Missing directories are a no-op.
    fn delete_all(&self, dir: &str) -> BackendResult<()>;
}
