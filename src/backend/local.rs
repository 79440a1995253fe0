//! # Local Filesystem Backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::backend::StorageBackend;
use super::errors::{BackendError, BackendResult};

/// Local filesystem storage backend
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at `root`.
    ///
    /// The root directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl StorageBackend for LocalBackend {
    fn write(&self, path: &str, data: &[u8]) -> BackendResult<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BackendError::from_io(path, e))?;
        }

        fs::write(&full_path, data).map_err(|e| BackendError::from_io(path, e))
    }

    fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        fs::read(self.full_path(path)).map_err(|e| BackendError::from_io(path, e))
    }

    fn delete(&self, path: &str) -> BackendResult<()> {
        fs::remove_file(self.full_path(path)).map_err(|e| BackendError::from_io(path, e))
    }

    fn exists(&self, path: &str) -> BackendResult<bool> {
        Ok(self.full_path(path).is_file())
    }

    fn list(&self, dir: &str) -> BackendResult<Vec<String>> {
        let entries = match fs::read_dir(self.full_path(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackendError::from_io(dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackendError::from_io(dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        // read_dir order is platform dependent
        names.sort();
        Ok(names)
    }

    fn delete_all(&self, dir: &str) -> BackendResult<()> {
        match fs::remove_dir_all(self.full_path(dir)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::from_io(dir, e)),
        }
    }
}
