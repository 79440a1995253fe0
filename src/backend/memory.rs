//! # In-Memory Backend

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::backend::StorageBackend;
use super::errors::{BackendError, BackendResult};

/// In-process storage backend.
///
/// Files live in a sorted map keyed by their full path, so listing a
/// directory is a range scan over the map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files
    pub fn file_count(&self) -> usize {
        self.files_read().len()
    }

    fn files_read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A panic mid-write cannot leave the map half-updated, so poisoning is ignored
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn files_write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    fn dir_prefix(dir: &str) -> String {
        if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir.trim_end_matches('/'))
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn write(&self, path: &str, data: &[u8]) -> BackendResult<()> {
        self.files_write().insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.files_read()
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    fn delete(&self, path: &str) -> BackendResult<()> {
        self.files_write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> BackendResult<bool> {
        Ok(self.files_read().contains_key(path))
    }

    fn list(&self, dir: &str) -> BackendResult<Vec<String>> {
        let prefix = Self::dir_prefix(dir);
        let files = self.files_read();

        let names: BTreeSet<String> = files
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, _)| path[prefix.len()..].split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(names.into_iter().collect())
    }

    fn delete_all(&self, dir: &str) -> BackendResult<()> {
        let prefix = Self::dir_prefix(dir);
        self.files_write().retain(|path, _| !path.starts_with(&prefix));
        Ok(())
    }
}
