//! Named tables sharing one backend
//!
//! Each table lives in its own top-level directory of the backend. Opening
//! a table is cheap and writes nothing; a table appears in
//! [`Database::table_names`] once it holds a row or an index table.

use std::sync::Arc;

use tracing::debug;

use crate::backend::{LocalBackend, MemoryBackend, StorageBackend};
use crate::config::Config;
use crate::table::{is_valid_segment, RowStore, StoreOptions, TableResult};

#[derive(Debug, Clone)]
pub struct Database {
    backend: Arc<dyn StorageBackend>,
    options: StoreOptions,
}

impl Database {
    /// Open the data directory named by `config`
    pub fn open(config: &Config) -> Self {
        debug!(data_dir = %config.data_dir.display(), "opening database");
        Self::with_backend(
            Arc::new(LocalBackend::new(config.data_dir.clone())),
            config.store_options(),
        )
    }

    pub fn with_backend(backend: Arc<dyn StorageBackend>, options: StoreOptions) -> Self {
        Self { backend, options }
    }

    /// A database that lives only as long as this value (and its clones)
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), StoreOptions::default())
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Open the table `name`
    pub fn table(&self, name: &str) -> TableResult<RowStore> {
        RowStore::open(name, Arc::clone(&self.backend), &self.options)
    }

    /// Names of tables with stored data, ascending
    pub fn table_names(&self) -> TableResult<Vec<String>> {
        Ok(self
            .backend
            .list("")?
            .into_iter()
            .filter(|name| is_valid_segment(name))
            .collect())
    }

    /// Remove the table `name`. Returns false if it held nothing.
    pub fn drop_table(&self, name: &str) -> TableResult<bool> {
        let table = self.table(name)?;
        let existed = self.table_names()?.iter().any(|n| n == name);
        table.drop_table()?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_tables_appear_on_first_write() {
        let db = Database::in_memory();
        let movies = db.table("movies").unwrap();
        assert!(db.table_names().unwrap().is_empty());

        movies
            .insert(json!({"title": "m"}).as_object().unwrap().clone())
            .unwrap();
        db.table("actors").unwrap().add_index_table("movie").unwrap();

        assert_eq!(db.table_names().unwrap(), vec!["actors", "movies"]);
    }

    #[test]
    fn test_handles_share_storage() {
        let db = Database::in_memory();
        let a = db.table("t").unwrap();
        let b = db.table("t").unwrap();
        let id = a.insert(json!({"x": 1}).as_object().unwrap().clone()).unwrap();
        assert!(b.read(id).unwrap().is_some());
    }

    #[test]
    fn test_drop_table() {
        let db = Database::in_memory();
        db.table("t")
            .unwrap()
            .insert(json!({"x": 1}).as_object().unwrap().clone())
            .unwrap();

        assert!(db.drop_table("t").unwrap());
        assert!(!db.drop_table("t").unwrap());
        assert!(db.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_table_name() {
        let db = Database::in_memory();
        assert!(db.table("../escape").is_err());
        assert!(db.table("").is_err());
    }

    #[test]
    fn test_open_uses_config() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            id_column: None,
            ..Config::default()
        };
        let db = Database::open(&config);
        let id = db
            .table("t")
            .unwrap()
            .insert(json!({"x": 1}).as_object().unwrap().clone())
            .unwrap();

        assert!(dir.path().join("t/rows/0000.json").is_file());
        let row = db.table("t").unwrap().read(id).unwrap().unwrap();
        assert!(!row.contains_key("id"));
    }
}
