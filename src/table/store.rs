//! File-backed row store
//!
//! Layout below the backend root:
//!
//! ```text
//! <table>/rows/<row id>.json      one JSON object per row
//! <table>/indexes/<column>.json   one serialized IndexTable per indexed column
//! ```
//!
//! Every write diffs the previous and next state of the row per indexed
//! column and rewrites only the index tables whose key for that row changed.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::codec::RowCodec;
use super::errors::{TableError, TableResult};
use super::index::{IndexKey, IndexTable};
use super::row::{column_value, validate_row, Row, RowId};
use crate::backend::StorageBackend;
use crate::query::QueryBuilder;

const ROWS_DIR: &str = "rows";
const INDEXES_DIR: &str = "indexes";
const INDEX_FILE_SUFFIX: &str = ".json";

/// Per-table options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Column the assigned id is written into on insert (`None` keeps ids out of rows)
    pub id_column: Option<String>,
    /// Pretty-print row files
    pub pretty_rows: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            id_column: Some("id".to_string()),
            pretty_rows: false,
        }
    }
}

/// Returns true if `name` can be used as a single path segment
pub(crate) fn is_valid_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Durable storage for the rows and index tables of one table.
///
/// All operations are blocking and complete their read-modify-write of the
/// row and its index tables before returning. One writer at a time.
#[derive(Clone)]
pub struct RowStore {
    name: String,
    backend: Arc<dyn StorageBackend>,
    codec: RowCodec,
    id_column: Option<String>,
}

impl fmt::Debug for RowStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStore")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .field("id_column", &self.id_column)
            .finish()
    }
}

impl RowStore {
    /// Opens the table `name` on `backend`. Nothing is written until the first row.
    pub fn open(
        name: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        options: &StoreOptions,
    ) -> TableResult<Self> {
        let name = name.into();
        if !is_valid_segment(&name) {
            return Err(TableError::InvalidTableName(name));
        }
        if let Some(column) = &options.id_column {
            if column.is_empty() {
                return Err(TableError::InvalidColumn(column.clone()));
            }
        }

        Ok(Self {
            name,
            backend,
            codec: RowCodec::new(options.pretty_rows),
            id_column: options.id_column.clone(),
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a query over this table
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    fn rows_dir(&self) -> String {
        format!("{}/{}", self.name, ROWS_DIR)
    }

    fn indexes_dir(&self) -> String {
        format!("{}/{}", self.name, INDEXES_DIR)
    }

    fn row_path(&self, id: RowId) -> String {
        format!("{}/{}", self.rows_dir(), id.filename())
    }

    fn index_path(&self, column: &str) -> String {
        format!("{}/{}{}", self.indexes_dir(), column, INDEX_FILE_SUFFIX)
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Read a row. An absent row is `Ok(None)`.
    pub fn read(&self, id: RowId) -> TableResult<Option<Row>> {
        let path = self.row_path(id);
        match self.backend.read(&path) {
            Ok(bytes) => self.codec.decode(&path, &bytes).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All row ids, ascending
    pub fn row_ids(&self) -> TableResult<Vec<RowId>> {
        let mut ids = Vec::new();
        for name in self.backend.list(&self.rows_dir())? {
            match RowId::from_filename(&name) {
                Some(id) => ids.push(id),
                None => warn!(table = %self.name, file = %name, "skipping foreign file in rows directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Number of rows
    pub fn len(&self) -> TableResult<usize> {
        Ok(self.row_ids()?.len())
    }

    /// Returns true if the table holds no rows
    pub fn is_empty(&self) -> TableResult<bool> {
        Ok(self.row_ids()?.is_empty())
    }

    /// Insert a row under a fresh id (one past the current maximum).
    ///
    /// When an id column is configured the id is also written into the row.
    pub fn insert(&self, mut row: Row) -> TableResult<RowId> {
        validate_row(&row)?;

        // Listing every row file per insert is linear in table size; the
        // directory is the only record of allocated ids.
        let id = match self.row_ids()?.last() {
            Some(max) => max.next().ok_or(TableError::IdSpaceExhausted)?,
            None => RowId::FIRST,
        };

        if let Some(column) = &self.id_column {
            row.insert(column.clone(), Value::String(id.to_string()));
        }

        self.persist(id, None, Some(&row))?;
        Ok(id)
    }

    /// Merge `changes` into an existing row and return the merged row
    pub fn update(&self, id: RowId, changes: Row) -> TableResult<Row> {
        validate_row(&changes)?;

        let prev = self.read(id)?.ok_or(TableError::NotFound(id))?;
        let mut next = prev.clone();
        next.extend(changes);

        self.persist(id, Some(&prev), Some(&next))?;
        Ok(next)
    }

    /// Remove a row and return it
    pub fn erase(&self, id: RowId) -> TableResult<Row> {
        let prev = self.read(id)?.ok_or(TableError::NotFound(id))?;
        self.persist(id, Some(&prev), None)?;
        Ok(prev)
    }

    /// Replace (`Some`) or remove (`None`) the row stored under `id`,
    /// returning what was there before.
    pub fn write(&self, id: RowId, next: Option<&Row>) -> TableResult<Option<Row>> {
        if let Some(row) = next {
            validate_row(row)?;
        }
        let prev = self.read(id)?;
        if prev.is_none() && next.is_none() {
            return Ok(None);
        }
        self.persist(id, prev.as_ref(), next)?;
        Ok(prev)
    }

    fn persist(&self, id: RowId, prev: Option<&Row>, next: Option<&Row>) -> TableResult<()> {
        let path = self.row_path(id);
        match next {
            Some(row) => self.backend.write(&path, &self.codec.encode(row)?)?,
            None => self.backend.delete(&path)?,
        }

        let touched = self.update_indexes(id, prev, next)?;
        debug!(
            table = %self.name,
            id = %id,
            op = if next.is_some() { "write" } else { "delete" },
            indexes_touched = touched,
            "row persisted"
        );
        Ok(())
    }

    fn index_key(row: &Row, column: &str) -> TableResult<IndexKey> {
        IndexKey::from_value(column_value(row, column)).ok_or_else(|| TableError::InvalidValue {
            column: column.to_string(),
        })
    }

    /// Move `id` between keys of every index whose key for this row changed.
    /// `None` on either side means the row is absent.
    fn update_indexes(&self, id: RowId, prev: Option<&Row>, next: Option<&Row>) -> TableResult<usize> {
        let mut touched = 0;

        for column in self.index_columns()? {
            let prev_key = prev.map(|row| Self::index_key(row, &column)).transpose()?;
            let next_key = next.map(|row| Self::index_key(row, &column)).transpose()?;
            if prev_key == next_key {
                continue;
            }

            let mut table = self.get_index_table(&column)?;
            if let Some(key) = &prev_key {
                if !table.remove(key, id) {
                    warn!(table = %self.name, column = %column, id = %id, "row was missing from index before update");
                }
            }
            if let Some(key) = next_key {
                table.insert(key, id);
            }
            self.save_index_table(&table)?;
            touched += 1;
        }

        Ok(touched)
    }

    // =========================================================================
    // Index tables
    // =========================================================================

    /// Build the index table for `column` with one scan over every row.
    ///
    /// Rebuilds from scratch if the index already exists.
    pub fn add_index_table(&self, column: &str) -> TableResult<()> {
        if !is_valid_segment(column) {
            return Err(TableError::InvalidColumn(column.to_string()));
        }

        let mut table = IndexTable::new(column);
        for id in self.row_ids()? {
            if let Some(row) = self.read(id)? {
                table.insert(Self::index_key(&row, column)?, id);
            }
        }

        self.save_index_table(&table)?;
        info!(
            table = %self.name,
            column = %column,
            keys = table.key_count(),
            rows = table.id_count(),
            "index table built"
        );
        Ok(())
    }

    /// Returns true if `column` has an index table.
    ///
    /// A backend failure is logged and reported as "no index", which routes
    /// predicates on the column to a scan.
    pub fn has_index_table(&self, column: &str) -> bool {
        if !is_valid_segment(column) {
            return false;
        }
        self.backend
            .exists(&self.index_path(column))
            .unwrap_or_else(|e| {
                warn!(table = %self.name, column = %column, error = %e, "index existence check failed");
                false
            })
    }

    /// Load the index table for `column`
    pub fn get_index_table(&self, column: &str) -> TableResult<IndexTable> {
        if !is_valid_segment(column) {
            return Err(TableError::IndexMissing(column.to_string()));
        }
        let path = self.index_path(column);
        match self.backend.read(&path) {
            Ok(bytes) => IndexTable::from_bytes(column, &path, &bytes),
            Err(e) if e.is_not_found() => Err(TableError::IndexMissing(column.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn save_index_table(&self, table: &IndexTable) -> TableResult<()> {
        let bytes = table.to_bytes()?;
        self.backend.write(&self.index_path(table.column()), &bytes)?;
        Ok(())
    }

    /// Columns that currently have an index table, ascending
    pub fn index_columns(&self) -> TableResult<Vec<String>> {
        Ok(self
            .backend
            .list(&self.indexes_dir())?
            .into_iter()
            .filter_map(|name| name.strip_suffix(INDEX_FILE_SUFFIX).map(str::to_string))
            .collect())
    }

    /// Drop the index table for `column`. Returns false if there was none.
    pub fn remove_index_table(&self, column: &str) -> TableResult<bool> {
        if !is_valid_segment(column) {
            return Ok(false);
        }
        match self.backend.delete(&self.index_path(column)) {
            Ok(()) => {
                info!(table = %self.name, column = %column, "index table removed");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check that every row appears in every index under exactly its own key.
    ///
    /// Returns the first violation as `IndexInconsistency`.
    pub fn verify_indexes(&self) -> TableResult<()> {
        let ids = self.row_ids()?;

        for column in self.index_columns()? {
            let table = self.get_index_table(&column)?;
            let inconsistent = |id| TableError::IndexInconsistency {
                column: column.clone(),
                id,
            };

            let mut expected = IndexTable::new(column.as_str());
            for &id in &ids {
                let row = self.read(id)?.ok_or_else(|| inconsistent(id))?;
                expected.insert(Self::index_key(&row, &column)?, id);
            }

            for (key, key_ids) in table.iter() {
                if let Some(&id) = key_ids.iter().find(|&&id| !expected.contains(key, id)) {
                    return Err(inconsistent(id));
                }
            }
            for (key, key_ids) in expected.iter() {
                if let Some(&id) = key_ids.iter().find(|&&id| !table.contains(key, id)) {
                    return Err(inconsistent(id));
                }
            }
        }

        Ok(())
    }

    /// Remove every row and index table of this table
    pub fn drop_table(&self) -> TableResult<()> {
        self.backend.delete_all(&self.name)?;
        info!(table = %self.name, "table dropped");
        Ok(())
    }
}
