//! Secondary index tables
//!
//! An index table maps each observed value of one column to the ids of the
//! rows currently holding it: `BTreeMap<IndexKey, BTreeSet<RowId>>`, so key
//! iteration and id sets are both ordered.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{TableError, TableResult};
use super::row::RowId;

const SIGN_BIT: u64 = 1 << 63;

/// Index key representing a scalar column value.
///
/// Ordering is deterministic: Null < Bool < Int < UInt < Float < String.
/// `UInt` only holds values above `i64::MAX`, so integers stay in numeric order.
/// Integers and floats are distinct keys, matching JSON value equality
/// (`20` and `20.0` are different values).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Null, or a column the row does not have
    Null,
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Integer above `i64::MAX`
    UInt(u64),
    /// Float value (stored as order-preserving bits)
    Float(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering. `-0.0` and `0.0` compare
    /// equal as JSON values, so both map to the key of `0.0`.
    pub fn from_float(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let ordered = if bits & SIGN_BIT != 0 {
            !bits
        } else {
            bits ^ SIGN_BIT
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a JSON value. Arrays and objects have no key.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(IndexKey::Null),
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(IndexKey::UInt(u))
                } else {
                    n.as_f64().map(IndexKey::from_float)
                }
            }
            Value::String(s) => Some(IndexKey::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert back to the JSON value this key was built from
    pub fn to_value(&self) -> Value {
        match self {
            IndexKey::Null => Value::Null,
            IndexKey::Bool(b) => Value::Bool(*b),
            IndexKey::Int(i) => Value::from(*i),
            IndexKey::UInt(u) => Value::from(*u),
            IndexKey::Float(ordered) => {
                let bits = if ordered & SIGN_BIT != 0 {
                    ordered ^ SIGN_BIT
                } else {
                    !ordered
                };
                Value::from(f64::from_bits(bits))
            }
            IndexKey::String(s) => Value::String(s.clone()),
        }
    }
}

/// Persisted form of one index entry
#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    value: Value,
    ids: Vec<RowId>,
}

/// Value-to-row-ids index over a single column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    column: String,
    entries: BTreeMap<IndexKey, BTreeSet<RowId>>,
}

impl IndexTable {
    /// Creates an empty index for `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The indexed column
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Record that row `id` holds `key`
    pub fn insert(&mut self, key: IndexKey, id: RowId) {
        self.entries.entry(key).or_default().insert(id);
    }

    /// Forget that row `id` holds `key`.
    ///
    /// Drops the key once no row holds it. Returns false if the pair was absent.
    pub fn remove(&mut self, key: &IndexKey, id: RowId) -> bool {
        let Some(ids) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = ids.remove(&id);
        if ids.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Ids holding exactly `key`, ascending
    pub fn lookup(&self, key: &IndexKey) -> BTreeSet<RowId> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Ids whose column equals `value`, ascending. Composite values match nothing.
    pub fn lookup_value(&self, value: &Value) -> BTreeSet<RowId> {
        IndexKey::from_value(value)
            .map(|key| self.lookup(&key))
            .unwrap_or_default()
    }

    /// Returns true if `id` is recorded under `key`
    pub fn contains(&self, key: &IndexKey, id: RowId) -> bool {
        self.entries.get(key).is_some_and(|ids| ids.contains(&id))
    }

    /// Iterate over keys and their id sets in key order
    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &BTreeSet<RowId>)> {
        self.entries.iter()
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the total number of indexed ids
    pub fn id_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Serialize to the persisted JSON form
    pub fn to_bytes(&self) -> TableResult<Vec<u8>> {
        let entries: Vec<IndexEntry> = self
            .entries
            .iter()
            .map(|(key, ids)| IndexEntry {
                value: key.to_value(),
                ids: ids.iter().copied().collect(),
            })
            .collect();

        serde_json::to_vec(&entries).map_err(|e| TableError::corrupted(&self.column, e))
    }

    /// Reload an index persisted by [`IndexTable::to_bytes`]
    pub fn from_bytes(column: impl Into<String>, path: &str, bytes: &[u8]) -> TableResult<Self> {
        let entries: Vec<IndexEntry> =
            serde_json::from_slice(bytes).map_err(|e| TableError::corrupted(path, e))?;

        let mut table = IndexTable::new(column);
        for entry in entries {
            let key = IndexKey::from_value(&entry.value)
                .ok_or_else(|| TableError::corrupted(path, "non-scalar index key"))?;
            for id in entry.ids {
                table.insert(key.clone(), id);
            }
        }
        Ok(table)
    }
}
