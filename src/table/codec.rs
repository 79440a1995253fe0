//! Row serialization codec
//!
//! A row file holds exactly one JSON object. Decoding validates the shape
//! so a damaged file surfaces as corruption instead of a silently empty row.

use serde_json::Value;

use super::errors::{TableError, TableResult};
use super::row::{validate_row, Row};

/// Translates rows to and from their on-disk JSON representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCodec {
    pretty: bool,
}

impl RowCodec {
    /// Create a codec; `pretty` indents row files for human inspection
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Encode a row
    pub fn encode(&self, row: &Row) -> TableResult<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(row)
        } else {
            serde_json::to_vec(row)
        };
        encoded.map_err(|e| TableError::corrupted("<row>", e))
    }

    /// Decode the contents of the row file at `path`
    pub fn decode(&self, path: &str, bytes: &[u8]) -> TableResult<Row> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TableError::corrupted(path, e))?;

        let Value::Object(row) = value else {
            return Err(TableError::corrupted(path, "row file is not a JSON object"));
        };

        validate_row(&row).map_err(|e| TableError::corrupted(path, e))?;
        Ok(row)
    }
}
