//! Row store subsystem for rowquery
//!
//! A table is a directory of row files plus one index file per indexed
//! column, all reached through a [`StorageBackend`](crate::backend::StorageBackend).
//!
//! # Invariants
//!
//! - A row id present in the store maps to exactly one row; absence is not an error
//! - New ids are one past the current maximum (zero for an empty table)
//! - For every indexed column C and row R, R's id appears in the index for C
//!   under R[C] and under no other key, after every insert, update and erase
//! - A missing column indexes under `null`, the value a scan reads for it

mod codec;
mod errors;
mod index;
mod row;
mod store;

pub use codec::RowCodec;
pub use errors::{Severity, TableError, TableResult};
pub use index::{IndexKey, IndexTable};
pub use row::{column_value, validate_row, Row, RowId, ROW_ID_WIDTH};
pub use store::{RowStore, StoreOptions};

pub(crate) use store::is_valid_segment;
