//! rowquery - an embedded, file-backed row store with a fluent query layer
//!
//! Rows are flat JSON objects keyed by a monotonically assigned [`RowId`].
//! Any column can carry an index table mapping each value to the ids of
//! the rows holding it; index tables are kept consistent on every write.
//!
//! ```no_run
//! use rowquery::{Criteria, Database};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory();
//! let people = db.table("people")?;
//! people.add_index_table("age")?;
//! people.insert(json!({"name": "b", "age": 20}).as_object().cloned().unwrap_or_default())?;
//!
//! let names = people
//!     .query()
//!     .filter(Criteria::new().eq("age", 20))
//!     .select(["name"])
//!     .get()?;
//! assert_eq!(names, vec![json!({"name": "b"}).as_object().cloned().unwrap_or_default()]);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod database;
pub mod query;
pub mod table;

pub use config::Config;
pub use database::Database;
pub use query::{Criteria, Predicate, QueryBuilder, QueryError, QueryResult};
pub use table::{Row, RowId, RowStore, StoreOptions, TableError, TableResult};
