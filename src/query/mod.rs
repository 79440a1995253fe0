//! Query subsystem for rowquery
//!
//! Queries are built fluently against a [`RowStore`](crate::table::RowStore)
//! and run by a terminal call.
//!
//! # Design Principles
//!
//! - Immutable builders: every configuration call returns a new builder
//! - Index first: scalar equality on an indexed column narrows candidates
//!   before any row is read
//! - Deterministic: rows come back in ascending id order, joins in the
//!   order they were added
//!
//! # Execution
//!
//! 1. Candidate ids from index intersection, or every id
//! 2. Limit, then scan predicates, then the terminal action and projection
//! 3. Inner joins, each a nested loop over the materialized foreign rows

mod builder;
mod errors;
mod explain;
mod plan;
mod predicate;

pub use builder::QueryBuilder;
pub use errors::{QueryError, QueryResult};
pub use explain::{ExplainPlan, ScanKind};
pub use plan::{merge_rows, Join, QueryPlan, RowMatcher, WILDCARD};
pub use predicate::{Criteria, Predicate, ValueTest};
