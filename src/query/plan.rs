//! Query plans
//!
//! A plan is plain configuration: limit, projection, scan predicates,
//! indexed predicates and joins. Builders never modify a plan in place;
//! they fork it and configure the fork, so a plan held by one builder is
//! never changed through another.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::builder::QueryBuilder;
use super::errors::{QueryError, QueryResult};
use super::predicate::{Criteria, Predicate};
use crate::table::{Row, RowId, RowStore, TableResult};

/// Marker that selects every column
pub const WILDCARD: &str = "*";

/// Decides whether an own row and a foreign row belong together
pub type RowMatcher = Arc<dyn Fn(&Row, &Row) -> bool + Send + Sync>;

/// Merge two rows; columns of `right` win on collision
pub fn merge_rows(left: &Row, right: &Row) -> Row {
    let mut merged = left.clone();
    merged.extend(right.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// One inner join: a foreign query and the matcher pairing rows with it
#[derive(Clone)]
pub struct Join<'a> {
    foreign: QueryBuilder<'a>,
    matcher: RowMatcher,
}

impl<'a> Join<'a> {
    /// The foreign query
    pub fn foreign(&self) -> &QueryBuilder<'a> {
        &self.foreign
    }

    /// Materialize the foreign rows
    fn fetch(&self) -> QueryResult<Vec<Row>> {
        self.foreign.get().map_err(|e| QueryError::JoinFailed {
            table: self.foreign.store().name().to_string(),
            source: Box::new(e),
        })
    }

    /// Nested-loop inner join of `rows` against already fetched foreign rows
    fn apply<M>(&self, rows: Vec<Row>, foreign_rows: &[Row], merge: M) -> Vec<Row>
    where
        M: Fn(&Row, &Row) -> Row,
    {
        let mut joined = Vec::new();
        for row in &rows {
            for foreign_row in foreign_rows {
                if (self.matcher)(row, foreign_row) {
                    joined.push(merge(row, foreign_row));
                }
            }
        }
        joined
    }
}

impl fmt::Debug for Join<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join")
            .field("foreign", &self.foreign)
            .field("matcher", &"<fn>")
            .finish()
    }
}

/// Immutable-by-convention query configuration
#[derive(Debug, Clone, Default)]
pub struct QueryPlan<'a> {
    limit: Option<usize>,
    selected: Option<Vec<String>>,
    criteria: Criteria,
    indexed_criteria: BTreeMap<String, Value>,
    joins: Vec<Join<'a>>,
}

impl<'a> QueryPlan<'a> {
    /// An empty plan: every row, every column, no joins
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent copy; configuring the fork leaves `self` untouched
    pub fn fork(&self) -> Self {
        self.clone()
    }

    // =========================================================================
    // Limit
    // =========================================================================

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true if another row may still be collected
    pub fn within_limit(&self, rows: &[Row]) -> bool {
        self.limit.map_or(true, |limit| rows.len() < limit)
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Set the projection. A wildcard anywhere selects every column.
    pub fn set_selected<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut selected = Vec::new();
        for column in columns {
            let column = column.into();
            if column == WILDCARD {
                self.selected = None;
                return;
            }
            if seen.insert(column.clone()) {
                selected.push(column);
            }
        }
        self.selected = Some(selected);
    }

    /// Projected columns, `None` for all
    pub fn selected(&self) -> Option<&[String]> {
        self.selected.as_deref()
    }

    /// Keep only the selected columns; missing columns are left out
    pub fn select_columns(&self, mut row: Row) -> Row {
        let Some(selected) = &self.selected else {
            return row;
        };
        let mut projected = Row::new();
        for column in selected {
            if let Some(value) = row.remove(column) {
                projected.insert(column.clone(), value);
            }
        }
        projected
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Set the predicates evaluated against each row
    pub fn set_criteria(&mut self, criteria: Criteria) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Returns true if `row` satisfies every scan predicate
    pub fn matches_row(&self, row: &Row) -> bool {
        self.criteria.matches(row)
    }

    /// Set the equality predicates answered from index tables.
    ///
    /// Every column here must have an index table when the plan runs.
    pub fn set_indexed_criteria(&mut self, criteria: BTreeMap<String, Value>) {
        self.indexed_criteria = criteria;
    }

    pub fn indexed_criteria(&self) -> &BTreeMap<String, Value> {
        &self.indexed_criteria
    }

    /// Returns true if candidate ids come from index lookups
    pub fn uses_index(&self) -> bool {
        !self.indexed_criteria.is_empty()
    }

    /// Evaluate the indexed predicate on `column` by scanning instead
    pub fn fall_back_to_scan(&mut self, column: &str) {
        if let Some(value) = self.indexed_criteria.remove(column) {
            self.criteria = std::mem::take(&mut self.criteria).with(column, Predicate::Literal(value));
        }
    }

    /// Candidate row ids, ascending.
    ///
    /// Without indexed predicates this is every id in the store. Otherwise
    /// each indexed column contributes the ids under its value and the
    /// candidates are the intersection of those sets.
    pub fn get_starting_ids(&self, store: &RowStore) -> TableResult<Vec<RowId>> {
        if self.indexed_criteria.is_empty() {
            return store.row_ids();
        }

        let mut candidates: Option<BTreeSet<RowId>> = None;
        for (column, value) in &self.indexed_criteria {
            let ids = store.get_index_table(column)?.lookup_value(value);
            let narrowed = match candidates {
                None => ids,
                Some(prev) => prev.intersection(&ids).copied().collect(),
            };
            let exhausted = narrowed.is_empty();
            candidates = Some(narrowed);
            if exhausted {
                break;
            }
        }

        Ok(candidates.unwrap_or_default().into_iter().collect())
    }

    // =========================================================================
    // Joins
    // =========================================================================

    /// Append an inner join; joins apply in the order added
    pub fn add_join(&mut self, foreign: QueryBuilder<'a>, matcher: RowMatcher) {
        self.joins.push(Join { foreign, matcher });
    }

    pub fn joins(&self) -> &[Join<'a>] {
        &self.joins
    }

    /// Read the foreign rows of every join, in join order
    pub fn fetch_joins(&self) -> QueryResult<Vec<Vec<Row>>> {
        self.joins.iter().map(Join::fetch).collect()
    }

    /// Fold every join over `rows`, left to right
    pub fn exec_joins<M>(&self, rows: Vec<Row>, merge: M) -> QueryResult<Vec<Row>>
    where
        M: Fn(&Row, &Row) -> Row,
    {
        let fetched = self.fetch_joins()?;
        Ok(self.join_fetched(rows, &fetched, merge))
    }

    /// Fold every join over `rows` using foreign rows from [`QueryPlan::fetch_joins`]
    pub fn join_fetched<M>(&self, rows: Vec<Row>, fetched: &[Vec<Row>], merge: M) -> Vec<Row>
    where
        M: Fn(&Row, &Row) -> Row,
    {
        self.joins
            .iter()
            .zip(fetched)
            .fold(rows, |rows, (join, foreign_rows)| {
                join.apply(rows, foreign_rows, &merge)
            })
    }
}
