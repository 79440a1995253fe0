//! Fluent query builder
//!
//! Configuration methods (`filter`, `select`, `limit`, `inner_join`) never
//! fail and never modify the builder they are called on: each returns a new
//! builder holding a forked plan. Terminal methods (`get`, `count`,
//! `delete`, `set`) run the plan against the store.
//!
//! Execution order for every terminal method:
//! 1. Resolve candidate ids (index intersection or full id list), ascending
//! 2. Stop once the limit is reached
//! 3. Read the row; skip it if absent
//! 4. Skip rows failing the scan predicates
//! 5. Apply the terminal action and project
//! 6. Fold the joins over the collected rows

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use super::errors::QueryResult;
use super::explain::ExplainPlan;
use super::plan::{merge_rows, QueryPlan};
use super::predicate::Criteria;
use crate::table::{Row, RowId, RowStore, TableError};

/// A store plus the plan being built against it
#[derive(Clone)]
pub struct QueryBuilder<'a> {
    store: &'a RowStore,
    plan: QueryPlan<'a>,
}

impl fmt::Debug for QueryBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table", &self.store.name())
            .field("plan", &self.plan)
            .finish()
    }
}

impl<'a> QueryBuilder<'a> {
    /// A builder selecting every row of `store`
    pub fn new(store: &'a RowStore) -> Self {
        Self {
            store,
            plan: QueryPlan::new(),
        }
    }

    /// The store this builder queries
    pub fn store(&self) -> &'a RowStore {
        self.store
    }

    /// The plan built so far
    pub fn plan(&self) -> &QueryPlan<'a> {
        &self.plan
    }

    /// Independent copy of this builder
    pub fn fork(&self) -> Self {
        Self {
            store: self.store,
            plan: self.plan.fork(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Filter rows by `criteria`, replacing any earlier criteria.
    ///
    /// Literal predicates on columns that currently have an index table are
    /// answered from the index; everything else is evaluated per row.
    pub fn filter(&self, criteria: Criteria) -> Self {
        let mut indexed = BTreeMap::new();
        let mut scanned = Criteria::new();

        for (column, predicate) in criteria {
            match predicate.as_literal() {
                Some(value) if predicate.is_indexable() && self.store.has_index_table(&column) => {
                    indexed.insert(column, value.clone());
                }
                _ => scanned = scanned.with(column, predicate),
            }
        }

        let mut fork = self.fork();
        fork.plan.set_indexed_criteria(indexed);
        fork.plan.set_criteria(scanned);
        fork
    }

    /// Project onto `columns`; `"*"` selects every column again
    pub fn select<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fork = self.fork();
        fork.plan.set_selected(columns);
        fork
    }

    /// Collect at most `limit` own rows (joins may multiply them afterwards)
    pub fn limit(&self, limit: usize) -> Self {
        let mut fork = self.fork();
        fork.plan.set_limit(limit);
        fork
    }

    /// Inner join with the rows of `foreign`; `matcher` sees (own row, foreign row)
    pub fn inner_join<F>(&self, foreign: QueryBuilder<'a>, matcher: F) -> Self
    where
        F: Fn(&Row, &Row) -> bool + Send + Sync + 'static,
    {
        let mut fork = self.fork();
        fork.plan.add_join(foreign, Arc::new(matcher));
        fork
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Matching rows, projected and joined
    pub fn get(&self) -> QueryResult<Vec<Row>> {
        self.traverse(|_, row| Ok(self.plan.select_columns(row)))
    }

    /// Number of rows `get` returns
    pub fn count(&self) -> QueryResult<usize> {
        Ok(self.get()?.len())
    }

    /// Erase every matching row; returns the rows as they were.
    ///
    /// Joined tables are read before the first erase, so a failing join
    /// leaves this table untouched.
    pub fn delete(&self) -> QueryResult<Vec<Row>> {
        self.traverse(|id, row| {
            self.store.erase(id)?;
            Ok(self.plan.select_columns(row))
        })
    }

    /// Merge `changes` into every matching row; returns the updated rows
    pub fn set(&self, changes: Row) -> QueryResult<Vec<Row>> {
        self.traverse(|id, _| {
            let updated = self.store.update(id, changes.clone())?;
            Ok(self.plan.select_columns(updated))
        })
    }

    /// Describe how this query would run
    pub fn explain(&self) -> ExplainPlan {
        ExplainPlan::from_plan(self.store.name(), &self.resolved_plan())
    }

    /// The plan with indexed predicates whose index has since been removed
    /// moved back to per-row evaluation
    fn resolved_plan(&self) -> Cow<'_, QueryPlan<'a>> {
        let stale: Vec<&String> = self
            .plan
            .indexed_criteria()
            .keys()
            .filter(|column| !self.store.has_index_table(column))
            .collect();

        if stale.is_empty() {
            return Cow::Borrowed(&self.plan);
        }

        let mut plan = self.plan.fork();
        for column in stale {
            debug!(table = %self.store.name(), column = %column, "index removed, scanning instead");
            plan.fall_back_to_scan(column);
        }
        Cow::Owned(plan)
    }

    fn traverse<F>(&self, mut visit: F) -> QueryResult<Vec<Row>>
    where
        F: FnMut(RowId, Row) -> QueryResult<Row>,
    {
        let plan = self.resolved_plan();
        let ids = plan.get_starting_ids(self.store)?;
        let foreign = plan.fetch_joins()?;

        let mut rows = Vec::new();
        for id in ids {
            if !plan.within_limit(&rows) {
                break;
            }

            let Some(row) = self.store.read(id)? else {
                if let Some(column) = plan.indexed_criteria().keys().next() {
                    error!(table = %self.store.name(), column = %column, id = %id, "index references a missing row");
                    return Err(TableError::IndexInconsistency {
                        column: column.clone(),
                        id,
                    }
                    .into());
                }
                continue;
            };

            if !plan.matches_row(&row) {
                continue;
            }

            rows.push(visit(id, row)?);
        }

        Ok(plan.join_fetched(rows, &foreign, merge_rows))
    }
}
