//! Explain output for query plans
//!
//! Deterministic and human-readable. Describes the plan as it would run
//! now, after stale indexed predicates have been moved back to scanning.

use std::fmt;

use serde::Serialize;

use super::plan::QueryPlan;

/// How candidate row ids are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanKind {
    /// Every row id in the table
    FullScan,
    /// Intersection of index lookups
    IndexLookup,
}

impl ScanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::FullScan => "FULL_SCAN",
            ScanKind::IndexLookup => "INDEX_LOOKUP",
        }
    }
}

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    pub table: String,
    pub scan: ScanKind,
    /// `column = value` for each index lookup
    pub index_lookups: Vec<String>,
    /// Predicates evaluated per row
    pub filters: Vec<String>,
    /// Projected columns, `None` for all
    pub selected: Option<Vec<String>>,
    pub limit: Option<usize>,
    /// Foreign table of each join, in order
    pub joins: Vec<String>,
}

impl ExplainPlan {
    pub fn from_plan(table: &str, plan: &QueryPlan<'_>) -> Self {
        let index_lookups = plan
            .indexed_criteria()
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect();

        let filters = plan
            .criteria()
            .iter()
            .map(|(column, predicate)| format!("{} {}", column, predicate))
            .collect();

        let scan = if plan.uses_index() {
            ScanKind::IndexLookup
        } else {
            ScanKind::FullScan
        };

        Self {
            table: table.to_string(),
            scan,
            index_lookups,
            filters,
            selected: plan.selected().map(<[String]>::to_vec),
            limit: plan.limit(),
            joins: plan
                .joins()
                .iter()
                .map(|join| join.foreign().store().name().to_string())
                .collect(),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Table: {}", self.table)?;
        writeln!(f, "Scan Type: {}", self.scan.as_str())?;

        if !self.index_lookups.is_empty() {
            writeln!(f, "Index Lookups:")?;
            for lookup in &self.index_lookups {
                writeln!(f, "  - {}", lookup)?;
            }
        }
        if !self.filters.is_empty() {
            writeln!(f, "Filters:")?;
            for filter in &self.filters {
                writeln!(f, "  - {}", filter)?;
            }
        }
        match &self.selected {
            Some(columns) => writeln!(f, "Select: {}", columns.join(", "))?,
            None => writeln!(f, "Select: *")?,
        }
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        for table in &self.joins {
            writeln!(f, "Inner Join: {}", table)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::query::Criteria;
    use crate::table::{RowStore, StoreOptions};
    use serde_json::json;
    use std::sync::Arc;

    fn store(name: &str) -> RowStore {
        RowStore::open(name, Arc::new(MemoryBackend::new()), &StoreOptions::default()).unwrap()
    }

    #[test]
    fn test_explain_full_scan() {
        let people = store("people");
        let explain = people.query().explain();

        assert_eq!(explain.scan, ScanKind::FullScan);
        assert!(explain.index_lookups.is_empty());
        assert!(explain.filters.is_empty());
        assert_eq!(explain.selected, None);

        let output = explain.to_string();
        assert!(output.contains("Scan Type: FULL_SCAN"));
        assert!(output.contains("Select: *"));
    }

    #[test]
    fn test_explain_index_lookup() {
        let people = store("people");
        people.insert(json!({"age": 20}).as_object().unwrap().clone()).unwrap();
        people.add_index_table("age").unwrap();
        let pets = store("pets");

        let explain = people
            .query()
            .filter(Criteria::new().eq("age", 20).eq("name", "b"))
            .select(["name"])
            .limit(3)
            .inner_join(pets.query(), |_, _| true)
            .explain();

        assert_eq!(explain.scan, ScanKind::IndexLookup);
        assert_eq!(explain.index_lookups, vec!["age = 20".to_string()]);
        assert_eq!(explain.filters, vec!["name = \"b\"".to_string()]);
        assert_eq!(explain.limit, Some(3));
        assert_eq!(explain.joins, vec!["pets".to_string()]);

        let output = explain.to_string();
        assert!(output.contains("Index Lookups:\n  - age = 20"));
        assert!(output.contains("Inner Join: pets"));
    }

    #[test]
    fn test_explain_reflects_removed_index() {
        let people = store("people");
        people.add_index_table("age").unwrap();
        let query = people.query().filter(Criteria::new().eq("age", 20));
        assert_eq!(query.explain().scan, ScanKind::IndexLookup);

        people.remove_index_table("age").unwrap();
        let explain = query.explain();
        assert_eq!(explain.scan, ScanKind::FullScan);
        assert_eq!(explain.filters, vec!["age = 20".to_string()]);
    }
}
