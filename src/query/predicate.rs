//! Column predicates
//!
//! A predicate is either a literal (exact JSON equality, no coercion) or a
//! caller-supplied test over the column value. Only scalar literals can be
//! answered from an index.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::table::{column_value, IndexKey, Row};

/// Caller-supplied test over one column value
pub type ValueTest = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A condition on a single column
#[derive(Clone)]
pub enum Predicate {
    /// Column equals this value exactly
    Literal(Value),
    /// Column value passes this test
    Custom(ValueTest),
}

impl Predicate {
    /// Create an equality predicate
    pub fn literal(value: impl Into<Value>) -> Self {
        Predicate::Literal(value.into())
    }

    /// Create a predicate from a test function
    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(test))
    }

    /// Evaluate against a column value (null for a missing column)
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Predicate::Literal(expected) => value == expected,
            Predicate::Custom(test) => test(value),
        }
    }

    /// The literal value, if this is an equality predicate
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Predicate::Literal(value) => Some(value),
            Predicate::Custom(_) => None,
        }
    }

    /// Returns true if an index lookup can answer this predicate
    pub fn is_indexable(&self) -> bool {
        self.as_literal()
            .is_some_and(|value| IndexKey::from_value(value).is_some())
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Predicate::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Literal(value) => write!(f, "= {}", value),
            Predicate::Custom(_) => write!(f, "matches <fn>"),
        }
    }
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        Predicate::Literal(value)
    }
}

/// Column predicates combined with AND
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    predicates: BTreeMap<String, Predicate>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Predicate::literal(value))
    }

    /// Require `column` to pass `test`
    pub fn matching<F>(self, column: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with(column, Predicate::custom(test))
    }

    /// Set the predicate for `column`, replacing any earlier one
    pub fn with(mut self, column: impl Into<String>, predicate: Predicate) -> Self {
        self.predicates.insert(column.into(), predicate);
        self
    }

    /// Predicate on `column`, if any
    pub fn get(&self, column: &str) -> Option<&Predicate> {
        self.predicates.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Iterate in column order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Predicate)> {
        self.predicates.iter()
    }

    /// Returns true if `row` satisfies every predicate
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates
            .iter()
            .all(|(column, predicate)| predicate.matches(column_value(row, column)))
    }
}

impl FromIterator<(String, Predicate)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (String, Predicate)>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Criteria {
    type Item = (String, Predicate);
    type IntoIter = std::collections::btree_map::IntoIter<String, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_literal_no_type_coercion() {
        let pred = Predicate::literal("123");
        assert!(!pred.matches(&json!(123)));
        assert!(pred.matches(&json!("123")));
    }

    #[test]
    fn test_custom_predicate() {
        let adult = Predicate::custom(|v| v.as_i64().is_some_and(|age| age >= 18));
        assert!(adult.matches(&json!(30)));
        assert!(!adult.matches(&json!(12)));
        assert!(!adult.matches(&Value::Null));
    }

    #[test]
    fn test_indexable() {
        assert!(Predicate::literal(20).is_indexable());
        assert!(Predicate::literal(Value::Null).is_indexable());
        assert!(!Predicate::literal(json!([20])).is_indexable());
        assert!(!Predicate::custom(|_| true).is_indexable());
    }

    #[test]
    fn test_criteria_all_must_hold() {
        let criteria = Criteria::new()
            .eq("active", true)
            .matching("age", |v| v.as_i64().is_some_and(|age| age > 20));

        assert!(criteria.matches(&row(json!({"active": true, "age": 25}))));
        assert!(!criteria.matches(&row(json!({"active": false, "age": 25}))));
        assert!(!criteria.matches(&row(json!({"active": true, "age": 18}))));
    }

    #[test]
    fn test_missing_column_reads_as_null() {
        let criteria = Criteria::new().eq("nickname", Value::Null);
        assert!(criteria.matches(&row(json!({"name": "a"}))));
        assert!(!Criteria::new().eq("nickname", "x").matches(&row(json!({"name": "a"}))));
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        assert!(Criteria::new().matches(&Row::new()));
    }

    #[test]
    fn test_later_predicate_replaces_earlier() {
        let criteria = Criteria::new().eq("age", 10).eq("age", 20);
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria.get("age").and_then(Predicate::as_literal), Some(&json!(20)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Predicate::literal("a").to_string(), "= \"a\"");
        assert_eq!(Predicate::custom(|_| true).to_string(), "matches <fn>");
    }
}
