//! JSON I/O handling for CLI
//!
//! - Input: rows and changes as JSON object arguments
//! - Output: one JSON object per line on stdout
//! - Logs go to stderr

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::query::Criteria;
use crate::table::Row;

/// Parse a JSON object argument
pub fn parse_row(text: &str) -> CliResult<Row> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(row) => Ok(row),
        other => Err(CliError::invalid_argument(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Parse `--where` arguments of the form `column=value`.
///
/// The value is parsed as JSON so `age=20` compares against a number; text
/// that is not JSON is taken as a string (`name=bob`).
pub fn parse_filters(filters: &[String]) -> CliResult<Criteria> {
    filters.iter().try_fold(Criteria::new(), |criteria, filter| {
        let (column, raw) = filter
            .split_once('=')
            .ok_or_else(|| CliError::invalid_argument(format!("expected COLUMN=VALUE, got {:?}", filter)))?;
        if column.is_empty() {
            return Err(CliError::invalid_argument(format!("empty column in {:?}", filter)));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(criteria.eq(column, value))
    })
}

/// Write one value as a single JSON line
pub fn write_line<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Predicate;
    use serde_json::json;

    #[test]
    fn test_parse_row() {
        assert_eq!(parse_row(r#"{"a": 1}"#).unwrap()["a"], json!(1));
        assert!(parse_row("[1]").is_err());
        assert!(parse_row("nope").is_err());
    }

    #[test]
    fn test_parse_filters() {
        let criteria = parse_filters(&[
            "age=20".to_string(),
            "name=bob".to_string(),
            "code=\"20\"".to_string(),
            "eq=a=b".to_string(),
        ])
        .unwrap();

        let literal = |column| criteria.get(column).and_then(Predicate::as_literal).cloned();
        assert_eq!(literal("age"), Some(json!(20)));
        assert_eq!(literal("name"), Some(json!("bob")));
        assert_eq!(literal("code"), Some(json!("20")));
        assert_eq!(literal("eq"), Some(json!("a=b")));
    }

    #[test]
    fn test_parse_filters_rejects_malformed() {
        assert!(parse_filters(&["age".to_string()]).is_err());
        assert!(parse_filters(&["=1".to_string()]).is_err());
    }

    #[test]
    fn test_write_line() {
        let mut out = Vec::new();
        write_line(&mut out, &json!({"a": 1})).unwrap();
        write_line(&mut out, &json!({"b": 2})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }
}
