//! Rows and row identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{TableError, TableResult};

/// A row: column name to scalar value.
pub type Row = serde_json::Map<String, Value>;

/// Minimum number of digits in a rendered row id.
///
/// Ids past `9999` render wider; ordering always uses the numeric value.
pub const ROW_ID_WIDTH: usize = 4;

const ROW_FILE_SUFFIX: &str = ".json";

static NULL: Value = Value::Null;

/// Identifier of a row within one table.
///
/// Rendered as a zero-padded decimal (`0000`, `0001`, ...). Only the
/// canonical rendering parses back, so ids round-trip losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RowId(u64);

impl RowId {
    /// The id given to the first row of an empty table
    pub const FIRST: RowId = RowId(0);

    pub fn new(value: u64) -> Self {
        RowId(value)
    }

    /// Returns the numeric value
    pub fn value(self) -> u64 {
        self.0
    }

    /// The id after this one, or `None` once the numeric space is used up
    pub fn next(self) -> Option<RowId> {
        self.0.checked_add(1).map(RowId)
    }

    /// Parse a canonical rendering (`"0042"`, not `"42"` or `"00042"`)
    pub fn parse(s: &str) -> Option<RowId> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id = RowId(s.parse().ok()?);
        (id.to_string() == s).then_some(id)
    }

    /// Recover an id from a row file name (`0042.json`)
    pub fn from_filename(name: &str) -> Option<RowId> {
        name.strip_suffix(ROW_FILE_SUFFIX).and_then(RowId::parse)
    }

    /// File name holding this row
    pub fn filename(self) -> String {
        format!("{}{}", self, ROW_FILE_SUFFIX)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = ROW_ID_WIDTH)
    }
}

impl FromStr for RowId {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowId::parse(s).ok_or_else(|| TableError::InvalidRowId(s.to_string()))
    }
}

impl TryFrom<String> for RowId {
    type Error = TableError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RowId> for String {
    fn from(id: RowId) -> Self {
        id.to_string()
    }
}

/// Value of `column` in `row`; a missing column reads as null.
pub fn column_value<'r>(row: &'r Row, column: &str) -> &'r Value {
    row.get(column).unwrap_or(&NULL)
}

/// Reject rows holding arrays or objects.
pub fn validate_row(row: &Row) -> TableResult<()> {
    match row
        .iter()
        .find(|(_, value)| matches!(value, Value::Array(_) | Value::Object(_)))
    {
        Some((column, _)) => Err(TableError::InvalidValue {
            column: column.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(RowId::new(0).to_string(), "0000");
        assert_eq!(RowId::new(42).to_string(), "0042");
        assert_eq!(RowId::new(12345).to_string(), "12345");
    }

    #[test]
    fn test_parse_canonical_only() {
        assert_eq!(RowId::parse("0042"), Some(RowId::new(42)));
        assert_eq!(RowId::parse("12345"), Some(RowId::new(12345)));
        assert_eq!(RowId::parse("42"), None);
        assert_eq!(RowId::parse("00042"), None);
        assert_eq!(RowId::parse("-001"), None);
        assert_eq!(RowId::parse(""), None);
        assert_eq!(RowId::parse("99999999999999999999999"), None);
    }

    #[test]
    fn test_filename_round_trip() {
        let id = RowId::new(7);
        assert_eq!(id.filename(), "0007.json");
        assert_eq!(RowId::from_filename("0007.json"), Some(id));
        assert_eq!(RowId::from_filename("0007.tmp"), None);
    }

    #[test]
    fn test_numeric_order_past_width() {
        let mut ids = vec![RowId::new(10000), RowId::new(9999), RowId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![RowId::new(2), RowId::new(9999), RowId::new(10000)]);
    }

    #[test]
    fn test_next_overflow() {
        assert_eq!(RowId::new(1).next(), Some(RowId::new(2)));
        assert_eq!(RowId::new(u64::MAX).next(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let encoded = serde_json::to_value(RowId::new(3)).unwrap();
        assert_eq!(encoded, json!("0003"));

        let decoded: RowId = serde_json::from_value(json!("0003")).unwrap();
        assert_eq!(decoded, RowId::new(3));

        assert!(serde_json::from_value::<RowId>(json!("3")).is_err());
    }

    #[test]
    fn test_column_value_missing_is_null() {
        let row = json!({"name": "a"}).as_object().unwrap().clone();
        assert_eq!(column_value(&row, "name"), &json!("a"));
        assert_eq!(column_value(&row, "age"), &Value::Null);
    }

    #[test]
    fn test_validate_row_rejects_composites() {
        let ok = json!({"a": 1, "b": "x", "c": null, "d": true});
        assert!(validate_row(ok.as_object().unwrap()).is_ok());

        let bad = json!({"a": 1, "tags": ["x"]});
        let err = validate_row(bad.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, TableError::InvalidValue { column } if column == "tags"));
    }
}
