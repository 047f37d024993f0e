//! Query-related data models.
//!
//! Parameters are always bound through the driver, never interpolated into
//! SQL text; [`SqlParam`] is the full set of value shapes a tool may bind.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A parameter value for parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SqlParam {
    /// NULL value
    Null,
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
}

impl SqlParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A fully materialized result set.
///
/// `columns` carries the column order reported by the driver; each row maps
/// column name to a JSON value whose variant was chosen from the column's
/// ODBC data type. Fixed-width character values arrive already right-trimmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// True if the result was cut off at the requested row limit.
    pub truncated: bool,
}

impl RowSet {
    /// Number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First value of the named column, if any row exists.
    pub fn first_value(&self, column: &str) -> Option<&JsonValue> {
        self.rows.first().and_then(|row| row.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_param_types() {
        assert!(SqlParam::Null.is_null());
        assert!(!SqlParam::Int(42).is_null());
        assert_eq!(SqlParam::Int(42).type_name(), "int");
        assert_eq!(SqlParam::from("hello").type_name(), "text");
    }

    #[test]
    fn test_sql_param_deserializes_untagged() {
        let params: Vec<SqlParam> = serde_json::from_str(r#"[null, 42, 1.5, "VA"]"#).unwrap();
        assert_eq!(
            params,
            vec![
                SqlParam::Null,
                SqlParam::Int(42),
                SqlParam::Float(1.5),
                SqlParam::Text("VA".to_string()),
            ]
        );
    }

    #[test]
    fn test_row_set_first_value() {
        let mut row = serde_json::Map::new();
        row.insert("TOTAL".to_string(), JsonValue::from(7));
        let set = RowSet {
            columns: vec!["TOTAL".to_string()],
            rows: vec![row],
            truncated: false,
        };
        assert_eq!(set.row_count(), 1);
        assert_eq!(set.first_value("TOTAL").and_then(|v| v.as_i64()), Some(7));
        assert!(set.first_value("MISSING").is_none());
    }
}
