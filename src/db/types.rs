//! Mapping from ODBC column metadata to JSON cell values.
//!
//! Rows are fetched through text buffers, so every cell arrives as bytes.
//! The declared column type decides how those bytes become JSON: integers
//! and floats are parsed, fixed-width CHAR columns lose their space padding,
//! everything else passes through as a string. Decimals and timestamps stay
//! textual so no precision is lost on the way to the client.

use odbc_api::DataType;
use serde_json::Value as JsonValue;

/// Coarse value category for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integral types, rendered as JSON numbers.
    Integer,
    /// Floating point types, rendered as JSON numbers.
    Float,
    /// Fixed-width CHAR/WCHAR, right-padded with spaces by the data source.
    FixedChar,
    /// Everything else, rendered verbatim as a JSON string.
    Text,
}

/// Classify a declared ODBC data type.
pub fn column_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::TinyInt
        | DataType::SmallInt
        | DataType::Integer
        | DataType::BigInt
        | DataType::Bit => ColumnKind::Integer,
        DataType::Real | DataType::Double | DataType::Float { .. } => ColumnKind::Float,
        DataType::Char { .. } | DataType::WChar { .. } => ColumnKind::FixedChar,
        _ => ColumnKind::Text,
    }
}

/// Convert one text-buffer cell into a JSON value.
///
/// `None` is SQL NULL. A numeric cell that fails to parse falls back to its
/// string form rather than erroring the whole row; drivers occasionally
/// report exotic numeric formats and the caller still wants the data.
pub fn cell_to_json(kind: ColumnKind, bytes: Option<&[u8]>) -> JsonValue {
    let Some(bytes) = bytes else {
        return JsonValue::Null;
    };
    let text = String::from_utf8_lossy(bytes);
    match kind {
        ColumnKind::Integer => match text.trim().parse::<i64>() {
            Ok(n) => JsonValue::from(n),
            Err(_) => JsonValue::String(text.into_owned()),
        },
        ColumnKind::Float => match text.trim().parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(text.clone().into_owned())),
            Err(_) => JsonValue::String(text.into_owned()),
        },
        ColumnKind::FixedChar => JsonValue::String(text.trim_end_matches(' ').to_string()),
        ColumnKind::Text => JsonValue::String(text.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cell() {
        assert_eq!(cell_to_json(ColumnKind::Integer, None), JsonValue::Null);
        assert_eq!(cell_to_json(ColumnKind::Text, None), JsonValue::Null);
    }

    #[test]
    fn test_integer_cell_parses() {
        assert_eq!(
            cell_to_json(ColumnKind::Integer, Some(b"42")),
            JsonValue::from(42)
        );
        assert_eq!(
            cell_to_json(ColumnKind::Integer, Some(b" -7 ")),
            JsonValue::from(-7)
        );
    }

    #[test]
    fn test_integer_cell_falls_back_to_string() {
        assert_eq!(
            cell_to_json(ColumnKind::Integer, Some(b"not-a-number")),
            JsonValue::String("not-a-number".to_string())
        );
    }

    #[test]
    fn test_float_cell() {
        assert_eq!(
            cell_to_json(ColumnKind::Float, Some(b"1.5")),
            JsonValue::from(1.5)
        );
    }

    #[test]
    fn test_fixed_char_right_trims_padding() {
        assert_eq!(
            cell_to_json(ColumnKind::FixedChar, Some(b"VA        ")),
            JsonValue::String("VA".to_string())
        );
        // Interior and leading spaces are data, only trailing pad goes.
        assert_eq!(
            cell_to_json(ColumnKind::FixedChar, Some(b"  NEW YORK  ")),
            JsonValue::String("  NEW YORK".to_string())
        );
    }

    #[test]
    fn test_text_cell_preserved_verbatim() {
        assert_eq!(
            cell_to_json(ColumnKind::Text, Some(b"123.450")),
            JsonValue::String("123.450".to_string())
        );
        assert_eq!(
            cell_to_json(ColumnKind::Text, Some(b"padded   ")),
            JsonValue::String("padded   ".to_string())
        );
    }
}
