use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw scalar as handed over by the export parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Numeric cell
    Number(f64),
    /// Text cell (may still hold a number or a timestamp)
    String(String),
    /// Empty cell
    Empty,
}

impl RawValue {
    /// Returns true when the cell carries no data.
    ///
    /// Only absent cells and empty strings count as missing; a numeric zero
    /// is a real value.
    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::String(text) => text.is_empty(),
            RawValue::Number(_) => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::String(s) => write!(f, "{}", s),
            RawValue::Empty => Ok(()),
        }
    }
}

/// A typed cell produced by the transformer.
///
/// Coercion never fails loudly. Unparsable numbers become `Number(NaN)` and
/// unparsable timestamps become `InvalidDate`, so one malformed field cannot
/// abort a batch. Use [`Value::is_invalid`] to detect either sentinel.
///
/// Equality is strict: `Number(NaN)` is not equal to itself, matching the
/// semantics row filters rely on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing raw data, left undefined
    Empty,
    Boolean(bool),
    Number(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Timestamp that could not be parsed or computed
    InvalidDate,
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Returns true for the coercion sentinels (`NaN` numbers, invalid dates).
    pub fn is_invalid(&self) -> bool {
        match self {
            Value::Number(n) => n.is_nan(),
            Value::InvalidDate => true,
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Returns the timestamp held by a `DateTime` cell.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(timestamp) => Some(*timestamp),
            _ => None,
        }
    }

    /// Bit-level equality, treating two `NaN` numbers with identical bits as equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Value::DateTime(timestamp) => write!(f, "{}", timestamp.format("%Y-%m-%dT%H:%M:%S")),
            Value::InvalidDate => write!(f, "Invalid Date"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_missing() {
        assert!(RawValue::Empty.is_missing());
        assert!(RawValue::from("").is_missing());
        assert!(!RawValue::from(" ").is_missing());
        assert!(!RawValue::Number(0.0).is_missing());
    }

    #[test]
    fn test_value_sentinels() {
        assert!(Value::Number(f64::NAN).is_invalid());
        assert!(Value::InvalidDate.is_invalid());
        assert!(!Value::Number(1.5).is_invalid());
        assert!(!Value::Empty.is_invalid());
    }

    #[test]
    fn test_nan_is_not_equal_but_same() {
        let a = Value::Number(f64::NAN);
        assert_ne!(a, a.clone());
        assert!(a.same_as(&a.clone()));
    }

    #[test]
    fn test_value_serializes_to_plain_json() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let values = vec![
            Value::Empty,
            Value::Boolean(true),
            Value::Number(2.5),
            Value::from("nap"),
            Value::Date(date),
            Value::DateTime(date.and_hms_opt(7, 30, 0).unwrap()),
            Value::InvalidDate,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"[null,true,2.5,"nap","2024-01-02","2024-01-02T07:30:00",null]"#
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::InvalidDate.to_string(), "Invalid Date");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Number(90.0).to_string(), "90");
    }
}
