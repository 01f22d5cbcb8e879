//! Schema-driven row transformation.
//!
//! The transformer walks each raw record through the schema left to right.
//! Direct columns are coerced from their raw field, derived columns are
//! computed from the values accumulated so far for the same row.

use crate::dataset::Dataset;
use crate::raw::RawRecord;
use crate::schema::{ColumnSource, ColumnType, PriorValues, Schema};
use crate::value::{RawValue, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, trace};

/// Timestamp layouts accepted for raw date/datetime fields, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Applies a schema to batches of raw records.
#[derive(Debug, Clone)]
pub struct Transformer {
    schema: Arc<Schema>,
}

impl Transformer {
    pub fn new(schema: Arc<Schema>) -> Self {
        Transformer { schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Transforms a batch of raw records into a typed dataset.
    ///
    /// # Arguments
    /// * `records` - Raw export rows, keyed by the export's header text
    ///
    /// # Returns
    /// A dataset with exactly one row per record, in input order. Coercion
    /// failures are embedded as sentinel values, never dropped.
    pub fn build(&self, records: &[RawRecord]) -> Dataset {
        debug!(
            rows = records.len(),
            columns = self.schema.len(),
            "Transforming raw records"
        );

        let rows = records
            .iter()
            .enumerate()
            .map(|(row_index, record)| self.transform_row(row_index, record))
            .collect();

        Dataset::from_parts(Arc::clone(&self.schema), rows)
    }

    fn transform_row(&self, row_index: usize, record: &RawRecord) -> Vec<Value> {
        let mut computed: Vec<Value> = Vec::with_capacity(self.schema.len());

        for column in self.schema.columns() {
            let value = match &column.source {
                ColumnSource::Derived { derive, .. } => {
                    let prior = PriorValues::new(&computed, &self.schema);
                    derive(&prior, record)
                }
                ColumnSource::Direct { source_field } => match record.present(source_field) {
                    Some(raw) => coerce(raw, column.column_type),
                    None => Value::Empty,
                },
            };

            if value.is_invalid() {
                trace!(row = row_index, column = %column.id, "Coercion produced a sentinel value");
            }
            computed.push(value);
        }

        computed
    }
}

/// Coerces a present raw value to a column type.
pub fn coerce(raw: &RawValue, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Boolean => Value::Boolean(parse_number(raw) > 0.0),
        ColumnType::Number => Value::Number(parse_number(raw)),
        ColumnType::DateTime => parse_datetime(raw).map_or(Value::InvalidDate, Value::DateTime),
        ColumnType::Date => {
            parse_datetime(raw).map_or(Value::InvalidDate, |timestamp| Value::Date(timestamp.date()))
        }
        ColumnType::String => match raw {
            RawValue::String(text) => Value::String(text.clone()),
            RawValue::Number(n) => Value::String(n.to_string()),
            RawValue::Empty => Value::Empty,
        },
        ColumnType::Untyped => match raw {
            RawValue::String(text) => Value::String(text.clone()),
            RawValue::Number(n) => Value::Number(*n),
            RawValue::Empty => Value::Empty,
        },
    }
}

/// Parses a raw value as a float, `NaN` when it does not start with a number.
pub fn parse_number(raw: &RawValue) -> f64 {
    match raw {
        RawValue::Number(n) => *n,
        RawValue::String(text) => parse_float(text),
        RawValue::Empty => f64::NAN,
    }
}

/// Lenient float parse: leading whitespace is skipped and the longest
/// numeric prefix is used, so `"90 min"` parses as `90`.
///
/// The only spelled-out value accepted is a signed or unsigned `Infinity`;
/// `inf` and `nan` in any case are not numbers.
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if unsigned.starts_with("Infinity") {
        return if negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    match unsigned.as_bytes().first() {
        Some(b) if b.is_ascii_digit() || *b == b'.' => {}
        _ => return f64::NAN,
    }

    if let Ok(value) = trimmed.trim_end().parse::<f64>() {
        return value;
    }

    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let mantissa = &trimmed[digits_start..end];
    if mantissa.is_empty() || mantissa == "." {
        return f64::NAN;
    }

    // Exponent only counts when it has digits.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses a raw value as a wall-clock timestamp.
///
/// Numbers are epoch milliseconds. Text is tried as RFC 3339 first (keeping
/// the local wall clock of the given offset), then the layouts in
/// `DATETIME_FORMATS`, then bare dates at midnight.
pub fn parse_datetime(raw: &RawValue) -> Option<NaiveDateTime> {
    match raw {
        RawValue::Number(millis) => from_epoch_millis(*millis),
        RawValue::String(text) => parse_datetime_str(text),
        RawValue::Empty => None,
    }
}

pub fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(timestamp);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Epoch milliseconds of a wall-clock timestamp.
pub fn epoch_millis(timestamp: NaiveDateTime) -> i64 {
    timestamp.and_utc().timestamp_millis()
}

/// Wall-clock timestamp from (possibly fractional) epoch milliseconds.
///
/// Fractions are truncated toward zero; non-finite input yields `None`.
pub fn from_epoch_millis(millis: f64) -> Option<NaiveDateTime> {
    if !millis.is_finite() {
        return None;
    }
    let truncated = millis.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(truncated as i64).map(|timestamp| timestamp.naive_utc())
}
