//! Raw record boundary.
//!
//! Raw records are produced by whatever parses the tracker export. Field names
//! are kept byte-for-byte, including the leading space the export puts in
//! front of every header after the first (`" Start Time"`, `" Notes"`).

use crate::value::RawValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One exported row: field name to raw scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: IndexMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord {
            fields: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the raw cell for a field, if the export carried it.
    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// Returns the cell only when it holds data (see [`RawValue::is_missing`]).
    pub fn present(&self, field: &str) -> Option<&RawValue> {
        self.get(field).filter(|value| !value.is_missing())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// Errors raised while adapting export text into raw records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawError {
    /// Malformed CSV input
    Csv(String),
    /// Malformed JSON input
    Json(String),
}

impl std::fmt::Display for RawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawError::Csv(msg) => write!(f, "CSV error: {}", msg),
            RawError::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl std::error::Error for RawError {}

impl From<csv::Error> for RawError {
    fn from(err: csv::Error) -> Self {
        RawError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for RawError {
    fn from(err: serde_json::Error) -> Self {
        RawError::Json(err.to_string())
    }
}

/// Reads CSV export text into raw records.
///
/// Headers are not trimmed. Every cell is kept as text; empty cells become
/// [`RawValue::Empty`]. Rows shorter than the header simply lack the trailing
/// fields.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, RawError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut records: Vec<RawRecord> = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(field, cell)| {
                let value = if cell.is_empty() {
                    RawValue::Empty
                } else {
                    RawValue::String(cell.to_string())
                };
                (field.to_string(), value)
            })
            .collect();
        records.push(record);
    }

    tracing::debug!(rows = records.len(), columns = headers.len(), "Read CSV export");
    Ok(records)
}

/// Reads a JSON array of objects (string, number or null fields) into raw records.
pub fn read_json(text: &str) -> Result<Vec<RawRecord>, RawError> {
    let records: Vec<RawRecord> = serde_json::from_str(text)?;
    tracing::debug!(rows = records.len(), "Read JSON export");
    Ok(records)
}
