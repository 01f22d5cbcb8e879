use crate::dataset::Dataset;
use crate::raw::RawRecord;
use crate::schema::{ColumnSchema, ColumnType, Schema, SchemaError};
use std::sync::Arc;

/// Feed export columns: id, start, feed type, quantity, duration, notes.
///
/// Header text follows the tracker's leading-space convention. Exports with
/// other headers should go through [`Feeds::with_schema`].
pub fn feed_schema() -> Result<Schema, SchemaError> {
    Schema::new(vec![
        ColumnSchema::direct("id", "id", "id", ColumnType::Number),
        ColumnSchema::direct("start", "Start Time", " Start Time", ColumnType::DateTime),
        ColumnSchema::direct("feedType", "Feed Type", " Feed Type", ColumnType::String),
        ColumnSchema::direct("quantity", "Quantity (oz)", " Quantity (oz)", ColumnType::Number),
        ColumnSchema::direct("duration", "Duration", " Duration (Minutes)", ColumnType::Number),
        ColumnSchema::direct("note", "Note", " Notes", ColumnType::String),
    ])
}

/// Typed feed rows.
#[derive(Debug, Clone)]
pub struct Feeds {
    dataset: Dataset,
}

impl Feeds {
    pub fn new(records: &[RawRecord]) -> Result<Self, SchemaError> {
        Ok(Self::with_schema(records, feed_schema()?))
    }

    /// Transforms feed rows with caller-supplied columns.
    pub fn with_schema(records: &[RawRecord], schema: Schema) -> Self {
        Feeds {
            dataset: Dataset::build(records, Arc::new(schema)),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}
