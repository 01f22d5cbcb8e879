use crate::dataset::Dataset;
use crate::raw::RawRecord;
use crate::schema::{ColumnSchema, ColumnType, Schema, SchemaError};
use std::sync::Arc;

/// Excretion export columns. `wet` and `dirty` are exported as counts and
/// read as booleans.
///
/// Header text follows the tracker's leading-space convention. Exports with
/// other headers should go through [`Excretions::with_schema`].
pub fn excretion_schema() -> Result<Schema, SchemaError> {
    Schema::new(vec![
        ColumnSchema::direct("id", "id", "id", ColumnType::Number),
        ColumnSchema::direct("time", "Time", " Time", ColumnType::DateTime),
        ColumnSchema::direct("excretionType", "Type", " Type", ColumnType::String),
        ColumnSchema::direct("wet", "Wet", " Wet", ColumnType::Boolean),
        ColumnSchema::direct("dirty", "Dirty", " Dirty", ColumnType::Boolean),
        ColumnSchema::direct("note", "Note", " Notes", ColumnType::String),
    ])
}

#[derive(Debug, Clone)]
pub struct Excretions {
    dataset: Dataset,
}

impl Excretions {
    pub fn new(records: &[RawRecord]) -> Result<Self, SchemaError> {
        Ok(Self::with_schema(records, excretion_schema()?))
    }

    /// Transforms excretion rows with caller-supplied columns.
    pub fn with_schema(records: &[RawRecord], schema: Schema) -> Self {
        Excretions {
            dataset: Dataset::build(records, Arc::new(schema)),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::view::RowPredicate;

    #[test]
    fn test_excretion_flags_are_booleans() {
        let records = vec![
            RawRecord::new()
                .with("id", "1")
                .with(" Time", "2024-02-01 09:00")
                .with(" Wet", "1")
                .with(" Dirty", "0"),
            RawRecord::new()
                .with("id", "2")
                .with(" Time", "2024-02-01 12:00")
                .with(" Wet", "2")
                .with(" Dirty", "1"),
        ];
        let excretions = Excretions::new(&records).unwrap();
        let dataset = excretions.dataset();
        assert_eq!(dataset.value(0, "wet").unwrap(), Some(&Value::Boolean(true)));
        assert_eq!(dataset.value(0, "dirty").unwrap(), Some(&Value::Boolean(false)));
        assert_eq!(dataset.value(0, "excretionType").unwrap(), Some(&Value::Empty));

        let dirty = dataset
            .view(None)
            .unwrap()
            .filter_rows(&[RowPredicate::new("dirty", true)])
            .unwrap();
        assert_eq!(dirty.row_indices(), vec![1]);
    }

    #[test]
    fn test_excretions_with_custom_headers() {
        let schema = Schema::new(vec![ColumnSchema::direct(
            "wet",
            "Wet",
            " Pee",
            ColumnType::Boolean,
        )])
        .unwrap();
        let records = vec![RawRecord::new().with(" Pee", "1"), RawRecord::new()];
        let excretions = Excretions::with_schema(&records, schema);
        assert_eq!(
            excretions.dataset().value(0, "wet").unwrap(),
            Some(&Value::Boolean(true))
        );
        assert_eq!(excretions.dataset().value(1, "wet").unwrap(), Some(&Value::Empty));
    }
}
