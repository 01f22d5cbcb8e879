//! Typed datasets and their export form.

use crate::raw::RawRecord;
use crate::schema::{ColumnType, Schema};
use crate::transformer::Transformer;
use crate::value::Value;
use crate::view::{ColumnSelector, TableView, ViewError};
use chrono::{Datelike, Timelike};
use indexmap::IndexMap;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row keyed by column id, in schema order.
pub type TypedRecord = IndexMap<String, Value>;

/// Immutable, ordered collection of transformed rows sharing one schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<Schema>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Transforms raw records with the given schema.
    pub fn build(records: &[RawRecord], schema: Arc<Schema>) -> Self {
        Transformer::new(schema).build(records)
    }

    /// Every row must hold exactly one value per schema column.
    pub(crate) fn from_parts(schema: Arc<Schema>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == schema.len()));
        Dataset { schema, rows }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major typed values.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Resolves a column id to its schema position.
    pub fn column_index(&self, id: &str) -> Result<usize, ViewError> {
        self.schema
            .position(id)
            .ok_or_else(|| ViewError::ColumnNotFound(id.to_string()))
    }

    /// Value of one cell by row index and column id.
    pub fn value(&self, row: usize, id: &str) -> Result<Option<&Value>, ViewError> {
        let column = self.column_index(id)?;
        Ok(self.rows.get(row).and_then(|values| values.get(column)))
    }

    /// Mapping form of one row.
    pub fn record(&self, index: usize) -> Option<TypedRecord> {
        self.row(index).map(|values| self.to_record(values))
    }

    /// Mapping form of every row.
    pub fn records(&self) -> Vec<TypedRecord> {
        self.rows.iter().map(|values| self.to_record(values)).collect()
    }

    fn to_record(&self, values: &[Value]) -> TypedRecord {
        self.schema
            .ids()
            .zip(values.iter())
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    /// Full typed table for a renderer.
    pub fn data_table(&self) -> DataTable {
        DataTable {
            cols: self
                .schema
                .columns()
                .iter()
                .map(|column| ColumnSpec::new(&column.id, &column.label, column.column_type))
                .collect(),
            rows: self.rows.clone(),
        }
    }

    /// Projection over this dataset; `None` selects every column in schema order.
    pub fn view(&self, selectors: Option<&[ColumnSelector]>) -> Result<TableView<'_>, ViewError> {
        TableView::project(self, selectors)
    }
}

/// Column definition as exposed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnSpec {
            id: id.into(),
            label: label.into(),
            column_type,
        }
    }
}

/// Ordered column definitions plus ordered typed rows.
///
/// Serializes as `{"cols": [...], "rows": [{"c": [{"v": ...}]}]}`. Date and
/// datetime cells are written as `"Date(2024, 0, 1)"` literals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub cols: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(cols: Vec<ColumnSpec>) -> Self {
        DataTable {
            cols,
            rows: Vec::new(),
        }
    }

    /// Appends a row; it must hold one value per column.
    pub fn add_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.cols.len());
        self.rows.push(row);
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.cols.iter().position(|col| col.id == id)
    }

    pub fn number_of_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn number_of_columns(&self) -> usize {
        self.cols.len()
    }
}

struct CellRef<'a> {
    v: &'a Value,
}

impl Serialize for CellRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Cell", 1)?;
        match date_literal(self.v) {
            Some(literal) => state.serialize_field("v", &literal)?,
            None => state.serialize_field("v", self.v)?,
        }
        state.end()
    }
}

/// Renderer date literal, `Date(year, month, day[, hour, minute, second])`
/// with a zero-based month.
fn date_literal(value: &Value) -> Option<String> {
    match value {
        Value::Date(date) => Some(format!(
            "Date({}, {}, {})",
            date.year(),
            date.month0(),
            date.day()
        )),
        Value::DateTime(timestamp) => Some(format!(
            "Date({}, {}, {}, {}, {}, {})",
            timestamp.year(),
            timestamp.month0(),
            timestamp.day(),
            timestamp.hour(),
            timestamp.minute(),
            timestamp.second()
        )),
        _ => None,
    }
}

#[derive(Serialize)]
struct RowRef<'a> {
    c: Vec<CellRef<'a>>,
}

impl Serialize for DataTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowRef<'_>> = self
            .rows
            .iter()
            .map(|row| RowRef {
                c: row.iter().map(|v| CellRef { v }).collect(),
            })
            .collect();
        let mut state = serializer.serialize_struct("DataTable", 2)?;
        state.serialize_field("cols", &self.cols)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}
