//! Read-only projections over a [`Dataset`].
//!
//! A view picks and orders columns (optionally adding computed ones) and can
//! restrict rows with equality predicates. Views borrow the dataset and never
//! copy or mutate its rows; column references are resolved once, when the view
//! is built.

use crate::dataset::{ColumnSpec, DataTable, Dataset};
use crate::schema::ColumnType;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Computes a view cell from the full dataset row.
pub type CalcFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Reference to a dataset column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Id(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(id: &str) -> Self {
        ColumnRef::Id(id.to_string())
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Id(id) => write!(f, "{}", id),
            ColumnRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// A column built by the view rather than taken as-is.
///
/// With only `source`, the source column is copied (relabelled if `label` is
/// set). With `calc`, the value is computed from the whole dataset row.
#[derive(Clone, Default)]
pub struct ColumnDirective {
    pub source: Option<ColumnRef>,
    pub id: Option<String>,
    pub label: Option<String>,
    pub column_type: Option<ColumnType>,
    pub calc: Option<CalcFn>,
}

impl ColumnDirective {
    /// Copy of a source column.
    pub fn source(source: impl Into<ColumnRef>) -> Self {
        ColumnDirective {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    /// Computed column.
    pub fn calc<F>(id: impl Into<String>, column_type: ColumnType, calc: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        ColumnDirective {
            id: Some(id.into()),
            column_type: Some(column_type),
            calc: Some(Arc::new(calc)),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Debug for ColumnDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDirective")
            .field("source", &self.source)
            .field("id", &self.id)
            .field("label", &self.label)
            .field("column_type", &self.column_type)
            .field("calc", &self.calc.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// One entry of a projection.
#[derive(Debug, Clone)]
pub enum ColumnSelector {
    Column(ColumnRef),
    Directive(ColumnDirective),
}

impl From<&str> for ColumnSelector {
    fn from(id: &str) -> Self {
        ColumnSelector::Column(ColumnRef::from(id))
    }
}

impl From<usize> for ColumnSelector {
    fn from(index: usize) -> Self {
        ColumnSelector::Column(ColumnRef::Index(index))
    }
}

impl From<ColumnDirective> for ColumnSelector {
    fn from(directive: ColumnDirective) -> Self {
        ColumnSelector::Directive(directive)
    }
}

/// Equality predicate used by [`TableView::filter_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowPredicate {
    pub column: ColumnRef,
    pub value: Value,
}

impl RowPredicate {
    pub fn new(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        RowPredicate {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Errors raised while resolving a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// No column with this id
    ColumnNotFound(String),
    /// Column index past the end
    ColumnIndexOutOfRange(usize),
    /// Directive without a source column or calc function
    InvalidDirective(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::ColumnNotFound(id) => write!(f, "Column not found: {}", id),
            ViewError::ColumnIndexOutOfRange(index) => {
                write!(f, "Column index out of range: {}", index)
            }
            ViewError::InvalidDirective(msg) => write!(f, "Invalid column directive: {}", msg),
        }
    }
}

impl std::error::Error for ViewError {}

#[derive(Clone)]
enum ViewColumn {
    Source(usize),
    Copy { spec: ColumnSpec, source: usize },
    Calculated { spec: ColumnSpec, calc: CalcFn },
}

/// Borrowed projection of a dataset, optionally restricted to a row subset.
#[derive(Clone)]
pub struct TableView<'a> {
    dataset: &'a Dataset,
    columns: Vec<ViewColumn>,
    rows: Option<Vec<usize>>,
}

impl<'a> TableView<'a> {
    /// Projects a dataset onto a list of columns.
    ///
    /// # Arguments
    /// * `dataset` - The dataset to borrow rows from
    /// * `selectors` - Column ids, indices or directives; `None` selects every
    ///   column in schema order
    ///
    /// # Returns
    /// A view over all dataset rows with the resolved columns.
    ///
    /// # Errors
    /// Returns `ViewError` if a selector names an unknown column, an index
    /// past the last column, or a directive with neither source nor calc.
    pub fn project(
        dataset: &'a Dataset,
        selectors: Option<&[ColumnSelector]>,
    ) -> Result<Self, ViewError> {
        let columns = match selectors {
            None => (0..dataset.schema().len()).map(ViewColumn::Source).collect(),
            Some(selectors) => selectors
                .iter()
                .map(|selector| resolve_selector(dataset, selector))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(TableView {
            dataset,
            columns,
            rows: None,
        })
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn number_of_rows(&self) -> usize {
        match &self.rows {
            Some(rows) => rows.len(),
            None => self.dataset.len(),
        }
    }

    /// Dataset row indices visible through this view, in view order.
    pub fn row_indices(&self) -> Vec<usize> {
        match &self.rows {
            Some(rows) => rows.clone(),
            None => (0..self.dataset.len()).collect(),
        }
    }

    /// Definition of a view column.
    pub fn column_spec(&self, column: usize) -> Option<ColumnSpec> {
        self.columns.get(column).map(|c| self.spec_of(c))
    }

    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns.iter().map(|c| self.spec_of(c)).collect()
    }

    /// Index of a view column by id.
    pub fn column_index(&self, id: &str) -> Result<usize, ViewError> {
        self.columns
            .iter()
            .position(|c| self.id_of(c) == Some(id))
            .ok_or_else(|| ViewError::ColumnNotFound(id.to_string()))
    }

    /// Cell at (view row, view column).
    pub fn value(&self, row: usize, column: usize) -> Option<Value> {
        let dataset_row = self.dataset_row(row)?;
        let column = self.columns.get(column)?;
        self.cell(dataset_row, column)
    }

    /// Every visible row, projected.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.row_indices()
            .into_iter()
            .filter_map(|row| self.project_row(row))
            .collect()
    }

    /// Dataset row indices (among the visible rows) where every predicate holds.
    pub fn get_filtered_rows(&self, predicates: &[RowPredicate]) -> Result<Vec<usize>, ViewError> {
        let resolved = predicates
            .iter()
            .map(|p| Ok((self.resolve_view_column(&p.column)?, &p.value)))
            .collect::<Result<Vec<_>, ViewError>>()?;

        Ok(self
            .row_indices()
            .into_iter()
            .filter(|&row| {
                let values = match self.dataset.row(row) {
                    Some(values) => values,
                    None => return false,
                };
                resolved.iter().all(|(column, expected)| {
                    self.cell(values, &self.columns[*column])
                        .map_or(false, |value| value == **expected)
                })
            })
            .collect())
    }

    /// New view over the same dataset keeping only rows matching every predicate.
    pub fn filter_rows(&self, predicates: &[RowPredicate]) -> Result<TableView<'a>, ViewError> {
        let rows = self.get_filtered_rows(predicates)?;
        Ok(TableView {
            dataset: self.dataset,
            columns: self.columns.clone(),
            rows: Some(rows),
        })
    }

    /// Copies the visible cells into a standalone table.
    pub fn to_data_table(&self) -> DataTable {
        DataTable {
            cols: self.column_specs(),
            rows: self.rows(),
        }
    }

    fn dataset_row(&self, row: usize) -> Option<&'a [Value]> {
        let index = match &self.rows {
            Some(rows) => *rows.get(row)?,
            None => row,
        };
        self.dataset.row(index)
    }

    fn project_row(&self, dataset_row: usize) -> Option<Vec<Value>> {
        let values = self.dataset.row(dataset_row)?;
        self.columns.iter().map(|c| self.cell(values, c)).collect()
    }

    fn cell(&self, values: &[Value], column: &ViewColumn) -> Option<Value> {
        match column {
            ViewColumn::Source(index) | ViewColumn::Copy { source: index, .. } => {
                values.get(*index).cloned()
            }
            ViewColumn::Calculated { calc, .. } => Some(calc(values)),
        }
    }

    fn spec_of(&self, column: &ViewColumn) -> ColumnSpec {
        match column {
            ViewColumn::Source(index) => match self.dataset.schema().column(*index) {
                Some(c) => ColumnSpec::new(&c.id, &c.label, c.column_type),
                None => ColumnSpec::new("", "", ColumnType::Untyped),
            },
            ViewColumn::Copy { spec, .. } | ViewColumn::Calculated { spec, .. } => spec.clone(),
        }
    }

    fn id_of<'b>(&'b self, column: &'b ViewColumn) -> Option<&'b str> {
        match column {
            ViewColumn::Source(index) => self.dataset.schema().column(*index).map(|c| c.id.as_str()),
            ViewColumn::Copy { spec, .. } | ViewColumn::Calculated { spec, .. } => {
                Some(spec.id.as_str())
            }
        }
    }

    fn resolve_view_column(&self, column: &ColumnRef) -> Result<usize, ViewError> {
        match column {
            ColumnRef::Id(id) => self.column_index(id),
            ColumnRef::Index(index) if *index < self.columns.len() => Ok(*index),
            ColumnRef::Index(index) => Err(ViewError::ColumnIndexOutOfRange(*index)),
        }
    }
}

impl fmt::Debug for TableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("columns", &self.column_specs())
            .field("rows", &self.row_indices())
            .finish()
    }
}

fn resolve_dataset_column(dataset: &Dataset, column: &ColumnRef) -> Result<usize, ViewError> {
    match column {
        ColumnRef::Id(id) => dataset.column_index(id),
        ColumnRef::Index(index) if *index < dataset.schema().len() => Ok(*index),
        ColumnRef::Index(index) => Err(ViewError::ColumnIndexOutOfRange(*index)),
    }
}

fn resolve_selector(dataset: &Dataset, selector: &ColumnSelector) -> Result<ViewColumn, ViewError> {
    match selector {
        ColumnSelector::Column(column) => {
            resolve_dataset_column(dataset, column).map(ViewColumn::Source)
        }
        ColumnSelector::Directive(directive) => {
            let source = directive
                .source
                .as_ref()
                .map(|column| resolve_dataset_column(dataset, column))
                .transpose()?;
            let source_schema = source.and_then(|index| dataset.schema().column(index));

            let id = directive
                .id
                .clone()
                .or_else(|| source_schema.map(|c| c.id.clone()))
                .unwrap_or_default();
            let label = directive
                .label
                .clone()
                .or_else(|| source_schema.map(|c| c.label.clone()))
                .unwrap_or_else(|| id.clone());
            let column_type = directive
                .column_type
                .or_else(|| source_schema.map(|c| c.column_type))
                .unwrap_or(ColumnType::Untyped);
            let spec = ColumnSpec::new(id, label, column_type);

            match (&directive.calc, source) {
                (Some(calc), _) => Ok(ViewColumn::Calculated {
                    spec,
                    calc: Arc::clone(calc),
                }),
                (None, Some(source)) => Ok(ViewColumn::Copy { spec, source }),
                (None, None) => Err(ViewError::InvalidDirective(
                    "directive needs a source column or a calc function".to_string(),
                )),
            }
        }
    }
}
