//! Column schemas.
//!
//! A schema is an ordered list of [`ColumnSchema`] entries. Each entry either
//! coerces one raw field (`Direct`) or derives its value from columns that
//! appear earlier in the same schema (`Derived`). Order is fixed when the
//! [`Schema`] is built and dependencies are checked there, so a derivation can
//! never observe itself or a later column.

use crate::raw::RawRecord;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declared type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Number,
    String,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Untyped,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Untyped => "untyped",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derivation function: values computed so far for this row, plus the raw row.
pub type DeriveFn = Arc<dyn Fn(&PriorValues<'_>, &RawRecord) -> Value + Send + Sync>;

/// Where a column's value comes from.
#[derive(Clone)]
pub enum ColumnSource {
    /// Coerce `record[source_field]` according to the column type.
    Direct { source_field: String },
    /// Compute from earlier columns; the result is stored verbatim.
    Derived {
        depends_on: Vec<String>,
        derive: DeriveFn,
    },
}

impl fmt::Debug for ColumnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSource::Direct { source_field } => f
                .debug_struct("Direct")
                .field("source_field", source_field)
                .finish(),
            ColumnSource::Derived { depends_on, .. } => f
                .debug_struct("Derived")
                .field("depends_on", depends_on)
                .field("derive", &"<fn>")
                .finish(),
        }
    }
}

/// Static description of one output column.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub id: String,
    pub label: String,
    pub column_type: ColumnType,
    pub source: ColumnSource,
}

impl ColumnSchema {
    /// Column read straight from a raw field.
    pub fn direct(
        id: impl Into<String>,
        label: impl Into<String>,
        source_field: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        ColumnSchema {
            id: id.into(),
            label: label.into(),
            column_type,
            source: ColumnSource::Direct {
                source_field: source_field.into(),
            },
        }
    }

    /// Column computed from earlier columns.
    ///
    /// `depends_on` lists the ids the derivation reads through
    /// [`PriorValues::get`]; each must name a column defined before this one.
    pub fn derived<F>(
        id: impl Into<String>,
        label: impl Into<String>,
        column_type: ColumnType,
        depends_on: &[&str],
        derive: F,
    ) -> Self
    where
        F: Fn(&PriorValues<'_>, &RawRecord) -> Value + Send + Sync + 'static,
    {
        ColumnSchema {
            id: id.into(),
            label: label.into(),
            column_type,
            source: ColumnSource::Derived {
                depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
                derive: Arc::new(derive),
            },
        }
    }

    pub fn source_field(&self) -> Option<&str> {
        match &self.source {
            ColumnSource::Direct { source_field } => Some(source_field.as_str()),
            ColumnSource::Derived { .. } => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, ColumnSource::Derived { .. })
    }
}

/// Errors detected while assembling a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two columns share an id
    DuplicateColumn(String),
    /// A derivation depends on an id the schema does not define
    UnknownDependency { column: String, dependency: String },
    /// A derivation depends on a column defined after it
    ForwardDependency { column: String, dependency: String },
    /// A derivation depends on itself
    SelfDependency(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateColumn(id) => write!(f, "Duplicate column id: {}", id),
            SchemaError::UnknownDependency { column, dependency } => write!(
                f,
                "Column '{}' depends on unknown column '{}'",
                column, dependency
            ),
            SchemaError::ForwardDependency { column, dependency } => write!(
                f,
                "Column '{}' depends on later column '{}'",
                column, dependency
            ),
            SchemaError::SelfDependency(id) => write!(f, "Column '{}' depends on itself", id),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Validated, ordered column schema.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, checking id uniqueness and derivation ordering.
    pub fn new(columns: Vec<ColumnSchema>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.id.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn(column.id.clone()));
            }
        }

        for (position, column) in columns.iter().enumerate() {
            if let ColumnSource::Derived { depends_on, .. } = &column.source {
                for dependency in depends_on {
                    match index.get(dependency) {
                        None => {
                            return Err(SchemaError::UnknownDependency {
                                column: column.id.clone(),
                                dependency: dependency.clone(),
                            })
                        }
                        Some(&p) if p == position => {
                            return Err(SchemaError::SelfDependency(column.id.clone()))
                        }
                        Some(&p) if p > position => {
                            return Err(SchemaError::ForwardDependency {
                                column: column.id.clone(),
                                dependency: dependency.clone(),
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        Ok(Schema { columns, index })
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&ColumnSchema> {
        self.columns.get(position)
    }

    /// Position of a column id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Values already computed for the current row.
///
/// Only positions strictly before the column being derived are visible.
pub struct PriorValues<'a> {
    values: &'a [Value],
    schema: &'a Schema,
}

impl<'a> PriorValues<'a> {
    pub(crate) fn new(values: &'a [Value], schema: &'a Schema) -> Self {
        PriorValues { values, schema }
    }

    /// Value at a schema position, if that position has been computed.
    pub fn at(&self, position: usize) -> Option<&'a Value> {
        self.values.get(position)
    }

    /// Value of an earlier column by id.
    pub fn get(&self, id: &str) -> Option<&'a Value> {
        self.schema.position(id).and_then(|p| self.at(p))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [Value] {
        self.values
    }
}
