pub mod value;
pub mod raw;
pub mod schema;
pub mod transformer;
pub mod dataset;
pub mod view;
pub mod config;
pub mod error;
pub mod logging;
pub mod sleep;
pub mod feeds;
pub mod excretions;

pub use value::{RawValue, Value};
pub use raw::{read_csv, read_json, RawError, RawRecord};
pub use schema::{ColumnSchema, ColumnSource, ColumnType, DeriveFn, PriorValues, Schema, SchemaError};
pub use transformer::Transformer;
pub use dataset::{ColumnSpec, DataTable, Dataset, TypedRecord};
pub use view::{ColumnDirective, ColumnRef, ColumnSelector, RowPredicate, TableView, ViewError};
pub use config::{ConfigError, SleepConfig};
pub use error::{Error, Result};
pub use sleep::{
    group_by_day,
    longest_durations,
    sleep_schema,
    DurationSummary,
    SleepInterval,
    SleepType,
    Sleeps,
};
pub use feeds::{feed_schema, Feeds};
pub use excretions::{excretion_schema, Excretions};
