//! Sleep interval analytics.
//!
//! Sleep rows carry a start time and either an end time or an approximate
//! duration. The schema below derives the end, the midpoint, a day/night
//! classification and the calendar day the sleep belongs to. On top of the
//! resulting dataset, [`Sleeps`] groups intervals by day and summarises the
//! longest sleeps per day and type.

pub mod summary;

use crate::config::SleepConfig;
use crate::dataset::{DataTable, Dataset, TypedRecord};
use crate::error::Result;
use crate::raw::RawRecord;
use crate::schema::{ColumnSchema, ColumnType, PriorValues, Schema, SchemaError};
use crate::transformer::{epoch_millis, from_epoch_millis, parse_datetime, parse_number};
use crate::value::Value;
use crate::view::{RowPredicate, TableView, ViewError};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub use summary::{longest_durations, DurationSummary, SUMMARY_TOP_N};

/// Raw export fields.
pub const ID_FIELD: &str = "id";
pub const START_TIME_FIELD: &str = " Start Time";
pub const END_TIME_FIELD: &str = " End Time";
pub const DURATION_FIELD: &str = " Approximate Duration (Minutes)";
pub const NOTES_FIELD: &str = " Notes";

/// Column ids of the sleep schema, in schema order.
pub const ID: &str = "id";
pub const START: &str = "start";
pub const END: &str = "end";
pub const MID_TIME: &str = "midTime";
pub const NOTE: &str = "note";
pub const DURATION: &str = "duration";
pub const TYPE: &str = "type";
pub const DAY: &str = "day";

/// Day/night classification of a sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepType {
    #[serde(rename = "Day Nap")]
    DayNap,
    #[serde(rename = "Night Sleep")]
    NightSleep,
}

impl SleepType {
    /// Both types, in reporting order.
    pub const ALL: [SleepType; 2] = [SleepType::DayNap, SleepType::NightSleep];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepType::DayNap => "Day Nap",
            SleepType::NightSleep => "Night Sleep",
        }
    }

    /// Daytime spans `[boundary, boundary + 12)`.
    pub fn classify(hour: u32, day_night_hour: u32) -> Self {
        if hour >= day_night_hour && hour < day_night_hour + 12 {
            SleepType::DayNap
        } else {
            SleepType::NightSleep
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Day Nap" => Some(SleepType::DayNap),
            "Night Sleep" => Some(SleepType::NightSleep),
            _ => None,
        }
    }
}

impl fmt::Display for SleepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<SleepType> for Value {
    fn from(value: SleepType) -> Self {
        Value::String(value.as_str().to_string())
    }
}

/// Calendar day a sleep is attributed to.
///
/// Anything whose midpoint falls before the boundary hour belongs to the
/// previous evening.
pub fn attributed_day(mid_time: NaiveDateTime, day_night_hour: u32) -> Option<NaiveDate> {
    let date = mid_time.date();
    if mid_time.hour() < day_night_hour {
        date.pred_opt()
    } else {
        Some(date)
    }
}

/// Builds the sleep column schema for a boundary hour.
pub fn sleep_schema(config: SleepConfig) -> std::result::Result<Schema, SchemaError> {
    let day_night_hour = config.day_night_hour();

    Schema::new(vec![
        ColumnSchema::direct(ID, "id", ID_FIELD, ColumnType::Number),
        ColumnSchema::direct(START, "Start Time", START_TIME_FIELD, ColumnType::DateTime),
        ColumnSchema::derived(END, "End Time", ColumnType::DateTime, &[START], derive_end),
        ColumnSchema::derived(
            MID_TIME,
            "Mid Time",
            ColumnType::DateTime,
            &[START, END],
            derive_mid_time,
        ),
        ColumnSchema::direct(NOTE, "Note", NOTES_FIELD, ColumnType::String),
        ColumnSchema::direct(DURATION, "Duration", DURATION_FIELD, ColumnType::Number),
        ColumnSchema::derived(
            TYPE,
            "Type",
            ColumnType::String,
            &[MID_TIME],
            move |prior, _| match prior.get(MID_TIME).and_then(Value::as_datetime) {
                Some(mid) => SleepType::classify(mid.hour(), day_night_hour).into(),
                None => Value::Empty,
            },
        ),
        ColumnSchema::derived(
            DAY,
            "Day",
            ColumnType::Date,
            &[MID_TIME],
            move |prior, _| {
                prior
                    .get(MID_TIME)
                    .and_then(Value::as_datetime)
                    .and_then(|mid| attributed_day(mid, day_night_hour))
                    .map_or(Value::InvalidDate, Value::Date)
            },
        ),
    ])
}

/// End time: the raw end if exported, otherwise start plus the approximate
/// duration. The duration column is defined later, so it is read raw here.
fn derive_end(prior: &PriorValues<'_>, raw: &RawRecord) -> Value {
    if let Some(end) = raw.present(END_TIME_FIELD) {
        return parse_datetime(end).map_or(Value::InvalidDate, Value::DateTime);
    }

    let start = prior.get(START).and_then(Value::as_datetime);
    let minutes = raw.present(DURATION_FIELD).map(parse_number);
    match (start, minutes) {
        (Some(start), Some(minutes)) => {
            from_epoch_millis(epoch_millis(start) as f64 + minutes * 60_000.0)
                .map_or(Value::InvalidDate, Value::DateTime)
        }
        _ => Value::InvalidDate,
    }
}

fn derive_mid_time(prior: &PriorValues<'_>, _raw: &RawRecord) -> Value {
    let start = prior.get(START).and_then(Value::as_datetime);
    let end = prior.get(END).and_then(Value::as_datetime);
    match (start, end) {
        (Some(start), Some(end)) => {
            let mid = (epoch_millis(start) as f64 + epoch_millis(end) as f64) / 2.0;
            from_epoch_millis(mid).map_or(Value::InvalidDate, Value::DateTime)
        }
        _ => Value::InvalidDate,
    }
}

/// Typed form of one sleep row. Fields are `None` where the data was missing
/// or invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepInterval {
    pub id: Option<f64>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub mid_time: Option<NaiveDateTime>,
    pub note: Option<String>,
    pub duration: Option<f64>,
    #[serde(rename = "type")]
    pub sleep_type: Option<SleepType>,
    pub day: Option<NaiveDate>,
}

impl SleepInterval {
    pub fn from_record(record: &TypedRecord) -> Self {
        let get = |id: &str| record.get(id).unwrap_or(&Value::Empty);
        SleepInterval {
            id: get(ID).as_number().filter(|n| !n.is_nan()),
            start: get(START).as_datetime(),
            end: get(END).as_datetime(),
            mid_time: get(MID_TIME).as_datetime(),
            note: get(NOTE).as_str().map(str::to_string),
            duration: get(DURATION).as_number().filter(|n| !n.is_nan()),
            sleep_type: get(TYPE).as_str().and_then(SleepType::parse),
            day: get(DAY).as_date(),
        }
    }
}

/// Groups dataset rows by attributed day.
///
/// Buckets and their contents follow row encounter order. Rows without a
/// valid day are left out.
pub fn group_by_day(dataset: &Dataset) -> IndexMap<NaiveDate, Vec<SleepInterval>> {
    let mut buckets: IndexMap<NaiveDate, Vec<SleepInterval>> = IndexMap::new();

    for (row, record) in dataset.records().iter().enumerate() {
        let interval = SleepInterval::from_record(record);
        match interval.day {
            Some(day) => buckets.entry(day).or_default().push(interval),
            None => warn!(row, "Skipping sleep without a valid day"),
        }
    }

    debug!(days = buckets.len(), "Grouped sleeps by day");
    buckets
}

/// Sleep dataset plus the boundary it was classified with.
#[derive(Debug, Clone)]
pub struct Sleeps {
    dataset: Dataset,
    config: SleepConfig,
}

impl Sleeps {
    /// Transforms raw sleep rows.
    ///
    /// # Arguments
    /// * `records` - Raw sleep export rows
    /// * `config` - Day/night boundary used for `type` and `day`
    ///
    /// # Returns
    /// The typed sleep dataset with derived end, midpoint, type and day.
    ///
    /// # Errors
    /// Returns `Error::Schema` if the sleep schema fails validation.
    pub fn new(records: &[RawRecord], config: SleepConfig) -> Result<Self> {
        let schema = Arc::new(sleep_schema(config)?);
        Ok(Sleeps {
            dataset: Dataset::build(records, schema),
            config,
        })
    }

    /// Transforms raw sleep rows with an unvalidated boundary hour.
    ///
    /// # Errors
    /// Fails with an invalid-configuration error unless `0 <= hour < 12`.
    pub fn with_day_night_hour(records: &[RawRecord], day_night_hour: i64) -> Result<Self> {
        Self::new(records, SleepConfig::new(day_night_hour)?)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> SleepConfig {
        self.config
    }

    /// Every row in typed form.
    pub fn intervals(&self) -> Vec<SleepInterval> {
        self.dataset
            .records()
            .iter()
            .map(SleepInterval::from_record)
            .collect()
    }

    /// Intervals bucketed by attributed day, rebuilt on every call.
    pub fn sleeps_by_day(&self) -> IndexMap<NaiveDate, Vec<SleepInterval>> {
        group_by_day(&self.dataset)
    }

    /// Longest, second-longest and remainder per (day, type).
    pub fn longest_durations_summary(&self) -> Vec<DurationSummary> {
        summary::summarize(&self.sleeps_by_day())
    }

    /// Summary as a renderer table.
    pub fn longest_durations_table(&self) -> DataTable {
        summary::summary_table(&self.longest_durations_summary())
    }

    /// Full-width view restricted to daytime naps.
    pub fn naps(&self) -> std::result::Result<TableView<'_>, ViewError> {
        self.of_type(SleepType::DayNap)
    }

    /// Full-width view restricted to night sleeps.
    pub fn night_sleeps(&self) -> std::result::Result<TableView<'_>, ViewError> {
        self.of_type(SleepType::NightSleep)
    }

    fn of_type(&self, sleep_type: SleepType) -> std::result::Result<TableView<'_>, ViewError> {
        self.dataset
            .view(None)?
            .filter_rows(&[RowPredicate::new(TYPE, sleep_type)])
    }
}
