//! Longest-duration summaries per day and sleep type.

use super::{SleepInterval, SleepType};
use crate::dataset::{ColumnSpec, DataTable};
use crate::schema::ColumnType;
use crate::value::Value;
use chrono::NaiveDate;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::warn;

/// Number of ranked durations in the summary table.
pub const SUMMARY_TOP_N: usize = 2;

/// Returns the `n` longest durations followed by the sum of the rest.
///
/// The result always has `n + 1` elements; missing top slots are `0`. Ties
/// keep their input order. `NaN` durations are ignored.
pub fn longest_durations(durations: &[f64], n: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = durations.iter().copied().filter(|d| !d.is_nan()).collect();
    if sorted.len() != durations.len() {
        warn!(
            dropped = durations.len() - sorted.len(),
            "Ignoring NaN durations"
        );
    }

    sorted.sort_by(|a, b| OrderedFloat(*b).cmp(&OrderedFloat(*a)));

    let split = n.min(sorted.len());
    // Float `sum` starts at -0.0; an empty tail must stay +0.
    let remainder = sorted[split..].iter().fold(0.0, |acc, d| acc + d);

    let mut result = Vec::with_capacity(n + 1);
    result.extend_from_slice(&sorted[..split]);
    result.resize(n, 0.0);
    result.push(remainder);
    result
}

/// One row of the day/type summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSummary {
    pub day: NaiveDate,
    #[serde(rename = "type")]
    pub sleep_type: SleepType,
    pub longest: f64,
    pub second_longest: f64,
    pub remainder: f64,
}

impl DurationSummary {
    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Date(self.day),
            self.sleep_type.into(),
            Value::Number(self.longest),
            Value::Number(self.second_longest),
            Value::Number(self.remainder),
        ]
    }
}

/// Summarises each day bucket, `Day Nap` before `Night Sleep`.
pub fn summarize(by_day: &IndexMap<NaiveDate, Vec<SleepInterval>>) -> Vec<DurationSummary> {
    let mut summaries = Vec::with_capacity(by_day.len() * SleepType::ALL.len());

    for (day, intervals) in by_day {
        for sleep_type in SleepType::ALL {
            let durations: Vec<f64> = intervals
                .iter()
                .filter(|interval| interval.sleep_type == Some(sleep_type))
                .filter_map(|interval| interval.duration)
                .collect();
            let ranked = longest_durations(&durations, SUMMARY_TOP_N);
            summaries.push(DurationSummary {
                day: *day,
                sleep_type,
                longest: ranked[0],
                second_longest: ranked[1],
                remainder: ranked[2],
            });
        }
    }

    summaries
}

/// Column definitions of the summary table.
pub fn summary_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("day", "Day", ColumnType::Date),
        ColumnSpec::new("type", "Type", ColumnType::String),
        ColumnSpec::new("longest", "Longest", ColumnType::Number),
        ColumnSpec::new("secondLongest", "Second Longest", ColumnType::Number),
        ColumnSpec::new("remainder", "Remainder", ColumnType::Number),
    ]
}

pub fn summary_table(summaries: &[DurationSummary]) -> DataTable {
    let mut table = DataTable::new(summary_columns());
    for summary in summaries {
        table.add_row(summary.to_row());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(day: NaiveDate, sleep_type: SleepType, minutes: f64) -> SleepInterval {
        SleepInterval {
            id: None,
            start: None,
            end: None,
            mid_time: None,
            note: None,
            duration: Some(minutes),
            sleep_type: Some(sleep_type),
            day: Some(day),
        }
    }

    #[test]
    fn test_longest_durations_basic() {
        assert_eq!(longest_durations(&[10.0, 30.0, 20.0], 2), vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_longest_durations_sums_remainder() {
        assert_eq!(
            longest_durations(&[5.0, 60.0, 15.0, 45.0, 10.0], 2),
            vec![60.0, 45.0, 30.0]
        );
    }

    #[test]
    fn test_longest_durations_pads_with_zero() {
        assert_eq!(longest_durations(&[], 2), vec![0.0, 0.0, 0.0]);
        assert_eq!(longest_durations(&[40.0], 2), vec![40.0, 0.0, 0.0]);
        assert_eq!(longest_durations(&[], 0), vec![0.0]);
    }

    #[test]
    fn test_empty_remainder_is_positive_zero() {
        for durations in [&[][..], &[40.0][..], &[40.0, 30.0][..]] {
            let result = longest_durations(durations, 2);
            assert!(!result[2].is_sign_negative(), "{:?}", result);
        }
        let json = serde_json::to_string(&longest_durations(&[], 2)).unwrap();
        assert_eq!(json, "[0.0,0.0,0.0]");
    }

    #[test]
    fn test_longest_durations_length_is_n_plus_one() {
        let durations = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        for n in 0..12 {
            assert_eq!(longest_durations(&durations, n).len(), n + 1);
        }
    }

    #[test]
    fn test_longest_durations_skips_nan() {
        assert_eq!(
            longest_durations(&[f64::NAN, 20.0, 10.0, 5.0], 2),
            vec![20.0, 10.0, 5.0]
        );
    }

    #[test]
    fn test_summarize_orders_types_within_day() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut by_day = IndexMap::new();
        by_day.insert(
            d1,
            vec![
                interval(d1, SleepType::NightSleep, 300.0),
                interval(d1, SleepType::DayNap, 45.0),
                interval(d1, SleepType::DayNap, 90.0),
                interval(d1, SleepType::DayNap, 30.0),
            ],
        );
        by_day.insert(d0, vec![interval(d0, SleepType::DayNap, 20.0)]);

        let summaries = summarize(&by_day);
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0].day, d1);
        assert_eq!(summaries[0].sleep_type, SleepType::DayNap);
        assert_eq!(
            (summaries[0].longest, summaries[0].second_longest, summaries[0].remainder),
            (90.0, 45.0, 30.0)
        );
        assert_eq!(summaries[1].sleep_type, SleepType::NightSleep);
        assert_eq!(summaries[1].longest, 300.0);
        assert_eq!(summaries[2].day, d0);
        assert_eq!(summaries[3].longest, 0.0);
    }

    #[test]
    fn test_summary_table_columns_and_json() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let table = summary_table(&[DurationSummary {
            day,
            sleep_type: SleepType::DayNap,
            longest: 60.0,
            second_longest: 0.0,
            remainder: 0.0,
        }]);
        let ids: Vec<_> = table.cols.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["day", "type", "longest", "secondLongest", "remainder"]);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json["rows"][0]["c"],
            serde_json::json!([
                {"v": "Date(2024, 0, 1)"},
                {"v": "Day Nap"},
                {"v": 60.0},
                {"v": 0.0},
                {"v": 0.0}
            ])
        );
    }

    #[test]
    fn test_duration_summary_serializes_camel_case() {
        let summary = DurationSummary {
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            sleep_type: SleepType::NightSleep,
            longest: 1.0,
            second_longest: 2.0,
            remainder: 3.0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "Night Sleep");
        assert_eq!(json["secondLongest"], 2.0);
    }
}
