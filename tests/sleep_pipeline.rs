use babytrack::logging;
use babytrack::sleep::{DAY, END, MID_TIME, TYPE};
use babytrack::{longest_durations, read_csv, SleepConfig, SleepType, Sleeps, Value};
use chrono::{NaiveDate, NaiveDateTime};

const EXPORT: &str = "\
id, Start Time, End Time, Approximate Duration (Minutes), Notes
1,2024-01-01 19:30,2024-01-02 02:30,420,went down easy
2,2024-01-02 03:00,,120,
3,2024-01-02 09:00,2024-01-02 10:30,90,car nap
4,2024-01-02 13:00,,45,
5,2024-01-02 16:00,,30,short
6,2024-01-02 20:00,,600,
";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sleeps() -> Sleeps {
    logging::init_test();
    let records = read_csv(EXPORT.as_bytes()).unwrap();
    Sleeps::new(&records, SleepConfig::default()).unwrap()
}

#[test]
fn row_count_is_preserved() {
    let sleeps = sleeps();
    assert_eq!(sleeps.dataset().len(), 6);
    assert!(sleeps
        .dataset()
        .rows()
        .iter()
        .all(|row| row.len() == sleeps.dataset().schema().len()));
}

#[test]
fn end_is_derived_from_approximate_duration() {
    let sleeps = sleeps();
    assert_eq!(
        sleeps.dataset().value(1, END).unwrap(),
        Some(&Value::DateTime(at(2024, 1, 2, 5, 0)))
    );
    assert_eq!(
        sleeps.dataset().value(1, MID_TIME).unwrap(),
        Some(&Value::DateTime(at(2024, 1, 2, 4, 0)))
    );
}

#[test]
fn night_sleep_past_midnight_belongs_to_previous_evening() {
    let sleeps = sleeps();
    // 19:30 -> 02:30 has its midpoint at 23:00 on Jan 1.
    assert_eq!(
        sleeps.dataset().value(0, DAY).unwrap(),
        Some(&Value::Date(date(2024, 1, 1)))
    );
    // 03:00 -> 05:00 has its midpoint at 04:00 on Jan 2, before the boundary.
    assert_eq!(
        sleeps.dataset().value(1, DAY).unwrap(),
        Some(&Value::Date(date(2024, 1, 1)))
    );
    assert_eq!(
        sleeps.dataset().value(1, TYPE).unwrap(),
        Some(&Value::from("Night Sleep"))
    );
}

#[test]
fn sleeps_are_grouped_by_attributed_day_in_encounter_order() {
    let sleeps = sleeps();
    let by_day = sleeps.sleeps_by_day();
    let days: Vec<_> = by_day.keys().copied().collect();
    assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2)]);

    let first: Vec<_> = by_day[&date(2024, 1, 1)].iter().map(|s| s.id).collect();
    assert_eq!(first, vec![Some(1.0), Some(2.0)]);
    let second: Vec<_> = by_day[&date(2024, 1, 2)].iter().map(|s| s.id).collect();
    assert_eq!(second, vec![Some(3.0), Some(4.0), Some(5.0), Some(6.0)]);
}

#[test]
fn grouping_is_deterministic() {
    let sleeps = sleeps();
    assert_eq!(sleeps.sleeps_by_day(), sleeps.sleeps_by_day());
}

#[test]
fn summary_has_one_row_per_day_and_type() {
    let sleeps = sleeps();
    let summary = sleeps.longest_durations_summary();
    assert_eq!(summary.len(), 4);

    let rows: Vec<_> = summary
        .iter()
        .map(|s| (s.day, s.sleep_type, s.longest, s.second_longest, s.remainder))
        .collect();
    assert_eq!(
        rows,
        vec![
            (date(2024, 1, 1), SleepType::DayNap, 0.0, 0.0, 0.0),
            (date(2024, 1, 1), SleepType::NightSleep, 420.0, 120.0, 0.0),
            (date(2024, 1, 2), SleepType::DayNap, 90.0, 45.0, 30.0),
            (date(2024, 1, 2), SleepType::NightSleep, 600.0, 0.0, 0.0),
        ]
    );

    let table = sleeps.longest_durations_table();
    assert_eq!(table.number_of_rows(), 4);
    assert_eq!(table.number_of_columns(), 5);
    assert_eq!(table.rows[2][1], Value::from("Day Nap"));
}

#[test]
fn naps_and_night_sleeps_partition_the_rows() {
    let sleeps = sleeps();
    let naps = sleeps.naps().unwrap();
    let nights = sleeps.night_sleeps().unwrap();
    assert_eq!(naps.row_indices(), vec![2, 3, 4]);
    assert_eq!(nights.row_indices(), vec![0, 1, 5]);
    assert_eq!(naps.number_of_columns(), sleeps.dataset().schema().len());
}

#[test]
fn classification_at_boundaries() {
    logging::init_test();
    let records: Vec<_> = [(6, 0, 8, 0), (7, 0, 9, 0), (19, 0, 20, 58), (19, 0, 21, 0)]
        .iter()
        .enumerate()
        .map(|(i, (sh, sm, eh, em))| {
            babytrack::RawRecord::new()
                .with("id", (i + 1) as f64)
                .with(" Start Time", at(2024, 5, 1, *sh, *sm).format("%Y-%m-%d %H:%M").to_string())
                .with(" End Time", at(2024, 5, 1, *eh, *em).format("%Y-%m-%d %H:%M").to_string())
        })
        .collect();
    let sleeps = Sleeps::new(&records, SleepConfig::default()).unwrap();
    let types: Vec<_> = sleeps.intervals().iter().map(|s| s.sleep_type).collect();
    // Midpoints: 07:00, 08:00, 19:59, 20:00.
    assert_eq!(
        types,
        vec![
            Some(SleepType::NightSleep),
            Some(SleepType::DayNap),
            Some(SleepType::DayNap),
            Some(SleepType::NightSleep),
        ]
    );
}

#[test]
fn longest_durations_examples() {
    assert_eq!(longest_durations(&[10.0, 30.0, 20.0], 2), vec![30.0, 20.0, 10.0]);
    assert_eq!(longest_durations(&[], 3), vec![0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn out_of_range_boundary_is_a_configuration_error() {
    let records = read_csv(EXPORT.as_bytes()).unwrap();
    let err = Sleeps::with_day_night_hour(&records, 12).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}
