use super::*;
use chrono::NaiveDate;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn value_before_first_interval_is_default() {
    let series = TemporalSeries::new(d("2020-01-10"), 100i64);
    assert_eq!(series.value_at(d("2020-01-09")), 0);
    assert_eq!(series.value_at(d("2020-01-10")), 100);
}

#[test]
fn value_at_interval_start_is_that_interval() {
    let mut series = TemporalSeries::new(d("2020-01-10"), 100i64);
    series.append(d("2020-02-01"), 50).unwrap();
    assert_eq!(series.value_at(d("2020-01-31")), 100);
    assert_eq!(series.value_at(d("2020-02-01")), 150);
    assert_eq!(series.value_at(d("2020-03-01")), 150);
}

#[test]
fn same_day_appends_accumulate_into_one_interval() {
    let mut series = TemporalSeries::new(d("2020-01-10"), 100i64);
    series.append(d("2020-02-01"), 50).unwrap();
    series.append(d("2020-02-01"), 25).unwrap();
    assert_eq!(series.intervals().len(), 2);
    assert_eq!(series.value_at(d("2020-02-01")), 175);
}

#[test]
fn append_before_start_is_rejected() {
    let mut series = TemporalSeries::new(d("2020-01-10"), 100i64);
    let err = series.append(d("2020-01-01"), 1).unwrap_err();
    assert_eq!(
        err,
        TemporalError::BeforeStart {
            date: d("2020-01-01"),
            start: d("2020-01-10"),
        }
    );
}

#[test]
fn append_before_current_interval_is_rejected() {
    let mut series = TemporalSeries::new(d("2020-01-10"), 100i64);
    series.append(d("2020-03-01"), 10).unwrap();
    let err = series.append(d("2020-02-01"), 10).unwrap_err();
    assert_eq!(
        err,
        TemporalError::BeforeCurrentInterval {
            date: d("2020-02-01"),
            current: d("2020-03-01"),
        }
    );
}

#[test]
fn append_after_close_is_rejected() {
    let mut series = TemporalSeries::new(d("2020-01-10"), 100i64);
    series.append(d("2020-03-01"), -100).unwrap();
    series.close(d("2020-03-01"));
    let err = series.append(d("2020-04-01"), 10).unwrap_err();
    assert_eq!(
        err,
        TemporalError::Closed {
            date: d("2020-04-01"),
            closed_at: d("2020-03-01"),
        }
    );
    // Queries after the close still work and see the final value.
    assert_eq!(series.value_at(d("2020-06-01")), 0);
}

#[test]
fn date_range_is_half_open() {
    let range = DateRange::new(d("2020-01-01"), d("2020-02-01"));
    assert!(range.contains(d("2020-01-01")));
    assert!(range.contains(d("2020-01-31")));
    assert!(!range.contains(d("2020-02-01")));
    assert!(!range.is_empty());
    assert!(DateRange::new(d("2020-01-01"), d("2020-01-01")).is_empty());
}
