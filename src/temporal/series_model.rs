use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Add;

use super::temporal_errors::{Result, TemporalError};

/// Half-open date range `[start, end)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One interval of a series: the value holds from `effective_from` until
/// the start of the next interval (or indefinitely for the last one).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInterval<V> {
    pub effective_from: NaiveDate,
    pub value: V,
}

/// Append-only history of an additively-combinable value over contiguous,
/// non-overlapping date intervals.
///
/// Appending a delta at a date at or after the most recent interval's start
/// either merges into that interval (same-day changes accumulate) or closes
/// it and opens a new interval holding the cumulative value. Querying a
/// date before the first interval yields the type's default value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemporalSeries<V> {
    intervals: Vec<SeriesInterval<V>>,
    closed_at: Option<NaiveDate>,
}

impl<V> TemporalSeries<V>
where
    V: Copy + Default + Add<Output = V>,
{
    pub fn new(start: NaiveDate, initial: V) -> Self {
        TemporalSeries {
            intervals: vec![SeriesInterval {
                effective_from: start,
                value: initial,
            }],
            closed_at: None,
        }
    }

    /// Rebuilds a series from absolute values (not deltas). Points must be
    /// in strictly ascending date order; used by aggregate recomputation.
    pub(crate) fn from_totals(points: Vec<(NaiveDate, V)>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(TemporalSeries {
            intervals: points
                .into_iter()
                .map(|(effective_from, value)| SeriesInterval {
                    effective_from,
                    value,
                })
                .collect(),
            closed_at: None,
        })
    }

    pub fn start(&self) -> NaiveDate {
        // Non-empty by construction.
        self.intervals[0].effective_from
    }

    pub fn closed_at(&self) -> Option<NaiveDate> {
        self.closed_at
    }

    pub fn intervals(&self) -> &[SeriesInterval<V>] {
        &self.intervals
    }

    /// The value in effect at `date`, or the default value if `date`
    /// precedes the first interval.
    pub fn value_at(&self, date: NaiveDate) -> V {
        let idx = self.intervals.partition_point(|i| i.effective_from <= date);
        if idx == 0 {
            V::default()
        } else {
            self.intervals[idx - 1].value
        }
    }

    /// The value of the most recent interval.
    pub fn latest(&self) -> V {
        self.intervals[self.intervals.len() - 1].value
    }

    /// Applies `delta` effective at `date` and returns the cumulative value
    /// in effect from that date.
    pub fn append(&mut self, date: NaiveDate, delta: V) -> Result<V> {
        let start = self.start();
        if date < start {
            return Err(TemporalError::BeforeStart { date, start });
        }
        if let Some(closed_at) = self.closed_at {
            if date > closed_at {
                return Err(TemporalError::Closed { date, closed_at });
            }
        }

        let last_idx = self.intervals.len() - 1;
        let current = self.intervals[last_idx].effective_from;
        if date < current {
            return Err(TemporalError::BeforeCurrentInterval { date, current });
        }

        let combined = self.intervals[last_idx].value + delta;
        if date == current {
            // Same-day changes accumulate into one interval.
            self.intervals[last_idx].value = combined;
        } else {
            self.intervals.push(SeriesInterval {
                effective_from: date,
                value: combined,
            });
        }
        Ok(combined)
    }

    /// Marks the series closed at `date`; later appends are rejected.
    pub fn close(&mut self, date: NaiveDate) {
        self.closed_at = Some(date);
    }
}
