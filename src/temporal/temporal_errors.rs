use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemporalError>;

/// Structural effective-date errors. These indicate a caller sequencing
/// bug, never bad user input: the mutation was requested outside the
/// window in which the series represents a live entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("effective date {date} precedes the series start {start}")]
    BeforeStart { date: NaiveDate, start: NaiveDate },

    #[error("effective date {date} precedes the most recent interval starting {current}")]
    BeforeCurrentInterval { date: NaiveDate, current: NaiveDate },

    #[error("series closed at {closed_at}; nothing can take effect at {date}")]
    Closed {
        date: NaiveDate,
        closed_at: NaiveDate,
    },
}
