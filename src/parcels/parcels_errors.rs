use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::temporal::TemporalError;

pub type Result<T> = std::result::Result<T, ParcelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParcelError {
    /// Structural: mutation outside the parcel's valid temporal window.
    #[error("effective-date violation: {0}")]
    EffectiveDate(#[from] TemporalError),

    /// Structural: the parcel closed when its units reached zero and is
    /// immutable from that date on.
    #[error("parcel {parcel_id} closed at {closed_at}; cannot change at {date}")]
    ParcelClosed {
        parcel_id: Uuid,
        closed_at: NaiveDate,
        date: NaiveDate,
    },

    /// Value error: caller-supplied delta would drive units negative.
    #[error("change at {date} would leave parcel {parcel_id} with {units} units")]
    NegativeUnits {
        parcel_id: Uuid,
        date: NaiveDate,
        units: i64,
    },

    /// Value error: caller-supplied delta would drive the cost base negative.
    #[error("change at {date} would leave parcel {parcel_id} with cost base {cost_base}")]
    NegativeCostBase {
        parcel_id: Uuid,
        date: NaiveDate,
        cost_base: Decimal,
    },

    /// Value error: caller-supplied delta would drive the amount paid negative.
    #[error("change at {date} would leave parcel {parcel_id} with amount paid {amount_paid}")]
    NegativeAmountPaid {
        parcel_id: Uuid,
        date: NaiveDate,
        amount_paid: Decimal,
    },
}
