use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::parcels::ParcelError;

pub type Result<T> = std::result::Result<T, HoldingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoldingError {
    /// Structural: the referenced parcel does not exist in this holding.
    #[error("parcel not found: {parcel_id}")]
    ParcelNotFound { parcel_id: Uuid },

    /// Disposal request exceeds the parcel's contents. Distinct from
    /// generic value errors so callers can offer a specific remedy.
    #[error(
        "not enough units in parcel {parcel_id} at {date}: requested {requested}, held {available}"
    )]
    InsufficientUnits {
        parcel_id: Uuid,
        date: NaiveDate,
        requested: i64,
        available: i64,
    },

    /// Value error: a disposal must remove a positive number of units.
    #[error("units to remove must be positive, got {units}")]
    NonPositiveUnits { units: i64 },

    /// Value error: cost-base reductions cannot be negative.
    #[error("cost-base reduction must not be negative, got {amount}")]
    NegativeReduction { amount: Decimal },

    #[error("parcel error: {0}")]
    Parcel(#[from] ParcelError),
}
