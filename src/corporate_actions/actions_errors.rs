use rust_decimal::Decimal;
use thiserror::Error;

use crate::securities::SecurityError;

pub type ActionResult<T> = std::result::Result<T, ActionError>;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Value error: a split ratio must have positive terms on both sides.
    #[error("invalid adjustment ratio {units_before}:{units_after}")]
    InvalidRatio { units_before: i64, units_after: i64 },

    /// Value error: reinvestment requires a positive plan price.
    #[error("invalid reinvestment price {price}")]
    InvalidDrpPrice { price: Decimal },
}
