use thiserror::Error;

use crate::corporate_actions::ActionError;
use crate::holdings::HoldingError;
use crate::parcels::ParcelError;
use crate::portfolio::PortfolioError;
use crate::returns::ReturnsError;
use crate::securities::SecurityError;
use crate::temporal::TemporalError;

/// Convenience alias for callers working across module boundaries.
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error aggregating every module's error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("parcel error: {0}")]
    Parcel(#[from] ParcelError),

    #[error("holding error: {0}")]
    Holding(#[from] HoldingError),

    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    #[error("corporate action error: {0}")]
    Action(#[from] ActionError),

    #[error("portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("returns error: {0}")]
    Returns(#[from] ReturnsError),
}
