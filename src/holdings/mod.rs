//! Holdings: all parcels of one security, aggregate point-in-time totals,
//! realized-gain dispatch, and the dividend-reinvestment sub-ledger.

mod holdings_errors;
mod holdings_model;
mod holdings_traits;

pub use holdings_errors::*;
pub use holdings_model::*;
pub use holdings_traits::*;
