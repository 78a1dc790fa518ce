//! Security reference data: rounding rules, dividend-reinvestment-plan
//! configuration, and the resolver/price capabilities supplied by callers.

mod securities_errors;
mod securities_model;
mod securities_traits;

pub use securities_errors::*;
pub use securities_model::*;
pub use securities_traits::*;
