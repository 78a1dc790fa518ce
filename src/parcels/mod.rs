//! Tax parcels (lots): one acquisition batch of units with its own
//! cost-base history and append-only audit trail.

mod parcels_errors;
mod parcels_model;

pub use parcels_errors::*;
pub use parcels_model::*;
