//! Temporal property series - append-only history of a value over
//! contiguous, non-overlapping date intervals.

mod series_model;
mod temporal_errors;

pub use series_model::*;
pub use temporal_errors::*;

#[cfg(test)]
mod series_model_tests;
