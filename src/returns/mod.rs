//! Money-weighted return over a dated cash-flow series.

mod returns_errors;
mod returns_model;

pub use returns_errors::*;
pub use returns_model::*;

#[cfg(test)]
mod returns_model_tests;
