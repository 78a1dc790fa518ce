//! Corporate actions: declarative descriptions of issuer events that
//! expand into primitive transactions against the holdings they affect.

mod actions_errors;
mod actions_model;
mod engine;

pub use actions_errors::*;
pub use actions_model::*;

#[cfg(test)]
mod engine_tests;
