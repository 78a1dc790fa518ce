//! Primitive transactions and their handlers. Every ownership-changing
//! event in a portfolio is expressed as one of these transaction kinds;
//! each kind has exactly one handler, resolved through a registry.

mod handlers;
mod transactions_model;

pub use handlers::*;
pub use transactions_model::*;
