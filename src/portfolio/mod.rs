//! Portfolio: the top-level aggregate. Routes transactions to handlers,
//! expands corporate actions into transactions, and owns the cash ledger
//! and the per-security holdings.

mod portfolio_errors;
mod portfolio_model;

pub use portfolio_errors::*;
pub use portfolio_model::*;
