//! Effective-dated cash ledger with derived running balances.

mod ledger_model;

pub use ledger_model::*;
