//! Taxlot Core - temporal ownership and tax-lot accounting engine.
//!
//! This crate tracks ownership of tradeable securities inside a portfolio
//! over time and computes the tax consequences (capital gains, franking
//! credits, dividend reinvestment) of every event affecting that ownership.
//! It is persistence-agnostic and fully synchronous; callers supply the
//! security resolver, price source, and gain-event listener through traits.

pub mod constants;
pub mod corporate_actions;
pub mod errors;
pub mod holdings;
pub mod ledger;
pub mod parcels;
pub mod portfolio;
pub mod returns;
pub mod securities;
pub mod temporal;
pub mod transactions;
pub mod utils;

// Re-export the common surface
pub use corporate_actions::{
    ActionError, CapitalReturnAction, CompositeAction, CorporateAction, DividendAction,
    ResultingSecurity, SplitAction, TransformationAction,
};
pub use holdings::{
    CgtEvent, CgtEventCollector, CgtMethod, GainListenerTrait, Holding, HoldingError,
    HoldingProperties,
};
pub use ledger::{CashLedger, LedgerEntry, LedgerEntryKind};
pub use parcels::{Parcel, ParcelAuditEntry, ParcelError, ParcelProperties};
pub use portfolio::{Portfolio, PortfolioError};
pub use returns::{internal_rate_of_return, CashFlow, ReturnsError};
pub use securities::{
    DrpMethod, DrpSettings, PriceSourceTrait, RoundingRule, Security, SecurityError,
    SecurityResolverTrait,
};
pub use temporal::{DateRange, SeriesInterval, TemporalError, TemporalSeries};
pub use transactions::{
    HandlerRegistry, Transaction, TransactionHandlerTrait, TransactionKind, TransactionPayload,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
