use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::corporate_actions::ActionError;
use crate::holdings::HoldingError;
use crate::securities::SecurityError;
use crate::transactions::TransactionKind;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug)]
pub enum PortfolioError {
    /// Precondition: every transaction kind except an acquisition or an
    /// opening balance requires the security to already be held.
    #[error("no shares of {security_id} are owned")]
    NoSharesOwned { security_id: String },

    /// No handler is registered for the transaction's kind.
    #[error("no handler registered for {kind:?}")]
    NoHandler { kind: TransactionKind },

    /// A disposal requested more units than the holding contains.
    #[error(
        "not enough units of {security_id} at {date}: requested {requested}, held {available}"
    )]
    InsufficientUnits {
        security_id: String,
        date: NaiveDate,
        requested: i64,
        available: i64,
    },

    #[error("invalid transaction {transaction_id}: {reason}")]
    InvalidTransaction { transaction_id: Uuid, reason: String },

    #[error("holding error: {0}")]
    Holding(#[from] HoldingError),

    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    #[error("corporate action error: {0}")]
    Action(#[from] ActionError),
}
