use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecurityError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("security not found: {0}")]
    NotFound(String),

    #[error("no price available for security {security_id} on {date}")]
    PriceUnavailable { security_id: String, date: NaiveDate },
}
