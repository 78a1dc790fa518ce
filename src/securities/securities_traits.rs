use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::securities_errors::Result;
use super::securities_model::Security;

/// Capability to look up a security's reference data (rounding rule, DRP
/// configuration). Consumed by the corporate action engine and portfolio
/// operations; supplied externally.
pub trait SecurityResolverTrait: Send + Sync {
    fn get_security(&self, security_id: &str) -> Result<Security>;
}

/// Capability to look up a security's price on a date. Consumed for
/// holding valuation; supplied externally.
pub trait PriceSourceTrait: Send + Sync {
    fn get_price(&self, security_id: &str, date: NaiveDate) -> Result<Decimal>;
}
