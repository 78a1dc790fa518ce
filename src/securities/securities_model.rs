use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::MONEY_SCALE;

/// How a security rounds cash amounts derived from per-unit rates
/// (dividends, capital returns) to the minor currency unit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundingRule {
    /// Round half away from zero to the minor currency unit.
    Round,
    /// Drop everything past the minor currency unit.
    Truncate,
}

impl RoundingRule {
    pub fn apply(&self, amount: Decimal) -> Decimal {
        match self {
            RoundingRule::Round => {
                amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
            }
            RoundingRule::Truncate => amount.trunc_with_scale(MONEY_SCALE),
        }
    }
}

/// How a dividend reinvestment plan converts a cash entitlement into
/// whole units at the plan price.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DrpMethod {
    RoundDown,
    RoundUp,
    RoundToNearest,
    /// Issue whole units only as far as the accumulated cash balance
    /// covers them; the fractional remainder carries forward.
    RetainCashBalance,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrpSettings {
    pub active: bool,
    pub method: DrpMethod,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub rounding_rule: RoundingRule,
    /// None when the security offers no dividend reinvestment plan.
    pub drp: Option<DrpSettings>,
}

impl Security {
    /// Whether the security currently operates an active DRP.
    pub fn drp_active(&self) -> bool {
        self.drp.map(|d| d.active).unwrap_or(false)
    }
}
