use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::decimal_serde::*;

/// Pro-rata return of capital paid on a set date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalReturnAction {
    pub id: Uuid,
    pub security_id: String,
    pub announcement_date: NaiveDate,
    pub description: String,
    pub applied: bool,
    pub payment_date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub amount_per_unit: Decimal,
    pub is_cash: bool,
}

/// Dividend or distribution, with per-unit component amounts and an
/// optional reinvestment price for holders in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendAction {
    pub id: Uuid,
    pub security_id: String,
    pub announcement_date: NaiveDate,
    pub description: String,
    pub applied: bool,
    pub payment_date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub franked_per_unit: Decimal,
    #[serde(with = "decimal_serde")]
    pub unfranked_per_unit: Decimal,
    #[serde(with = "decimal_serde")]
    pub franking_credits_per_unit: Decimal,
    #[serde(with = "decimal_serde")]
    pub interest_per_unit: Decimal,
    #[serde(with = "decimal_serde")]
    pub tax_deferred_per_unit: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub drp_price: Option<Decimal>,
}

/// Split or consolidation expressed as a before:after unit ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAction {
    pub id: Uuid,
    pub security_id: String,
    pub announcement_date: NaiveDate,
    pub description: String,
    pub applied: bool,
    pub adjustment_date: NaiveDate,
    pub units_before: i64,
    pub units_after: i64,
}

/// One security issued by a transformation, with the unit ratio and the
/// fraction of original cost base it carries away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultingSecurity {
    pub security_id: String,
    #[serde(with = "decimal_serde")]
    pub units_per_original_unit: Decimal,
    #[serde(with = "decimal_serde")]
    pub cost_base_fraction: Decimal,
}

/// Merger, demerger or takeover: the original security transforms into
/// one or more resulting securities, optionally with a cash component
/// and optionally under rollover relief.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationAction {
    pub id: Uuid,
    pub security_id: String,
    pub announcement_date: NaiveDate,
    pub description: String,
    pub applied: bool,
    pub implementation_date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub cash_per_unit: Decimal,
    pub rollover_relief: bool,
    pub resulting_securities: Vec<ResultingSecurity>,
}

/// Ordered group of child actions applied as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAction {
    pub id: Uuid,
    pub security_id: String,
    pub announcement_date: NaiveDate,
    pub description: String,
    pub children: Vec<CorporateAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CorporateAction {
    CapitalReturn(CapitalReturnAction),
    Dividend(DividendAction),
    Split(SplitAction),
    Transformation(TransformationAction),
    Composite(CompositeAction),
}

impl CorporateAction {
    pub fn id(&self) -> Uuid {
        match self {
            CorporateAction::CapitalReturn(a) => a.id,
            CorporateAction::Dividend(a) => a.id,
            CorporateAction::Split(a) => a.id,
            CorporateAction::Transformation(a) => a.id,
            CorporateAction::Composite(a) => a.id,
        }
    }

    pub fn security_id(&self) -> &str {
        match self {
            CorporateAction::CapitalReturn(a) => &a.security_id,
            CorporateAction::Dividend(a) => &a.security_id,
            CorporateAction::Split(a) => &a.security_id,
            CorporateAction::Transformation(a) => &a.security_id,
            CorporateAction::Composite(a) => &a.security_id,
        }
    }

    pub fn announcement_date(&self) -> NaiveDate {
        match self {
            CorporateAction::CapitalReturn(a) => a.announcement_date,
            CorporateAction::Dividend(a) => a.announcement_date,
            CorporateAction::Split(a) => a.announcement_date,
            CorporateAction::Transformation(a) => a.announcement_date,
            CorporateAction::Composite(a) => a.announcement_date,
        }
    }

    /// A composite counts as applied only once every child does.
    pub fn has_been_applied(&self) -> bool {
        match self {
            CorporateAction::CapitalReturn(a) => a.applied,
            CorporateAction::Dividend(a) => a.applied,
            CorporateAction::Split(a) => a.applied,
            CorporateAction::Transformation(a) => a.applied,
            CorporateAction::Composite(a) => a.children.iter().all(|c| c.has_been_applied()),
        }
    }

    pub fn mark_applied(&mut self) {
        match self {
            CorporateAction::CapitalReturn(a) => a.applied = true,
            CorporateAction::Dividend(a) => a.applied = true,
            CorporateAction::Split(a) => a.applied = true,
            CorporateAction::Transformation(a) => a.applied = true,
            CorporateAction::Composite(a) => {
                for child in &mut a.children {
                    child.mark_applied();
                }
            }
        }
    }
}
