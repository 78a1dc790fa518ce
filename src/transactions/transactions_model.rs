use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::holdings::CgtMethod;
use crate::utils::decimal_serde::*;

/// Tag identifying a primitive transaction kind, used for handler lookup.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    Acquisition,
    Disposal,
    OpeningBalance,
    ReturnOfCapital,
    IncomeReceived,
    UnitCountAdjustment,
    CostBaseAdjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Acquisition => "ACQUISITION",
            TransactionKind::Disposal => "DISPOSAL",
            TransactionKind::OpeningBalance => "OPENING_BALANCE",
            TransactionKind::ReturnOfCapital => "RETURN_OF_CAPITAL",
            TransactionKind::IncomeReceived => "INCOME_RECEIVED",
            TransactionKind::UnitCountAdjustment => "UNIT_COUNT_ADJUSTMENT",
            TransactionKind::CostBaseAdjustment => "COST_BASE_ADJUSTMENT",
        }
    }

    /// Kinds that reference an existing holding; the portfolio rejects
    /// them with a "no shares owned" error before any handler executes.
    pub fn requires_existing_holding(&self) -> bool {
        !matches!(
            self,
            TransactionKind::Acquisition | TransactionKind::OpeningBalance
        )
    }
}

/// Type-specific payload of a primitive transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransactionPayload {
    /// Purchase of new units; opens a parcel acquired on the transaction
    /// date and pays cash out of the portfolio ledger.
    Acquisition {
        units: i64,
        #[serde(with = "decimal_serde")]
        amount_paid: Decimal,
        #[serde(with = "decimal_serde")]
        cost_base: Decimal,
    },
    /// Sale of units, matched against parcels first-in-first-out unless a
    /// specific parcel is named. The CGT method is derived per parcel from
    /// its acquisition date unless pinned here.
    Disposal {
        units: i64,
        #[serde(with = "decimal_serde")]
        amount_received: Decimal,
        method: Option<CgtMethod>,
        parcel_id: Option<Uuid>,
    },
    /// Opens a parcel without a cash effect, carrying its own acquisition
    /// date; used for transfers in, transformations, and DRP issues.
    OpeningBalance {
        units: i64,
        #[serde(with = "decimal_serde")]
        amount_paid: Decimal,
        #[serde(with = "decimal_serde")]
        cost_base: Decimal,
        acquisition_date: NaiveDate,
    },
    /// Reduces cost base across held parcels; excess over a parcel's cost
    /// base realizes as an immediate gain.
    ReturnOfCapital {
        #[serde(with = "decimal_serde")]
        amount: Decimal,
        is_cash: bool,
    },
    /// Income components are the already-rounded totals for the holding.
    /// `is_cash` is false when the amount was reinvested under a DRP, in
    /// which case `drp_cash_balance` reports the residual cash balance
    /// carried forward.
    IncomeReceived {
        #[serde(with = "decimal_serde")]
        franked: Decimal,
        #[serde(with = "decimal_serde")]
        unfranked: Decimal,
        #[serde(with = "decimal_serde")]
        franking_credits: Decimal,
        #[serde(with = "decimal_serde")]
        interest: Decimal,
        #[serde(with = "decimal_serde")]
        tax_deferred: Decimal,
        is_cash: bool,
        #[serde(with = "decimal_serde")]
        drp_cash_balance: Decimal,
    },
    /// Split or consolidation: rescales unit counts by
    /// `units_after / units_before` with no cash or cost-base effect.
    UnitCountAdjustment { units_before: i64, units_after: i64 },
    /// Cost-base reduction apportioned across held parcels. A zero amount
    /// is a marker recording an event with no value effect.
    CostBaseAdjustment {
        #[serde(with = "decimal_serde")]
        amount: Decimal,
    },
}

impl TransactionPayload {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionPayload::Acquisition { .. } => TransactionKind::Acquisition,
            TransactionPayload::Disposal { .. } => TransactionKind::Disposal,
            TransactionPayload::OpeningBalance { .. } => TransactionKind::OpeningBalance,
            TransactionPayload::ReturnOfCapital { .. } => TransactionKind::ReturnOfCapital,
            TransactionPayload::IncomeReceived { .. } => TransactionKind::IncomeReceived,
            TransactionPayload::UnitCountAdjustment { .. } => TransactionKind::UnitCountAdjustment,
            TransactionPayload::CostBaseAdjustment { .. } => TransactionKind::CostBaseAdjustment,
        }
    }
}

/// A primitive ownership-changing transaction, uniquely identified and
/// dated at the day it takes effect.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub security_id: String,
    pub date: NaiveDate,
    pub payload: TransactionPayload,
}

impl Transaction {
    pub fn new(security_id: &str, date: NaiveDate, payload: TransactionPayload) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            security_id: security_id.to_string(),
            date,
            payload,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.payload.kind()
    }
}
