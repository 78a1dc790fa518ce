use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Add;
use uuid::Uuid;

use crate::constants::{DISCOUNT_HOLDING_DAYS, INDEXATION_CUTOFF, MONEY_SCALE};
use crate::ledger::{CashLedger, LedgerEntryKind};
use crate::parcels::{Parcel, ParcelError};
use crate::temporal::{DateRange, TemporalSeries};
use crate::utils::decimal_serde::*;

use super::holdings_errors::{HoldingError, Result};
use super::holdings_traits::GainListenerTrait;

/// Capital-gains method applied to a realized gain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CgtMethod {
    /// Held longer than twelve months; the gain qualifies for the discount.
    Discount,
    /// Acquired on or before the indexation cutoff.
    Indexation,
    Other,
}

impl CgtMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CgtMethod::Discount => "DISCOUNT",
            CgtMethod::Indexation => "INDEXATION",
            CgtMethod::Other => "OTHER",
        }
    }

    /// Derives the method a disposal qualifies for from the parcel's
    /// acquisition date.
    pub fn for_dates(acquisition_date: NaiveDate, disposal_date: NaiveDate) -> CgtMethod {
        let cutoff =
            NaiveDate::parse_from_str(INDEXATION_CUTOFF, "%Y-%m-%d").unwrap_or(NaiveDate::MIN);
        if acquisition_date <= cutoff {
            CgtMethod::Indexation
        } else if disposal_date
            .signed_duration_since(acquisition_date)
            .num_days()
            >= DISCOUNT_HOLDING_DAYS
        {
            CgtMethod::Discount
        } else {
            CgtMethod::Other
        }
    }
}

/// A realized capital-gains event. Immutable once recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CgtEvent {
    pub date: NaiveDate,
    pub security_id: String,
    pub units: i64,
    #[serde(with = "decimal_serde")]
    pub amount_received: Decimal,
    #[serde(with = "decimal_serde")]
    pub capital_gain: Decimal,
    pub method: CgtMethod,
    pub transaction_id: Uuid,
}

/// Aggregate totals across all parcels of a holding at a date.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoldingProperties {
    pub total_units: i64,
    #[serde(with = "decimal_serde")]
    pub total_amount_paid: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_cost_base: Decimal,
}

impl Add for HoldingProperties {
    type Output = HoldingProperties;

    fn add(self, rhs: HoldingProperties) -> HoldingProperties {
        HoldingProperties {
            total_units: self.total_units + rhs.total_units,
            total_amount_paid: self.total_amount_paid + rhs.total_amount_paid,
            total_cost_base: self.total_cost_base + rhs.total_cost_base,
        }
    }
}

/// All parcels of one security, with derived aggregate totals, the DRP
/// participation flag, and the DRP cash sub-ledger.
///
/// Aggregate totals are a recomputed-on-write summary: after every parcel
/// mutation the property series is rebuilt by summation across parcels, so
/// totals at any date always equal the sum of parcel properties at that
/// date. Realized gains are delivered synchronously through the listener
/// passed into the mutating call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    security_id: String,
    parcels: Vec<Parcel>,
    properties: Option<TemporalSeries<HoldingProperties>>,
    drp_participating: bool,
    drp_ledger: CashLedger,
}

impl Holding {
    pub fn new(security_id: &str) -> Self {
        Holding {
            security_id: security_id.to_string(),
            parcels: Vec::new(),
            properties: None,
            drp_participating: false,
            drp_ledger: CashLedger::new(),
        }
    }

    pub fn security_id(&self) -> &str {
        &self.security_id
    }

    /// Creates a parcel and recomputes aggregate totals from its start
    /// forward. Returns the new parcel's id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_parcel(
        &mut self,
        effective_from: NaiveDate,
        acquisition_date: NaiveDate,
        units: i64,
        amount_paid: Decimal,
        cost_base: Decimal,
        transaction_id: Uuid,
    ) -> Result<Uuid> {
        let parcel_id = Uuid::new_v4();
        let parcel = Parcel::open(
            parcel_id,
            effective_from,
            acquisition_date,
            units,
            amount_paid,
            cost_base,
            transaction_id,
        )?;
        self.parcels.push(parcel);
        // Keep acquisition order for first-in-first-out relief.
        self.parcels.sort_by_key(|p| p.acquisition_date);
        self.recalculate_properties();
        Ok(parcel_id)
    }

    /// Reduces a parcel by `units_to_remove`, removing the proportional
    /// share of amount paid and cost base, and raises exactly one
    /// realized-gain event with the caller-specified gain and method.
    /// A full disposal closes the parcel.
    #[allow(clippy::too_many_arguments)]
    pub fn dispose_of_parcel(
        &mut self,
        parcel_id: Uuid,
        date: NaiveDate,
        units_to_remove: i64,
        amount_received: Decimal,
        capital_gain: Decimal,
        method: CgtMethod,
        transaction_id: Uuid,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        if units_to_remove <= 0 {
            return Err(HoldingError::NonPositiveUnits {
                units: units_to_remove,
            });
        }
        let parcel = self.parcel_mut(parcel_id)?;
        let current = parcel.properties_at(date);
        if units_to_remove > current.units {
            return Err(HoldingError::InsufficientUnits {
                parcel_id,
                date,
                requested: units_to_remove,
                available: current.units,
            });
        }

        let removed = Decimal::from(units_to_remove);
        let held = Decimal::from(current.units);
        let amount_share = (current.amount_paid * removed / held).round_dp(MONEY_SCALE);
        let cost_base_share = (current.cost_base * removed / held).round_dp(MONEY_SCALE);

        parcel.change(
            date,
            -units_to_remove,
            -amount_share,
            -cost_base_share,
            transaction_id,
        )?;
        self.recalculate_properties();

        let event = CgtEvent {
            date,
            security_id: self.security_id.clone(),
            units: units_to_remove,
            amount_received,
            capital_gain,
            method,
            transaction_id,
        };
        listener.on_gain_event(&self.security_id, &event);
        Ok(())
    }

    /// Sets a parcel's unit count with no cash or cost-base effect; used
    /// for splits and consolidations. Reaching zero closes the parcel
    /// without raising a gain event (there are no disposal proceeds).
    pub fn change_parcel_unit_count(
        &mut self,
        parcel_id: Uuid,
        date: NaiveDate,
        new_unit_count: i64,
        transaction_id: Uuid,
    ) -> Result<()> {
        if new_unit_count < 0 {
            return Err(HoldingError::Parcel(ParcelError::NegativeUnits {
                parcel_id,
                date,
                units: new_unit_count,
            }));
        }
        let parcel = self.parcel_mut(parcel_id)?;
        let delta = new_unit_count - parcel.properties_at(date).units;
        parcel.change(date, delta, Decimal::ZERO, Decimal::ZERO, transaction_id)?;
        self.recalculate_properties();
        Ok(())
    }

    /// Reduces a parcel's cost base, clamped to its current cost base.
    /// Any un-absorbed excess is an immediate realized gain of that
    /// excess, raised with the discount method.
    pub fn reduce_parcel_cost_base(
        &mut self,
        parcel_id: Uuid,
        date: NaiveDate,
        reduction: Decimal,
        transaction_id: Uuid,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        if reduction < Decimal::ZERO {
            return Err(HoldingError::NegativeReduction { amount: reduction });
        }
        let parcel = self.parcel_mut(parcel_id)?;
        let current = parcel.properties_at(date).cost_base;
        let applied = current.min(reduction);
        let excess = reduction - applied;

        parcel.change(date, 0, Decimal::ZERO, -applied, transaction_id)?;
        self.recalculate_properties();

        if excess > Decimal::ZERO {
            warn!(
                "Cost-base reduction of {} on parcel {} clamped at {}; {} realized as gain",
                reduction, parcel_id, applied, excess
            );
            let event = CgtEvent {
                date,
                security_id: self.security_id.clone(),
                units: 0,
                amount_received: excess,
                capital_gain: excess,
                method: CgtMethod::Discount,
                transaction_id,
            };
            listener.on_gain_event(&self.security_id, &event);
        }
        Ok(())
    }

    pub fn change_drp_participation(&mut self, participating: bool) {
        debug!(
            "Holding {}: DRP participation set to {}",
            self.security_id, participating
        );
        self.drp_participating = participating;
    }

    pub fn is_drp_participating(&self) -> bool {
        self.drp_participating
    }

    /// Adjusts the DRP cash sub-ledger, independent of parcel state.
    pub fn add_drp_cash_amount(&mut self, date: NaiveDate, amount: Decimal) {
        let kind = if amount.is_sign_negative() {
            LedgerEntryKind::Investment
        } else {
            LedgerEntryKind::Income
        };
        self.drp_ledger
            .add_entry(date, amount, "DRP cash balance", kind);
    }

    pub fn drp_cash_balance_at(&self, date: NaiveDate) -> Decimal {
        self.drp_ledger.balance_at(date)
    }

    pub fn drp_ledger(&self) -> &CashLedger {
        &self.drp_ledger
    }

    // --- Query surface ---

    pub fn properties_at(&self, date: NaiveDate) -> HoldingProperties {
        self.properties
            .as_ref()
            .map(|series| series.value_at(date))
            .unwrap_or_default()
    }

    pub fn units_at(&self, date: NaiveDate) -> i64 {
        self.properties_at(date).total_units
    }

    /// The date the holding came into existence, if any parcel exists.
    pub fn effective_from(&self) -> Option<NaiveDate> {
        self.parcels.iter().map(|p| p.effective_from()).min()
    }

    /// A holding is conceptually destroyed when total units return to
    /// zero; its history remains queryable.
    pub fn is_active_at(&self, date: NaiveDate) -> bool {
        self.units_at(date) > 0
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn parcel(&self, parcel_id: Uuid) -> Result<&Parcel> {
        self.parcels
            .iter()
            .find(|p| p.id == parcel_id)
            .ok_or(HoldingError::ParcelNotFound { parcel_id })
    }

    fn parcel_mut(&mut self, parcel_id: Uuid) -> Result<&mut Parcel> {
        self.parcels
            .iter_mut()
            .find(|p| p.id == parcel_id)
            .ok_or(HoldingError::ParcelNotFound { parcel_id })
    }

    /// Parcels held (open, with units) at `date`, in acquisition order.
    pub fn parcels_at(&self, date: NaiveDate) -> Vec<&Parcel> {
        self.parcels
            .iter()
            .filter(|p| p.is_open_at(date) && p.units_at(date) > 0)
            .collect()
    }

    /// Parcels whose effective period intersects `range`.
    pub fn parcels_in_range(&self, range: DateRange) -> Vec<&Parcel> {
        self.parcels
            .iter()
            .filter(|p| {
                p.effective_from() < range.end
                    && p.effective_to().map_or(true, |end| end > range.start)
            })
            .collect()
    }

    /// Market value at `date` for a given unit price.
    pub fn value_at(&self, date: NaiveDate, price: Decimal) -> Decimal {
        self.parcels_at(date)
            .iter()
            .map(|p| Decimal::from(p.units_at(date)) * price)
            .sum()
    }

    /// Rebuilds the aggregate series by summation across all parcels at
    /// every date any parcel changed.
    fn recalculate_properties(&mut self) {
        let dates: BTreeSet<NaiveDate> = self
            .parcels
            .iter()
            .flat_map(|p| {
                p.property_series()
                    .intervals()
                    .iter()
                    .map(|i| i.effective_from)
            })
            .collect();

        let points: Vec<(NaiveDate, HoldingProperties)> = dates
            .into_iter()
            .map(|date| {
                let total = self
                    .parcels
                    .iter()
                    .map(|p| {
                        let props = p.properties_at(date);
                        HoldingProperties {
                            total_units: props.units,
                            total_amount_paid: props.amount_paid,
                            total_cost_base: props.cost_base,
                        }
                    })
                    .fold(HoldingProperties::default(), |acc, p| acc + p);
                (date, total)
            })
            .collect();

        self.properties = TemporalSeries::from_totals(points);
    }
}
