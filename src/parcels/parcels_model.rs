use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Add;
use uuid::Uuid;

use crate::temporal::{TemporalError, TemporalSeries};
use crate::utils::decimal_serde::*;

use super::parcels_errors::{ParcelError, Result};

/// Point-in-time properties of a parcel. `amount_paid` is the cash
/// outlay; `cost_base` is the tax cost base, which diverges from the
/// amount paid under returns of capital and cost-base adjustments.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParcelProperties {
    pub units: i64,
    #[serde(with = "decimal_serde")]
    pub amount_paid: Decimal,
    #[serde(with = "decimal_serde")]
    pub cost_base: Decimal,
}

impl Add for ParcelProperties {
    type Output = ParcelProperties;

    fn add(self, rhs: ParcelProperties) -> ParcelProperties {
        ParcelProperties {
            units: self.units + rhs.units,
            amount_paid: self.amount_paid + rhs.amount_paid,
            cost_base: self.cost_base + rhs.cost_base,
        }
    }
}

/// One audit record per change applied to a parcel. The log is ordered,
/// append-only, and never rewritten, even when the property series
/// coalesces several same-day changes into a single interval.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParcelAuditEntry {
    pub date: NaiveDate,
    pub unit_delta: i64,
    #[serde(with = "decimal_serde")]
    pub amount_delta: Decimal,
    #[serde(with = "decimal_serde")]
    pub cost_base_delta: Decimal,
    pub transaction_id: Uuid,
}

/// A tax lot: a distinct batch of units of a security acquired together,
/// tracked separately for capital-gains purposes.
///
/// The parcel's effective period is `[effective_from, effective_to)`;
/// `effective_to` stays `None` while the parcel is held. When units reach
/// zero the period closes at that date and the parcel becomes immutable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: Uuid,
    effective_from: NaiveDate,
    effective_to: Option<NaiveDate>,
    /// Used for CGT discount/indexation eligibility and for carrying
    /// original dates through rollover-relief transformations.
    pub acquisition_date: NaiveDate,
    properties: TemporalSeries<ParcelProperties>,
    audit_log: Vec<ParcelAuditEntry>,
}

impl Parcel {
    pub fn open(
        id: Uuid,
        effective_from: NaiveDate,
        acquisition_date: NaiveDate,
        units: i64,
        amount_paid: Decimal,
        cost_base: Decimal,
        transaction_id: Uuid,
    ) -> Result<Self> {
        if units < 0 {
            return Err(ParcelError::NegativeUnits {
                parcel_id: id,
                date: effective_from,
                units,
            });
        }
        if amount_paid < Decimal::ZERO {
            return Err(ParcelError::NegativeAmountPaid {
                parcel_id: id,
                date: effective_from,
                amount_paid,
            });
        }
        if cost_base < Decimal::ZERO {
            return Err(ParcelError::NegativeCostBase {
                parcel_id: id,
                date: effective_from,
                cost_base,
            });
        }

        let initial = ParcelProperties {
            units,
            amount_paid,
            cost_base,
        };
        debug!(
            "Opening parcel {} at {} with {} units (acquired {})",
            id, effective_from, units, acquisition_date
        );
        Ok(Parcel {
            id,
            effective_from,
            effective_to: None,
            acquisition_date,
            properties: TemporalSeries::new(effective_from, initial),
            audit_log: vec![ParcelAuditEntry {
                date: effective_from,
                unit_delta: units,
                amount_delta: amount_paid,
                cost_base_delta: cost_base,
                transaction_id,
            }],
        })
    }

    /// Applies a change effective at `date`, recording one audit entry.
    /// When the resulting unit count is zero the parcel closes at `date`.
    pub fn change(
        &mut self,
        date: NaiveDate,
        unit_delta: i64,
        amount_delta: Decimal,
        cost_base_delta: Decimal,
        transaction_id: Uuid,
    ) -> Result<ParcelProperties> {
        if let Some(closed_at) = self.effective_to {
            return Err(ParcelError::ParcelClosed {
                parcel_id: self.id,
                closed_at,
                date,
            });
        }
        if date < self.effective_from {
            return Err(ParcelError::EffectiveDate(TemporalError::BeforeStart {
                date,
                start: self.effective_from,
            }));
        }

        // Validate the prospective result before touching any state so a
        // failed change never partially applies.
        let current = self.properties.latest();
        let units = current.units + unit_delta;
        if units < 0 {
            return Err(ParcelError::NegativeUnits {
                parcel_id: self.id,
                date,
                units,
            });
        }
        // A zero-valued sum can carry a negative sign bit, so compare rather
        // than inspect the sign flag.
        let amount_paid = current.amount_paid + amount_delta;
        if amount_paid < Decimal::ZERO {
            return Err(ParcelError::NegativeAmountPaid {
                parcel_id: self.id,
                date,
                amount_paid,
            });
        }
        let cost_base = current.cost_base + cost_base_delta;
        if cost_base < Decimal::ZERO {
            return Err(ParcelError::NegativeCostBase {
                parcel_id: self.id,
                date,
                cost_base,
            });
        }

        let delta = ParcelProperties {
            units: unit_delta,
            amount_paid: amount_delta,
            cost_base: cost_base_delta,
        };
        let combined = self.properties.append(date, delta)?;
        self.audit_log.push(ParcelAuditEntry {
            date,
            unit_delta,
            amount_delta,
            cost_base_delta,
            transaction_id,
        });

        if combined.units == 0 {
            debug!("Parcel {} exhausted; closing at {}", self.id, date);
            self.effective_to = Some(date);
            self.properties.close(date);
        }
        Ok(combined)
    }

    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    /// `None` while the parcel is still held.
    pub fn effective_to(&self) -> Option<NaiveDate> {
        self.effective_to
    }

    pub fn is_closed(&self) -> bool {
        self.effective_to.is_some()
    }

    /// Whether the parcel's effective period contains `date`.
    pub fn is_open_at(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.map_or(true, |end| date < end)
    }

    pub fn properties_at(&self, date: NaiveDate) -> ParcelProperties {
        self.properties.value_at(date)
    }

    pub fn units_at(&self, date: NaiveDate) -> i64 {
        self.properties.value_at(date).units
    }

    pub(crate) fn property_series(&self) -> &TemporalSeries<ParcelProperties> {
        &self.properties
    }

    /// The ordered, append-only audit trail, for reporting.
    pub fn audit_log(&self) -> &[ParcelAuditEntry] {
        &self.audit_log
    }
}
