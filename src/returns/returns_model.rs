use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::*;

use super::returns_errors::{Result, ReturnsError};

const MAX_ITERATIONS: u32 = 200;
const TOLERANCE: f64 = 1e-9;
const RATE_LOWER_BOUND: f64 = -0.999_9;
const RATE_UPPER_BOUND: f64 = 10.0;

/// One dated flow: negative amounts are money put in, positive amounts
/// are money taken out (or the closing valuation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
}

/// Annualized internal rate of return of the series, solved by bisection
/// on the net present value. The solver works in `f64`; the exact-decimal
/// guarantees of the accounting engine do not extend to this rate.
pub fn internal_rate_of_return(flows: &[CashFlow]) -> Result<Decimal> {
    if flows.len() < 2 {
        return Err(ReturnsError::InsufficientData);
    }
    let has_inflow = flows.iter().any(|f| f.amount < Decimal::ZERO);
    let has_outflow = flows.iter().any(|f| f.amount > Decimal::ZERO);
    if !has_inflow || !has_outflow {
        return Err(ReturnsError::InsufficientData);
    }

    // Years from the earliest flow, actual/365.
    let base = flows
        .iter()
        .map(|f| f.date)
        .min()
        .ok_or(ReturnsError::InsufficientData)?;
    let terms: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| {
            let years = f.date.signed_duration_since(base).num_days() as f64 / 365.0;
            let amount = f.amount.to_f64().ok_or(ReturnsError::NoConvergence)?;
            Ok((years, amount))
        })
        .collect::<Result<_>>()?;

    let npv = |rate: f64| -> f64 {
        terms
            .iter()
            .map(|(years, amount)| amount / (1.0 + rate).powf(*years))
            .sum()
    };

    let mut low = RATE_LOWER_BOUND;
    let mut high = RATE_UPPER_BOUND;
    let mut npv_low = npv(low);
    if npv_low == 0.0 {
        return Decimal::from_f64(low).ok_or(ReturnsError::NoConvergence);
    }
    if npv_low * npv(high) > 0.0 {
        return Err(ReturnsError::NoConvergence);
    }

    let mut mid = 0.0;
    for _ in 0..MAX_ITERATIONS {
        mid = (low + high) / 2.0;
        let npv_mid = npv(mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Decimal::from_f64(mid).ok_or(ReturnsError::NoConvergence);
        }
        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    Decimal::from_f64(mid).ok_or(ReturnsError::NoConvergence)
}
