//! Expansion of corporate actions into primitive transactions. Generation
//! is pure: it reads holdings and security configuration but mutates
//! nothing; the portfolio applies the produced transactions afterwards.

use std::collections::HashMap;

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::holdings::Holding;
use crate::securities::{DrpMethod, SecurityResolverTrait};
use crate::transactions::{Transaction, TransactionPayload};

use super::actions_errors::{ActionError, ActionResult};
use super::actions_model::{
    CapitalReturnAction, CompositeAction, CorporateAction, DividendAction, SplitAction,
    TransformationAction,
};

impl CorporateAction {
    /// Expands this action against the current holdings. A holding with
    /// zero units at the action's effective date yields no transactions.
    pub fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        match self {
            CorporateAction::CapitalReturn(a) => a.generate_transactions(holdings, resolver),
            CorporateAction::Dividend(a) => a.generate_transactions(holdings, resolver),
            CorporateAction::Split(a) => a.generate_transactions(holdings, resolver),
            CorporateAction::Transformation(a) => a.generate_transactions(holdings, resolver),
            CorporateAction::Composite(a) => a.generate_transactions(holdings, resolver),
        }
    }
}

fn units_issued(raw: Decimal, method: DrpMethod) -> i64 {
    let rounded = match method {
        DrpMethod::RoundDown | DrpMethod::RetainCashBalance => raw.floor(),
        DrpMethod::RoundUp => raw.ceil(),
        DrpMethod::RoundToNearest => {
            raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
    };
    rounded.to_i64().unwrap_or(0)
}

impl CapitalReturnAction {
    pub(crate) fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        let units = holdings
            .get(&self.security_id)
            .map(|h| h.units_at(self.payment_date))
            .unwrap_or(0);
        if units == 0 {
            return Ok(Vec::new());
        }
        let security = resolver.get_security(&self.security_id)?;
        let amount = security
            .rounding_rule
            .apply(self.amount_per_unit * Decimal::from(units));
        Ok(vec![Transaction::new(
            &self.security_id,
            self.payment_date,
            TransactionPayload::ReturnOfCapital {
                amount,
                is_cash: self.is_cash,
            },
        )])
    }
}

impl DividendAction {
    pub(crate) fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        let holding = match holdings.get(&self.security_id) {
            Some(h) if h.units_at(self.payment_date) > 0 => h,
            _ => return Ok(Vec::new()),
        };
        let units = holding.units_at(self.payment_date);
        let security = resolver.get_security(&self.security_id)?;

        let scale = |per_unit: Decimal| {
            security
                .rounding_rule
                .apply(per_unit * Decimal::from(units))
        };
        let franked = scale(self.franked_per_unit);
        let unfranked = scale(self.unfranked_per_unit);
        let franking_credits = scale(self.franking_credits_per_unit);
        let interest = scale(self.interest_per_unit);
        let tax_deferred = scale(self.tax_deferred_per_unit);
        let cash_component = franked + unfranked + interest;

        let income = |is_cash: bool, drp_cash_balance: Decimal| {
            Transaction::new(
                &self.security_id,
                self.payment_date,
                TransactionPayload::IncomeReceived {
                    franked,
                    unfranked,
                    franking_credits,
                    interest,
                    tax_deferred,
                    is_cash,
                    drp_cash_balance,
                },
            )
        };

        let drp_method = match (&security.drp, self.drp_price) {
            (Some(drp), Some(price)) if drp.active && holding.is_drp_participating() => {
                if price <= Decimal::ZERO {
                    return Err(ActionError::InvalidDrpPrice { price });
                }
                Some((drp.method, price))
            }
            _ => None,
        };

        let (method, price) = match drp_method {
            Some(pair) => pair,
            None => {
                return Ok(vec![income(
                    true,
                    holding.drp_cash_balance_at(self.payment_date),
                )])
            }
        };

        let prior_balance = holding.drp_cash_balance_at(self.payment_date);
        let (issued, reinvested, residual) = match method {
            DrpMethod::RetainCashBalance => {
                // Whole units only; the exact remainder carries forward.
                let balance = prior_balance + cash_component;
                let issued = units_issued(balance / price, method);
                let cost = Decimal::from(issued) * price;
                (issued, cost, balance - cost)
            }
            _ => {
                let issued = units_issued(cash_component / price, method);
                (issued, cash_component, prior_balance)
            }
        };

        if issued == 0 && method != DrpMethod::RetainCashBalance {
            // Too small to reinvest under a whole-unit method: pay out.
            return Ok(vec![income(true, prior_balance)]);
        }

        debug!(
            "DRP on {}: {} units at {} reinvesting {}, residual {}",
            self.security_id, issued, price, reinvested, residual
        );
        let mut transactions = vec![income(false, residual)];
        if issued > 0 {
            transactions.push(Transaction::new(
                &self.security_id,
                self.payment_date,
                TransactionPayload::OpeningBalance {
                    units: issued,
                    amount_paid: reinvested,
                    cost_base: reinvested,
                    acquisition_date: self.payment_date,
                },
            ));
        }
        Ok(transactions)
    }
}

impl SplitAction {
    pub(crate) fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        _resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        if self.units_before <= 0 || self.units_after <= 0 {
            return Err(ActionError::InvalidRatio {
                units_before: self.units_before,
                units_after: self.units_after,
            });
        }
        let units = holdings
            .get(&self.security_id)
            .map(|h| h.units_at(self.adjustment_date))
            .unwrap_or(0);
        if units == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![Transaction::new(
            &self.security_id,
            self.adjustment_date,
            TransactionPayload::UnitCountAdjustment {
                units_before: self.units_before,
                units_after: self.units_after,
            },
        )])
    }
}

impl TransformationAction {
    pub(crate) fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        let holding = match holdings.get(&self.security_id) {
            Some(h) if h.units_at(self.implementation_date) > 0 => h,
            _ => return Ok(Vec::new()),
        };
        let date = self.implementation_date;
        let units = holding.units_at(date);
        let security = resolver.get_security(&self.security_id)?;
        let totals = holding.properties_at(date);
        let cash_total = security
            .rounding_rule
            .apply(self.cash_per_unit * Decimal::from(units));

        let mut transactions = Vec::new();
        if cash_total > Decimal::ZERO {
            // Cash consideration disposes of the entire original holding.
            transactions.push(Transaction::new(
                &self.security_id,
                date,
                TransactionPayload::Disposal {
                    units,
                    amount_received: cash_total,
                    method: None,
                    parcel_id: None,
                },
            ));
        } else if self.rollover_relief {
            // No disposal under relief; a zero-amount adjustment records
            // the event against the original security.
            transactions.push(Transaction::new(
                &self.security_id,
                date,
                TransactionPayload::CostBaseAdjustment {
                    amount: Decimal::ZERO,
                },
            ));
        }

        if self.rollover_relief {
            // Each original lot carries its acquisition date and a slice
            // of its cost base into every resulting security.
            for parcel in holding.parcels_at(date) {
                let props = parcel.properties_at(date);
                for resulting in &self.resulting_securities {
                    let new_units = (Decimal::from(props.units)
                        * resulting.units_per_original_unit)
                        .floor()
                        .to_i64()
                        .unwrap_or(0);
                    if new_units == 0 {
                        continue;
                    }
                    transactions.push(Transaction::new(
                        &resulting.security_id,
                        date,
                        TransactionPayload::OpeningBalance {
                            units: new_units,
                            amount_paid: security
                                .rounding_rule
                                .apply(props.amount_paid * resulting.cost_base_fraction),
                            cost_base: security
                                .rounding_rule
                                .apply(props.cost_base * resulting.cost_base_fraction),
                            acquisition_date: parcel.acquisition_date,
                        },
                    ));
                }
            }
        } else {
            // Without relief: one consolidated lot per resulting security,
            // acquired at implementation. When no cash changed hands the
            // transferred cost base leaves the original as a non-cash
            // return of capital.
            let mut transferred = Decimal::ZERO;
            let mut opening_balances = Vec::new();
            for resulting in &self.resulting_securities {
                let new_units = (Decimal::from(units) * resulting.units_per_original_unit)
                    .floor()
                    .to_i64()
                    .unwrap_or(0);
                if new_units == 0 {
                    continue;
                }
                let cost_base = security
                    .rounding_rule
                    .apply(totals.total_cost_base * resulting.cost_base_fraction);
                transferred += cost_base;
                opening_balances.push(Transaction::new(
                    &resulting.security_id,
                    date,
                    TransactionPayload::OpeningBalance {
                        units: new_units,
                        amount_paid: security
                            .rounding_rule
                            .apply(totals.total_amount_paid * resulting.cost_base_fraction),
                        cost_base,
                        acquisition_date: date,
                    },
                ));
            }
            if cash_total.is_zero() && transferred > Decimal::ZERO {
                transactions.push(Transaction::new(
                    &self.security_id,
                    date,
                    TransactionPayload::ReturnOfCapital {
                        amount: transferred,
                        is_cash: false,
                    },
                ));
            }
            transactions.extend(opening_balances);
        }
        Ok(transactions)
    }
}

impl CompositeAction {
    pub(crate) fn generate_transactions(
        &self,
        holdings: &HashMap<String, Holding>,
        resolver: &dyn SecurityResolverTrait,
    ) -> ActionResult<Vec<Transaction>> {
        let mut transactions = Vec::new();
        for child in &self.children {
            transactions.extend(child.generate_transactions(holdings, resolver)?);
        }
        Ok(transactions)
    }
}
