use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::constants::MONEY_SCALE;
use crate::holdings::{CgtMethod, GainListenerTrait, HoldingError};
use crate::ledger::LedgerEntryKind;
use crate::portfolio::{Portfolio, PortfolioError, Result};

use super::transactions_model::{Transaction, TransactionKind, TransactionPayload};

/// Handler for one primitive transaction kind. A handler either applies
/// its transaction fully or fails without mutating anything; partial
/// application is never observable.
pub trait TransactionHandlerTrait: Send + Sync {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()>;
}

/// Registry of handlers keyed by transaction kind. Supplied to the
/// portfolio by the caller; callers may replace individual handlers.
pub struct HandlerRegistry {
    handlers: HashMap<TransactionKind, Box<dyn TransactionHandlerTrait>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Registry containing the built-in handler for every kind.
    pub fn with_default_handlers() -> Self {
        let mut registry = HandlerRegistry::new();
        registry.register(TransactionKind::Acquisition, Box::new(AcquisitionHandler));
        registry.register(TransactionKind::Disposal, Box::new(DisposalHandler));
        registry.register(
            TransactionKind::OpeningBalance,
            Box::new(OpeningBalanceHandler),
        );
        registry.register(
            TransactionKind::ReturnOfCapital,
            Box::new(ReturnOfCapitalHandler),
        );
        registry.register(
            TransactionKind::IncomeReceived,
            Box::new(IncomeReceivedHandler),
        );
        registry.register(
            TransactionKind::UnitCountAdjustment,
            Box::new(UnitCountAdjustmentHandler),
        );
        registry.register(
            TransactionKind::CostBaseAdjustment,
            Box::new(CostBaseAdjustmentHandler),
        );
        registry
    }

    pub fn register(&mut self, kind: TransactionKind, handler: Box<dyn TransactionHandlerTrait>) {
        self.handlers.insert(kind, handler);
    }

    pub fn get_handler(&self, kind: TransactionKind) -> Option<&dyn TransactionHandlerTrait> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        HandlerRegistry::with_default_handlers()
    }
}

fn payload_mismatch(transaction: &Transaction, expected: TransactionKind) -> PortfolioError {
    PortfolioError::InvalidTransaction {
        transaction_id: transaction.id,
        reason: format!(
            "expected {} payload, got {}",
            expected.as_str(),
            transaction.kind().as_str()
        ),
    }
}

/// Splits `total` across parcels proportionally to their unit counts,
/// keeping every share non-negative at the minor currency unit while the
/// shares still sum exactly to `total`. Each exact share is truncated to
/// cents, then the leftover cents go to the parcels with the largest
/// truncated remainders.
fn apportion_by_units(total: Decimal, parcels: &[(Uuid, i64)]) -> Vec<(Uuid, Decimal)> {
    let total_units: i64 = parcels.iter().map(|(_, units)| units).sum();
    let cent = Decimal::new(1, MONEY_SCALE);
    let mut shares = Vec::with_capacity(parcels.len());
    let mut remainders = Vec::with_capacity(parcels.len());
    let mut allocated = Decimal::ZERO;
    for (i, (parcel_id, units)) in parcels.iter().enumerate() {
        let exact = total * Decimal::from(*units) / Decimal::from(total_units);
        let share = exact.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
        allocated += share;
        remainders.push((i, exact - share));
        shares.push((*parcel_id, share));
    }
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    let mut leftover = total - allocated;
    for (i, _) in remainders {
        if leftover <= Decimal::ZERO {
            break;
        }
        let top_up = cent.min(leftover);
        shares[i].1 += top_up;
        leftover -= top_up;
    }
    shares
}

pub struct AcquisitionHandler;

impl TransactionHandlerTrait for AcquisitionHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        _listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (units, amount_paid, cost_base) = match &transaction.payload {
            TransactionPayload::Acquisition {
                units,
                amount_paid,
                cost_base,
            } => (*units, *amount_paid, *cost_base),
            _ => return Err(payload_mismatch(transaction, TransactionKind::Acquisition)),
        };

        let holding = portfolio.ensure_holding(&transaction.security_id);
        holding.add_parcel(
            transaction.date,
            transaction.date,
            units,
            amount_paid,
            cost_base,
            transaction.id,
        )?;
        portfolio.cash_ledger_mut().add_entry(
            transaction.date,
            -amount_paid,
            &format!("Acquired {} units of {}", units, transaction.security_id),
            LedgerEntryKind::Investment,
        );
        Ok(())
    }
}

pub struct DisposalHandler;

impl TransactionHandlerTrait for DisposalHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (units, amount_received, method, parcel_id) = match &transaction.payload {
            TransactionPayload::Disposal {
                units,
                amount_received,
                method,
                parcel_id,
            } => (*units, *amount_received, *method, *parcel_id),
            _ => return Err(payload_mismatch(transaction, TransactionKind::Disposal)),
        };
        if units <= 0 {
            return Err(PortfolioError::Holding(HoldingError::NonPositiveUnits {
                units,
            }));
        }

        let date = transaction.date;
        let security_id = transaction.security_id.clone();
        let holding = portfolio
            .holding_mut(&security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: security_id.clone(),
            })?;

        // Allocation plan first, so a failing disposal never applies
        // partially: (parcel, units taken, acquisition date, cost-base
        // share of the taken units).
        let mut plan: Vec<(Uuid, i64, chrono::NaiveDate, Decimal)> = Vec::new();
        if let Some(parcel_id) = parcel_id {
            let parcel = holding.parcel(parcel_id)?;
            let available = parcel.units_at(date);
            if units > available {
                return Err(PortfolioError::Holding(HoldingError::InsufficientUnits {
                    parcel_id,
                    date,
                    requested: units,
                    available,
                }));
            }
            let props = parcel.properties_at(date);
            let cost_base_share = (props.cost_base * Decimal::from(units)
                / Decimal::from(available))
            .round_dp(MONEY_SCALE);
            plan.push((parcel_id, units, parcel.acquisition_date, cost_base_share));
        } else {
            let open = holding.parcels_at(date);
            let available: i64 = open.iter().map(|p| p.units_at(date)).sum();
            if units > available {
                return Err(PortfolioError::InsufficientUnits {
                    security_id: security_id.clone(),
                    date,
                    requested: units,
                    available,
                });
            }
            // First-in-first-out relief; parcels are held in acquisition order.
            let mut remaining = units;
            for parcel in open {
                if remaining == 0 {
                    break;
                }
                let held = parcel.units_at(date);
                let take = held.min(remaining);
                remaining -= take;
                let props = parcel.properties_at(date);
                let cost_base_share = (props.cost_base * Decimal::from(take)
                    / Decimal::from(held))
                .round_dp(MONEY_SCALE);
                plan.push((parcel.id, take, parcel.acquisition_date, cost_base_share));
            }
        }

        // Proceeds apportioned by units taken; the last parcel takes the
        // rounding remainder so proceeds sum exactly.
        let taken_total: i64 = plan.iter().map(|(_, take, _, _)| take).sum();
        let mut allocated = Decimal::ZERO;
        let last = plan.len() - 1;
        for (i, (parcel_id, take, acquisition_date, cost_base_share)) in
            plan.into_iter().enumerate()
        {
            let proceeds = if i == last {
                amount_received - allocated
            } else {
                (amount_received * Decimal::from(take) / Decimal::from(taken_total))
                    .round_dp(MONEY_SCALE)
            };
            allocated += proceeds;
            let capital_gain = proceeds - cost_base_share;
            let parcel_method =
                method.unwrap_or_else(|| CgtMethod::for_dates(acquisition_date, date));
            holding.dispose_of_parcel(
                parcel_id,
                date,
                take,
                proceeds,
                capital_gain,
                parcel_method,
                transaction.id,
                listener,
            )?;
        }

        portfolio.cash_ledger_mut().add_entry(
            date,
            amount_received,
            &format!("Disposed of {} units of {}", units, security_id),
            LedgerEntryKind::Investment,
        );
        Ok(())
    }
}

pub struct OpeningBalanceHandler;

impl TransactionHandlerTrait for OpeningBalanceHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        _listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (units, amount_paid, cost_base, acquisition_date) = match &transaction.payload {
            TransactionPayload::OpeningBalance {
                units,
                amount_paid,
                cost_base,
                acquisition_date,
            } => (*units, *amount_paid, *cost_base, *acquisition_date),
            _ => {
                return Err(payload_mismatch(
                    transaction,
                    TransactionKind::OpeningBalance,
                ))
            }
        };

        let holding = portfolio.ensure_holding(&transaction.security_id);
        holding.add_parcel(
            transaction.date,
            acquisition_date,
            units,
            amount_paid,
            cost_base,
            transaction.id,
        )?;
        Ok(())
    }
}

pub struct ReturnOfCapitalHandler;

impl TransactionHandlerTrait for ReturnOfCapitalHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (amount, is_cash) = match &transaction.payload {
            TransactionPayload::ReturnOfCapital { amount, is_cash } => (*amount, *is_cash),
            _ => {
                return Err(payload_mismatch(
                    transaction,
                    TransactionKind::ReturnOfCapital,
                ))
            }
        };

        let date = transaction.date;
        let security_id = transaction.security_id.clone();
        let holding = portfolio
            .holding_mut(&security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: security_id.clone(),
            })?;

        let parcels: Vec<(Uuid, i64)> = holding
            .parcels_at(date)
            .iter()
            .map(|p| (p.id, p.units_at(date)))
            .collect();
        if parcels.is_empty() {
            return Err(PortfolioError::NoSharesOwned { security_id });
        }

        for (parcel_id, share) in apportion_by_units(amount, &parcels) {
            holding.reduce_parcel_cost_base(parcel_id, date, share, transaction.id, listener)?;
        }

        if is_cash {
            portfolio.cash_ledger_mut().add_entry(
                date,
                amount,
                &format!("Return of capital on {}", security_id),
                LedgerEntryKind::CapitalReturn,
            );
        }
        Ok(())
    }
}

pub struct IncomeReceivedHandler;

impl TransactionHandlerTrait for IncomeReceivedHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (franked, unfranked, interest, tax_deferred, is_cash, drp_cash_balance) =
            match &transaction.payload {
                TransactionPayload::IncomeReceived {
                    franked,
                    unfranked,
                    franking_credits: _,
                    interest,
                    tax_deferred,
                    is_cash,
                    drp_cash_balance,
                } => (
                    *franked,
                    *unfranked,
                    *interest,
                    *tax_deferred,
                    *is_cash,
                    *drp_cash_balance,
                ),
                _ => {
                    return Err(payload_mismatch(
                        transaction,
                        TransactionKind::IncomeReceived,
                    ))
                }
            };

        let date = transaction.date;
        let security_id = transaction.security_id.clone();
        let holding = portfolio
            .holding_mut(&security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: security_id.clone(),
            })?;

        // Franking credits are imputation-only and never move cash.
        let cash_component = franked + unfranked + interest;

        if !is_cash {
            // Reinvested under a DRP: the cash entitlement passes through
            // the holding's sub-ledger and only the reported residual
            // remains after the reinvestment is taken out.
            holding.add_drp_cash_amount(date, cash_component);
            let balance = holding.drp_cash_balance_at(date);
            let reinvested = balance - drp_cash_balance;
            if reinvested > Decimal::ZERO {
                holding.add_drp_cash_amount(date, -reinvested);
            } else if reinvested < Decimal::ZERO {
                warn!(
                    "Income transaction {} reports residual {} above the accumulated balance {}",
                    transaction.id, drp_cash_balance, balance
                );
            }
        }

        // Tax-deferred distributions reduce cost base like a return of
        // capital; any excess realizes as a gain.
        if tax_deferred > Decimal::ZERO {
            let parcels: Vec<(Uuid, i64)> = holding
                .parcels_at(date)
                .iter()
                .map(|p| (p.id, p.units_at(date)))
                .collect();
            if !parcels.is_empty() {
                for (parcel_id, share) in apportion_by_units(tax_deferred, &parcels) {
                    holding.reduce_parcel_cost_base(
                        parcel_id,
                        date,
                        share,
                        transaction.id,
                        listener,
                    )?;
                }
            }
        }

        if is_cash {
            portfolio.cash_ledger_mut().add_entry(
                date,
                cash_component + tax_deferred,
                &format!("Income received on {}", security_id),
                LedgerEntryKind::Income,
            );
        }
        Ok(())
    }
}

pub struct UnitCountAdjustmentHandler;

impl TransactionHandlerTrait for UnitCountAdjustmentHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        _listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let (units_before, units_after) = match &transaction.payload {
            TransactionPayload::UnitCountAdjustment {
                units_before,
                units_after,
            } => (*units_before, *units_after),
            _ => {
                return Err(payload_mismatch(
                    transaction,
                    TransactionKind::UnitCountAdjustment,
                ))
            }
        };
        if units_before <= 0 || units_after <= 0 {
            return Err(PortfolioError::InvalidTransaction {
                transaction_id: transaction.id,
                reason: format!("invalid adjustment ratio {}:{}", units_before, units_after),
            });
        }

        let date = transaction.date;
        let holding = portfolio
            .holding_mut(&transaction.security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: transaction.security_id.clone(),
            })?;

        let plan: Vec<(Uuid, i64)> = holding
            .parcels_at(date)
            .iter()
            .map(|p| {
                let held = p.units_at(date);
                let rescaled = (Decimal::from(held) * Decimal::from(units_after)
                    / Decimal::from(units_before))
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .unwrap_or(held);
                (p.id, rescaled)
            })
            .collect();

        debug!(
            "Rescaling {} parcels of {} by {}:{}",
            plan.len(),
            transaction.security_id,
            units_before,
            units_after
        );
        for (parcel_id, new_unit_count) in plan {
            holding.change_parcel_unit_count(parcel_id, date, new_unit_count, transaction.id)?;
        }
        Ok(())
    }
}

pub struct CostBaseAdjustmentHandler;

impl TransactionHandlerTrait for CostBaseAdjustmentHandler {
    fn handle(
        &self,
        portfolio: &mut Portfolio,
        transaction: &Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let amount = match &transaction.payload {
            TransactionPayload::CostBaseAdjustment { amount } => *amount,
            _ => {
                return Err(payload_mismatch(
                    transaction,
                    TransactionKind::CostBaseAdjustment,
                ))
            }
        };

        let date = transaction.date;
        let security_id = transaction.security_id.clone();
        let holding = portfolio
            .holding_mut(&security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: security_id.clone(),
            })?;

        if amount.is_zero() {
            // Marker transaction: records an event with no value effect.
            debug!(
                "Cost-base adjustment marker on {} at {}",
                security_id, date
            );
            return Ok(());
        }

        let parcels: Vec<(Uuid, i64)> = holding
            .parcels_at(date)
            .iter()
            .map(|p| (p.id, p.units_at(date)))
            .collect();
        if parcels.is_empty() {
            return Err(PortfolioError::NoSharesOwned { security_id });
        }

        for (parcel_id, share) in apportion_by_units(amount, &parcels) {
            holding.reduce_parcel_cost_base(parcel_id, date, share, transaction.id, listener)?;
        }
        Ok(())
    }
}
