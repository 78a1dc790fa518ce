use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::corporate_actions::CorporateAction;
use crate::holdings::{GainListenerTrait, Holding};
use crate::ledger::{CashLedger, LedgerEntryKind};
use crate::constants::MONEY_SCALE;
use crate::securities::{PriceSourceTrait, SecurityResolverTrait};
use crate::transactions::{HandlerRegistry, Transaction};

use super::portfolio_errors::{PortfolioError, Result};

/// The top-level aggregate: one cash ledger, one holding per security,
/// and a date-ordered log of every transaction applied.
///
/// All mutation flows through [`Portfolio::apply_transaction`]. A failed
/// transaction leaves the portfolio untouched and is not logged.
pub struct Portfolio {
    pub id: Uuid,
    pub name: String,
    pub owner: String,
    security_resolver: Arc<dyn SecurityResolverTrait>,
    handler_registry: Arc<HandlerRegistry>,
    holdings: HashMap<String, Holding>,
    cash_ledger: CashLedger,
    transaction_log: Vec<Transaction>,
}

impl Portfolio {
    pub fn new(
        name: &str,
        owner: &str,
        security_resolver: Arc<dyn SecurityResolverTrait>,
        handler_registry: Arc<HandlerRegistry>,
    ) -> Self {
        Portfolio {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner: owner.to_string(),
            security_resolver,
            handler_registry,
            holdings: HashMap::new(),
            cash_ledger: CashLedger::new(),
            transaction_log: Vec::new(),
        }
    }

    /// Applies one transaction through its registered handler and, on
    /// success, records it in the log in date order.
    pub fn apply_transaction(
        &mut self,
        transaction: Transaction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        let kind = transaction.kind();
        if kind.requires_existing_holding() && !self.holdings.contains_key(&transaction.security_id)
        {
            return Err(PortfolioError::NoSharesOwned {
                security_id: transaction.security_id.clone(),
            });
        }

        let registry = Arc::clone(&self.handler_registry);
        let handler = registry
            .get_handler(kind)
            .ok_or(PortfolioError::NoHandler { kind })?;

        debug!(
            "Applying {} transaction {} for {} at {}",
            kind.as_str(),
            transaction.id,
            transaction.security_id,
            transaction.date
        );
        handler.handle(self, &transaction, listener)?;

        let idx = self
            .transaction_log
            .partition_point(|t| t.date <= transaction.date);
        self.transaction_log.insert(idx, transaction);
        Ok(())
    }

    /// Expands a corporate action into primitive transactions against the
    /// current holdings and applies each in turn, then marks the action
    /// applied. An already-applied action is skipped.
    pub fn apply_corporate_action(
        &mut self,
        action: &mut CorporateAction,
        listener: &mut dyn GainListenerTrait,
    ) -> Result<()> {
        if action.has_been_applied() {
            warn!("Corporate action {} has already been applied", action.id());
            return Ok(());
        }

        let transactions =
            action.generate_transactions(&self.holdings, self.security_resolver.as_ref())?;
        debug!(
            "Corporate action {} for {} expanded into {} transactions",
            action.id(),
            action.security_id(),
            transactions.len()
        );
        for transaction in transactions {
            self.apply_transaction(transaction, listener)?;
        }
        action.mark_applied();
        Ok(())
    }

    /// Opts the holding in or out of the security's reinvestment plan.
    pub fn set_drp_participation(
        &mut self,
        security_id: &str,
        participating: bool,
    ) -> Result<()> {
        let holding =
            self.holding_mut(security_id)
                .ok_or_else(|| PortfolioError::NoSharesOwned {
                    security_id: security_id.to_string(),
                })?;
        holding.change_drp_participation(participating);
        Ok(())
    }

    /// Market value of one holding at `date`: open units times the price
    /// supplied by `prices`.
    pub fn holding_value_at(
        &self,
        security_id: &str,
        date: NaiveDate,
        prices: &dyn PriceSourceTrait,
    ) -> Result<Decimal> {
        let holding = self
            .holdings
            .get(security_id)
            .ok_or_else(|| PortfolioError::NoSharesOwned {
                security_id: security_id.to_string(),
            })?;
        let units = holding.units_at(date);
        if units == 0 {
            return Ok(Decimal::ZERO);
        }
        let price = prices.get_price(security_id, date)?;
        Ok((Decimal::from(units) * price).round_dp(MONEY_SCALE))
    }

    /// Total portfolio value at `date`: every holding marked to the
    /// supplied prices, plus the cash balance. Empty holdings contribute
    /// zero without a price lookup.
    pub fn value_at(&self, date: NaiveDate, prices: &dyn PriceSourceTrait) -> Result<Decimal> {
        let mut total = self.cash_balance_at(date);
        for security_id in self.holdings.keys() {
            total += self.holding_value_at(security_id, date, prices)?;
        }
        Ok(total)
    }

    pub fn deposit_cash(&mut self, date: NaiveDate, amount: Decimal, description: &str) {
        self.cash_ledger
            .add_entry(date, amount, description, LedgerEntryKind::Deposit);
    }

    pub fn withdraw_cash(&mut self, date: NaiveDate, amount: Decimal, description: &str) {
        self.cash_ledger
            .add_entry(date, -amount, description, LedgerEntryKind::Withdrawal);
    }

    pub fn cash_balance_at(&self, date: NaiveDate) -> Decimal {
        self.cash_ledger.balance_at(date)
    }

    pub fn cash_ledger(&self) -> &CashLedger {
        &self.cash_ledger
    }

    pub fn holding(&self, security_id: &str) -> Option<&Holding> {
        self.holdings.get(security_id)
    }

    pub fn holdings(&self) -> &HashMap<String, Holding> {
        &self.holdings
    }

    pub fn transaction_log(&self) -> &[Transaction] {
        &self.transaction_log
    }

    pub fn security_resolver(&self) -> &dyn SecurityResolverTrait {
        self.security_resolver.as_ref()
    }

    pub(crate) fn holding_mut(&mut self, security_id: &str) -> Option<&mut Holding> {
        self.holdings.get_mut(security_id)
    }

    pub(crate) fn ensure_holding(&mut self, security_id: &str) -> &mut Holding {
        self.holdings
            .entry(security_id.to_string())
            .or_insert_with(|| Holding::new(security_id))
    }

    pub(crate) fn cash_ledger_mut(&mut self) -> &mut CashLedger {
        &mut self.cash_ledger
    }
}
