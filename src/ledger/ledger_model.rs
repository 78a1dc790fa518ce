use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::temporal::DateRange;
use crate::utils::decimal_serde::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LedgerEntryKind {
    Deposit,
    Withdrawal,
    Income,
    CapitalReturn,
    Investment,
    Adjustment,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub description: String,
    /// Signed: positive amounts increase the balance.
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
    pub kind: LedgerEntryKind,
    /// Running balance after this entry, derived on insertion.
    #[serde(with = "decimal_serde")]
    pub balance: Decimal,
}

/// Date-ordered running-balance account. Insertion at an arbitrary date is
/// supported; the running balance of every subsequent entry is re-derived.
/// Same-day entries keep their insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashLedger {
    entries: Vec<LedgerEntry>,
}

impl CashLedger {
    pub fn new() -> Self {
        CashLedger::default()
    }

    pub fn add_entry(
        &mut self,
        date: NaiveDate,
        amount: Decimal,
        description: &str,
        kind: LedgerEntryKind,
    ) {
        // Stable among same-day entries: new entries go after existing ones.
        let idx = self.entries.partition_point(|e| e.date <= date);
        self.entries.insert(
            idx,
            LedgerEntry {
                date,
                description: description.to_string(),
                amount,
                kind,
                balance: Decimal::ZERO,
            },
        );
        self.recompute_from(idx);
    }

    fn recompute_from(&mut self, idx: usize) {
        let mut balance = if idx == 0 {
            Decimal::ZERO
        } else {
            self.entries[idx - 1].balance
        };
        for entry in self.entries.iter_mut().skip(idx) {
            balance += entry.amount;
            entry.balance = balance;
        }
    }

    /// Balance of the latest entry not later than `date`, or zero if none.
    pub fn balance_at(&self, date: NaiveDate) -> Decimal {
        let idx = self.entries.partition_point(|e| e.date <= date);
        if idx == 0 {
            Decimal::ZERO
        } else {
            self.entries[idx - 1].balance
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entries_in_range(&self, range: DateRange) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| range.contains(e.date))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Partitions `range` at every entry date falling within it, yielding
    /// contiguous `(sub_range, balance)` pairs that cover `range` exactly.
    /// Each partition carries the balance that held throughout it.
    pub fn effective_balances(&self, range: DateRange) -> Vec<(DateRange, Decimal)> {
        let mut cuts: Vec<NaiveDate> = self
            .entries
            .iter()
            .map(|e| e.date)
            .filter(|d| range.contains(*d) && *d > range.start)
            .collect();
        cuts.dedup();

        let mut partitions = Vec::with_capacity(cuts.len() + 1);
        let mut from = range.start;
        for cut in cuts {
            partitions.push((DateRange::new(from, cut), self.balance_at(from)));
            from = cut;
        }
        partitions.push((DateRange::new(from, range.end), self.balance_at(from)));
        partitions
    }
}
