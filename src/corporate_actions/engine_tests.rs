use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::holdings::{CgtEventCollector, Holding};
use crate::portfolio::Portfolio;
use crate::securities::{
    DrpMethod, DrpSettings, RoundingRule, Security, SecurityError, SecurityResolverTrait,
};
use crate::transactions::{HandlerRegistry, Transaction, TransactionPayload};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

struct StaticResolver {
    securities: HashMap<String, Security>,
}

impl StaticResolver {
    fn with(security: Security) -> Self {
        let mut securities = HashMap::new();
        securities.insert(security.id.clone(), security);
        StaticResolver { securities }
    }
}

impl SecurityResolverTrait for StaticResolver {
    fn get_security(&self, security_id: &str) -> crate::securities::Result<Security> {
        self.securities
            .get(security_id)
            .cloned()
            .ok_or_else(|| SecurityError::NotFound(security_id.to_string()))
    }
}

fn security(id: &str, rounding_rule: RoundingRule, drp: Option<DrpSettings>) -> Security {
    Security {
        id: id.to_string(),
        symbol: id.to_string(),
        name: id.to_string(),
        rounding_rule,
        drp,
    }
}

fn holdings_with(id: &str, units: i64, cost: Decimal) -> HashMap<String, Holding> {
    let mut holding = Holding::new(id);
    holding
        .add_parcel(d("2019-01-10"), d("2019-01-10"), units, cost, cost, Uuid::new_v4())
        .unwrap();
    let mut holdings = HashMap::new();
    holdings.insert(id.to_string(), holding);
    holdings
}

fn capital_return(amount_per_unit: Decimal) -> CapitalReturnAction {
    CapitalReturnAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Capital return".to_string(),
        applied: false,
        payment_date: d("2021-06-01"),
        amount_per_unit,
        is_cash: true,
    }
}

fn dividend(unfranked_per_unit: Decimal, drp_price: Option<Decimal>) -> DividendAction {
    DividendAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Final dividend".to_string(),
        applied: false,
        payment_date: d("2021-06-01"),
        franked_per_unit: Decimal::ZERO,
        unfranked_per_unit,
        franking_credits_per_unit: Decimal::ZERO,
        interest_per_unit: Decimal::ZERO,
        tax_deferred_per_unit: Decimal::ZERO,
        drp_price,
    }
}

#[test]
fn capital_return_rounds_per_security_rule() {
    let holdings = holdings_with("CBA", 100, dec!(2000.00));
    let action = capital_return(dec!(1.20456));

    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, None));
    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    assert_eq!(transactions.len(), 1);
    match &transactions[0].payload {
        TransactionPayload::ReturnOfCapital { amount, is_cash } => {
            assert_eq!(*amount, dec!(120.46));
            assert!(is_cash);
        }
        other => panic!("unexpected payload {:?}", other),
    }

    let resolver = StaticResolver::with(security("CBA", RoundingRule::Truncate, None));
    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    match &transactions[0].payload {
        TransactionPayload::ReturnOfCapital { amount, .. } => {
            assert_eq!(*amount, dec!(120.45));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn zero_units_generates_no_transactions() {
    let holdings: HashMap<String, Holding> = HashMap::new();
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, None));

    let action = CorporateAction::CapitalReturn(capital_return(dec!(0.50)));
    assert!(action
        .generate_transactions(&holdings, &resolver)
        .unwrap()
        .is_empty());

    let action = CorporateAction::Dividend(dividend(dec!(0.50), None));
    assert!(action
        .generate_transactions(&holdings, &resolver)
        .unwrap()
        .is_empty());

    let action = CorporateAction::Split(SplitAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "2:1 split".to_string(),
        applied: false,
        adjustment_date: d("2021-06-01"),
        units_before: 1,
        units_after: 2,
    });
    assert!(action
        .generate_transactions(&holdings, &resolver)
        .unwrap()
        .is_empty());

    let action = CorporateAction::Transformation(TransformationAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Takeover".to_string(),
        applied: false,
        implementation_date: d("2021-06-01"),
        cash_per_unit: dec!(1.00),
        rollover_relief: false,
        resulting_securities: Vec::new(),
    });
    assert!(action
        .generate_transactions(&holdings, &resolver)
        .unwrap()
        .is_empty());
}

#[test]
fn drp_round_down_issues_whole_units_only() {
    // 100 units at 1.15989/unit rounds to 115.99 cash; at a plan price
    // of 2.30 the raw entitlement is 50.43 units.
    let mut holdings = holdings_with("CBA", 100, dec!(2000.00));
    holdings
        .get_mut("CBA")
        .unwrap()
        .change_drp_participation(true);
    let action = dividend(dec!(1.15989), Some(dec!(2.30)));

    let drp = DrpSettings {
        active: true,
        method: DrpMethod::RoundDown,
    };
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, Some(drp)));
    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    assert_eq!(transactions.len(), 2);
    match &transactions[1].payload {
        TransactionPayload::OpeningBalance {
            units,
            amount_paid,
            cost_base,
            acquisition_date,
        } => {
            assert_eq!(*units, 50);
            assert_eq!(*amount_paid, dec!(115.99));
            assert_eq!(*cost_base, dec!(115.99));
            assert_eq!(*acquisition_date, d("2021-06-01"));
        }
        other => panic!("unexpected payload {:?}", other),
    }

    let drp = DrpSettings {
        active: true,
        method: DrpMethod::RoundUp,
    };
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, Some(drp)));
    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    match &transactions[1].payload {
        TransactionPayload::OpeningBalance { units, .. } => assert_eq!(*units, 51),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn drp_retain_cash_balance_carries_exact_residual() {
    let mut holdings = holdings_with("CBA", 100, dec!(2000.00));
    let holding = holdings.get_mut("CBA").unwrap();
    holding.change_drp_participation(true);
    holding.add_drp_cash_amount(d("2021-01-01"), dec!(3.20));

    let drp = DrpSettings {
        active: true,
        method: DrpMethod::RetainCashBalance,
    };
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, Some(drp)));
    let action = dividend(dec!(1.15989), Some(dec!(2.30)));
    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();

    // Balance 3.20 + 115.99 = 119.19 buys 51 whole units at 2.30.
    assert_eq!(transactions.len(), 2);
    match &transactions[0].payload {
        TransactionPayload::IncomeReceived {
            is_cash,
            drp_cash_balance,
            ..
        } => {
            assert!(!is_cash);
            assert_eq!(*drp_cash_balance, dec!(1.89));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    match &transactions[1].payload {
        TransactionPayload::OpeningBalance {
            units, cost_base, ..
        } => {
            assert_eq!(*units, 51);
            assert_eq!(*cost_base, dec!(117.30));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn dividend_without_plan_pays_cash() {
    let holdings = holdings_with("CBA", 100, dec!(2000.00));
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, None));
    let action = dividend(dec!(1.15989), Some(dec!(2.30)));

    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    assert_eq!(transactions.len(), 1);
    match &transactions[0].payload {
        TransactionPayload::IncomeReceived {
            unfranked, is_cash, ..
        } => {
            assert_eq!(*unfranked, dec!(115.99));
            assert!(is_cash);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn split_rejects_non_positive_ratio() {
    let holdings = holdings_with("CBA", 100, dec!(2000.00));
    let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, None));
    let action = SplitAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Bad ratio".to_string(),
        applied: false,
        adjustment_date: d("2021-06-01"),
        units_before: 0,
        units_after: 2,
    };
    assert!(matches!(
        action.generate_transactions(&holdings, &resolver),
        Err(ActionError::InvalidRatio { .. })
    ));
}

#[test]
fn transformation_with_cash_disposes_entire_holding() {
    let holdings = holdings_with("OLD", 100, dec!(2000.00));
    let resolver = StaticResolver::with(security("OLD", RoundingRule::Round, None));
    let action = TransformationAction {
        id: Uuid::new_v4(),
        security_id: "OLD".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Cash takeover".to_string(),
        applied: false,
        implementation_date: d("2021-06-01"),
        cash_per_unit: dec!(25.00),
        rollover_relief: false,
        resulting_securities: Vec::new(),
    };

    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    assert_eq!(transactions.len(), 1);
    match &transactions[0].payload {
        TransactionPayload::Disposal {
            units,
            amount_received,
            ..
        } => {
            assert_eq!(*units, 100);
            assert_eq!(*amount_received, dec!(2500.00));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn demerger_pairs_consolidated_lot_with_non_cash_capital_return() {
    let holdings = holdings_with("OLD", 100, dec!(2000.00));
    let resolver = StaticResolver::with(security("OLD", RoundingRule::Round, None));
    let action = TransformationAction {
        id: Uuid::new_v4(),
        security_id: "OLD".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Demerger".to_string(),
        applied: false,
        implementation_date: d("2021-06-01"),
        cash_per_unit: Decimal::ZERO,
        rollover_relief: false,
        resulting_securities: vec![ResultingSecurity {
            security_id: "NEW".to_string(),
            units_per_original_unit: dec!(0.5),
            cost_base_fraction: dec!(0.25),
        }],
    };

    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    assert_eq!(transactions.len(), 2);
    match &transactions[0].payload {
        TransactionPayload::ReturnOfCapital { amount, is_cash } => {
            assert_eq!(*amount, dec!(500.00));
            assert!(!is_cash);
        }
        other => panic!("unexpected payload {:?}", other),
    }
    match &transactions[1].payload {
        TransactionPayload::OpeningBalance {
            units,
            cost_base,
            acquisition_date,
            ..
        } => {
            assert_eq!(*units, 50);
            assert_eq!(*cost_base, dec!(500.00));
            assert_eq!(*acquisition_date, d("2021-06-01"));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(transactions[1].security_id, "NEW");
}

#[test]
fn rollover_relief_preserves_lot_acquisition_dates() {
    let mut holdings = holdings_with("OLD", 100, dec!(2000.00));
    holdings
        .get_mut("OLD")
        .unwrap()
        .add_parcel(d("2020-07-01"), d("2020-07-01"), 40, dec!(900.00), dec!(900.00), Uuid::new_v4())
        .unwrap();
    let resolver = StaticResolver::with(security("OLD", RoundingRule::Round, None));
    let action = TransformationAction {
        id: Uuid::new_v4(),
        security_id: "OLD".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Scrip merger".to_string(),
        applied: false,
        implementation_date: d("2021-06-01"),
        cash_per_unit: Decimal::ZERO,
        rollover_relief: true,
        resulting_securities: vec![ResultingSecurity {
            security_id: "NEW".to_string(),
            units_per_original_unit: dec!(2),
            cost_base_fraction: dec!(1),
        }],
    };

    let transactions = action.generate_transactions(&holdings, &resolver).unwrap();
    // Marker on the original plus one opening balance per original lot.
    assert_eq!(transactions.len(), 3);
    assert!(matches!(
        transactions[0].payload,
        TransactionPayload::CostBaseAdjustment { amount } if amount.is_zero()
    ));
    match &transactions[1].payload {
        TransactionPayload::OpeningBalance {
            units,
            cost_base,
            acquisition_date,
            ..
        } => {
            assert_eq!(*units, 200);
            assert_eq!(*cost_base, dec!(2000.00));
            assert_eq!(*acquisition_date, d("2019-01-10"));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    match &transactions[2].payload {
        TransactionPayload::OpeningBalance {
            units,
            acquisition_date,
            ..
        } => {
            assert_eq!(*units, 80);
            assert_eq!(*acquisition_date, d("2020-07-01"));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn composite_is_applied_only_when_every_child_is() {
    let mut first = capital_return(dec!(0.10));
    first.applied = true;
    let second = capital_return(dec!(0.20));

    let composite = CorporateAction::Composite(CompositeAction {
        id: Uuid::new_v4(),
        security_id: "CBA".to_string(),
        announcement_date: d("2021-05-01"),
        description: "Two-step return".to_string(),
        children: vec![
            CorporateAction::CapitalReturn(first),
            CorporateAction::CapitalReturn(second),
        ],
    });
    assert!(!composite.has_been_applied());

    let mut composite = composite;
    composite.mark_applied();
    assert!(composite.has_been_applied());
}

proptest! {
    // Retained balance stays within [0, price) after every payment, and
    // every cent of income is either reinvested into issued units or
    // carried forward, across any dividend sequence applied through the
    // portfolio.
    #[test]
    fn retain_cash_residual_is_bounded_and_conserved(
        price_cents in 1i64..=10_000,
        per_unit_rates in proptest::collection::vec(0i64..=100_000, 1..12),
    ) {
        let price = Decimal::new(price_cents, 2);
        let drp = DrpSettings {
            active: true,
            method: DrpMethod::RetainCashBalance,
        };
        let resolver = StaticResolver::with(security("CBA", RoundingRule::Round, Some(drp)));
        let mut portfolio = Portfolio::new(
            "Reinvestment plan",
            "tester",
            Arc::new(resolver),
            Arc::new(HandlerRegistry::with_default_handlers()),
        );
        let mut collector = CgtEventCollector::new();
        portfolio
            .apply_transaction(
                Transaction::new(
                    "CBA",
                    d("2019-01-10"),
                    TransactionPayload::Acquisition {
                        units: 100,
                        amount_paid: dec!(1000.00),
                        cost_base: dec!(1000.00),
                    },
                ),
                &mut collector,
            )
            .unwrap();
        portfolio.set_drp_participation("CBA", true).unwrap();

        let mut last_date = d("2021-01-01");
        for (i, rate) in per_unit_rates.into_iter().enumerate() {
            let payment_date = d("2021-01-01") + chrono::Duration::days(i as i64 + 1);
            let mut action = CorporateAction::Dividend(DividendAction {
                id: Uuid::new_v4(),
                security_id: "CBA".to_string(),
                announcement_date: d("2021-01-01"),
                description: format!("Dividend {}", i + 1),
                applied: false,
                payment_date,
                franked_per_unit: Decimal::ZERO,
                unfranked_per_unit: Decimal::new(rate, 4),
                franking_credits_per_unit: Decimal::ZERO,
                interest_per_unit: Decimal::ZERO,
                tax_deferred_per_unit: Decimal::ZERO,
                drp_price: Some(price),
            });
            portfolio
                .apply_corporate_action(&mut action, &mut collector)
                .unwrap();
            last_date = payment_date;

            let residual = portfolio
                .holding("CBA")
                .unwrap()
                .drp_cash_balance_at(payment_date);
            prop_assert!(residual >= Decimal::ZERO);
            prop_assert!(residual < price);
        }

        // Everything paid in shows up either as opening-balance cost or
        // as the carried residual, to the cent.
        let mut paid_in = Decimal::ZERO;
        let mut reinvested = Decimal::ZERO;
        for transaction in portfolio.transaction_log() {
            match &transaction.payload {
                TransactionPayload::IncomeReceived {
                    franked,
                    unfranked,
                    interest,
                    ..
                } => paid_in += franked + unfranked + interest,
                TransactionPayload::OpeningBalance { cost_base, .. } => reinvested += cost_base,
                _ => {}
            }
        }
        let residual = portfolio.holding("CBA").unwrap().drp_cash_balance_at(last_date);
        prop_assert_eq!(paid_in, reinvested + residual);
    }
}
