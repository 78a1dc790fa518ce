use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn flow(date: &str, amount: rust_decimal::Decimal) -> CashFlow {
    CashFlow {
        date: d(date),
        amount,
    }
}

#[test]
fn two_flow_series_matches_closed_form_rate() {
    // -1000 grows to 1100 over exactly one year: 10%.
    let flows = vec![
        flow("2020-01-01", dec!(-1000.00)),
        flow("2020-12-31", dec!(1100.00)),
    ];
    let rate = internal_rate_of_return(&flows).unwrap();
    assert!((rate - dec!(0.10)).abs() < dec!(0.0001), "rate was {rate}");
}

#[test]
fn negative_rate_is_found_for_a_losing_series() {
    let flows = vec![
        flow("2020-01-01", dec!(-1000.00)),
        flow("2020-12-31", dec!(900.00)),
    ];
    let rate = internal_rate_of_return(&flows).unwrap();
    assert!((rate - dec!(-0.10)).abs() < dec!(0.0001), "rate was {rate}");
}

#[test]
fn intermediate_flows_are_discounted_by_their_own_dates() {
    let flows = vec![
        flow("2020-01-01", dec!(-1000.00)),
        flow("2020-07-01", dec!(-500.00)),
        flow("2021-12-31", dec!(1700.00)),
    ];
    let rate = internal_rate_of_return(&flows).unwrap();
    // All money in, more money out: a positive annualized rate exists.
    assert!(rate > dec!(0.0) && rate < dec!(0.20), "rate was {rate}");
}

#[test]
fn one_sided_series_has_no_rate() {
    let flows = vec![
        flow("2020-01-01", dec!(-1000.00)),
        flow("2020-12-31", dec!(-500.00)),
    ];
    assert_eq!(
        internal_rate_of_return(&flows),
        Err(ReturnsError::InsufficientData)
    );
}

#[test]
fn single_flow_is_insufficient() {
    let flows = vec![flow("2020-01-01", dec!(-1000.00))];
    assert_eq!(
        internal_rate_of_return(&flows),
        Err(ReturnsError::InsufficientData)
    );
}
