/// Decimal precision for internal calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for currency amounts (minor currency unit)
pub const MONEY_SCALE: u32 = 2;

/// Assets acquired on or before this date are eligible for the
/// indexation capital-gains method.
pub const INDEXATION_CUTOFF: &str = "1999-09-21";

/// Minimum holding period, in days, for the CGT discount method.
pub const DISCOUNT_HOLDING_DAYS: i64 = 365;
