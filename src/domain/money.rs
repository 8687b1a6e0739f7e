//! Monetary helpers.
//!
//! All amounts are `rust_decimal::Decimal` in major units ("12.34" EUR).
//! The banking API speaks minor units (cents); the conversions live here so
//! no adapter does its own cent arithmetic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default settlement currency for the storefront.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Convert a major-unit amount into integer minor units (cents).
///
/// Rounds half-up to two decimal places first, so `10.005` becomes `1001`.
/// Returns `None` if the amount does not fit an `i64` (never the case for
/// real payouts).
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount.round_dp(2) * dec!(100)).to_i64()
}

/// Convert integer minor units back into a major-unit amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::from(minor) / dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_unit_round_trip() {
        assert_eq!(to_minor_units(dec!(92.00)), Some(9200));
        assert_eq!(to_minor_units(dec!(0.01)), Some(1));
        assert_eq!(from_minor_units(9200), dec!(92.00));
    }

    #[test]
    fn sub_cent_amounts_round_half_up() {
        assert_eq!(to_minor_units(dec!(10.005)), Some(1001));
        assert_eq!(to_minor_units(dec!(10.004)), Some(1000));
    }
}
