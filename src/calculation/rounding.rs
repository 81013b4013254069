//! Cent rounding shared by every monetary figure.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to two decimal places, halves away from zero.
///
/// The result always carries a scale of two so amounts serialize as `"62.00"`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_to_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cents(Decimal::from_str("223.2").unwrap()), Decimal::from_str("223.20").unwrap());
/// assert_eq!(round_to_cents(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// ```
pub fn round_to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
