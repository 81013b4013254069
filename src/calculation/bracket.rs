//! Progressive bracket tax calculation.
//!
//! Tax on an annual income is the selected bracket's `flat_amount` plus the
//! income inside that bracket at the bracket's marginal rate. Tables carry
//! the cumulative tax of lower brackets precomputed in `flat_amount`;
//! [`cumulative_flat_amounts`] derives those values so tables can be checked.

use rust_decimal::Decimal;

use crate::config::TaxBracket;

/// Computes the annual tax owed on `annual_income` under `brackets`.
///
/// Brackets are scanned from the highest down and the first whose `min` is
/// strictly below the income is used. The result is not rounded.
///
/// # Arguments
///
/// * `annual_income` - Annualized taxable income
/// * `brackets` - Contiguous brackets in ascending order of `min`
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::progressive_tax;
/// use payroll_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket { min: Decimal::ZERO, max: Some(Decimal::from(10000)), rate: Decimal::new(10, 2), flat_amount: Decimal::ZERO },
///     TaxBracket { min: Decimal::from(10000), max: None, rate: Decimal::new(20, 2), flat_amount: Decimal::from(1000) },
/// ];
///
/// assert_eq!(progressive_tax(Decimal::from(15000), &brackets), Decimal::from(2000));
/// assert_eq!(progressive_tax(Decimal::ZERO, &brackets), Decimal::ZERO);
/// ```
pub fn progressive_tax(annual_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if annual_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let Some(bracket) = brackets.iter().rev().find(|b| b.min < annual_income) else {
        return Decimal::ZERO;
    };

    let ceiling = bracket.max.unwrap_or(annual_income).min(annual_income);
    let taxable_in_bracket = ceiling - bracket.min;

    bracket.flat_amount + taxable_in_bracket * bracket.rate
}

/// Returns the `flat_amount` each bracket should carry: the tax owed on an
/// income equal to the bracket's `min`.
///
/// Assumes the brackets are contiguous; an open-ended bracket below the top
/// contributes nothing to the brackets above it.
pub fn cumulative_flat_amounts(brackets: &[TaxBracket]) -> Vec<Decimal> {
    let mut running = Decimal::ZERO;
    brackets
        .iter()
        .map(|bracket| {
            let flat = running;
            if let Some(max) = bracket.max {
                running += (max - bracket.min) * bracket.rate;
            }
            flat
        })
        .collect()
}
