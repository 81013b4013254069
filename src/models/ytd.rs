//! Year-to-date totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayStubCalculation;

/// Cumulative totals for the tax year as of the start of a pay period.
///
/// The engine never persists these; the caller stores them between periods.
/// A missing value is the same as all zeros, i.e. the first period of the year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YtdTotals {
    /// Gross pay so far this year.
    pub gross_pay: Decimal,
    /// Federal income tax withheld so far this year.
    pub federal_withholding: Decimal,
    /// State income tax withheld so far this year.
    pub state_withholding: Decimal,
    /// Social Security withheld so far this year.
    pub social_security: Decimal,
    /// Medicare withheld so far this year.
    pub medicare: Decimal,
    /// Net pay so far this year.
    pub net_pay: Decimal,
}

impl YtdTotals {
    /// Returns the totals as of the start of the period after `stub`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::YtdTotals;
    /// use rust_decimal::Decimal;
    ///
    /// let ytd = YtdTotals::default();
    /// assert_eq!(ytd.gross_pay, Decimal::ZERO);
    /// ```
    pub fn advance(&self, stub: &PayStubCalculation) -> YtdTotals {
        YtdTotals {
            gross_pay: self.gross_pay + stub.gross_pay,
            federal_withholding: self.federal_withholding + stub.federal_withholding,
            state_withholding: self.state_withholding + stub.state_withholding,
            social_security: self.social_security + stub.social_security,
            medicare: self.medicare + stub.medicare,
            net_pay: self.net_pay + stub.net_pay,
        }
    }
}
