//! Pay stub result models.
//!
//! This module contains the [`PayStubCalculation`] type that captures every
//! output of a single employee's pay period calculation, and the
//! [`AuditStep`] records explaining how each figure was reached.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of one employee's pay period calculation.
///
/// Every monetary field is rounded to cents on its own before any sum is
/// taken, so `net_pay == gross_pay - total_deductions` holds exactly.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayStubCalculation;
/// use rust_decimal::Decimal;
/// use chrono::NaiveDate;
///
/// let stub = PayStubCalculation {
///     employee_id: "emp_001".to_string(),
///     pay_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
///     regular_hours: Decimal::from(40),
///     overtime_hours: Decimal::ZERO,
///     regular_pay: Decimal::from(800),
///     overtime_pay: Decimal::ZERO,
///     other_earnings: Decimal::ZERO,
///     gross_pay: Decimal::from(800),
///     federal_withholding: Decimal::new(5000, 2),
///     state_withholding: Decimal::ZERO,
///     social_security: Decimal::new(4960, 2),
///     medicare: Decimal::new(1160, 2),
///     other_deductions: Decimal::ZERO,
///     total_deductions: Decimal::new(11120, 2),
///     net_pay: Decimal::new(68880, 2),
///     audit: vec![],
/// };
/// assert!(stub.is_balanced());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayStubCalculation {
    /// The employee this calculation belongs to.
    pub employee_id: String,
    /// The pay date the calculation was made for.
    pub pay_date: NaiveDate,
    /// Regular hours supplied for the period.
    pub regular_hours: Decimal,
    /// Overtime hours supplied for the period.
    pub overtime_hours: Decimal,
    /// Pay for regular hours, or the per-period salary.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Additional earnings (bonus, commission, reimbursements).
    pub other_earnings: Decimal,
    /// Total earnings before deductions.
    pub gross_pay: Decimal,
    /// Federal income tax withheld.
    pub federal_withholding: Decimal,
    /// State income tax withheld.
    pub state_withholding: Decimal,
    /// Employee Social Security tax.
    pub social_security: Decimal,
    /// Employee Medicare tax, including any Additional Medicare Tax.
    pub medicare: Decimal,
    /// Voluntary or other deductions supplied by the caller.
    pub other_deductions: Decimal,
    /// Sum of all withholdings and deductions.
    pub total_deductions: Decimal,
    /// Gross pay less total deductions.
    pub net_pay: Decimal,
    /// How each figure was reached, in calculation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit: Vec<AuditStep>,
}

impl PayStubCalculation {
    /// Returns the taxes withheld, excluding caller-supplied deductions.
    pub fn total_taxes(&self) -> Decimal {
        self.federal_withholding + self.state_withholding + self.social_security + self.medicare
    }

    /// Returns true if deductions and net pay add back up to gross pay.
    pub fn is_balanced(&self) -> bool {
        self.total_deductions == self.total_taxes() + self.other_deductions
            && self.net_pay == self.gross_pay - self.total_deductions
    }
}
