//! Gross pay calculation.
//!
//! Hourly employees earn `hours x rate` plus overtime at 1.5x. Salaried
//! employees earn an equal share of their annual salary each period and
//! are treated as overtime-exempt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, Employee};

use super::round_to_cents;

/// Overtime is paid at 150% of the hourly rate.
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// The result of a gross pay calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossPayResult {
    /// Pay for regular hours, or the per-period salary.
    pub regular_pay: Decimal,
    /// Pay for overtime hours (always zero for salaried employees).
    pub overtime_pay: Decimal,
    /// Regular pay + overtime pay + other earnings.
    pub gross_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates regular, overtime and gross pay for one pay period.
///
/// Regular and overtime pay are each rounded to cents, and gross pay is the
/// rounded sum of those figures and `other_earnings`.
///
/// # Arguments
///
/// * `employee` - The employee being paid
/// * `regular_hours` - Regular hours worked (ignored for salaried employees)
/// * `overtime_hours` - Overtime hours worked (ignored for salaried employees)
/// * `other_earnings` - Bonus, commission or other earnings for the period
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_gross_pay;
/// use payroll_engine::models::{Employee, FilingStatus, PayFrequency, PayType};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     pay_type: PayType::Hourly,
///     pay_rate: Decimal::from(20),
///     pay_frequency: PayFrequency::Weekly,
///     federal_filing_status: FilingStatus::Single,
///     federal_allowances: 0,
///     state_code: None,
///     state_filing_status: None,
///     state_allowances: 0,
/// };
///
/// let result = calculate_gross_pay(&employee, Decimal::from(40), Decimal::from(10), Decimal::ZERO, 1);
/// assert_eq!(result.regular_pay, Decimal::from(800));
/// assert_eq!(result.overtime_pay, Decimal::from(300));
/// assert_eq!(result.gross_pay, Decimal::from(1100));
/// ```
pub fn calculate_gross_pay(
    employee: &Employee,
    regular_hours: Decimal,
    overtime_hours: Decimal,
    other_earnings: Decimal,
    step_number: u32,
) -> GrossPayResult {
    let (regular_pay, overtime_pay, reasoning) = if employee.is_hourly() {
        let regular_pay = round_to_cents(regular_hours * employee.pay_rate);
        let overtime_pay =
            round_to_cents(overtime_hours * employee.pay_rate * OVERTIME_MULTIPLIER);
        let reasoning = format!(
            "{}h x ${} = ${}; {}h overtime x ${} x {} = ${}",
            regular_hours.normalize(),
            employee.pay_rate.normalize(),
            regular_pay,
            overtime_hours.normalize(),
            employee.pay_rate.normalize(),
            OVERTIME_MULTIPLIER,
            overtime_pay
        );
        (regular_pay, overtime_pay, reasoning)
    } else {
        let periods = employee.periods_per_year();
        let regular_pay = round_to_cents(employee.pay_rate / periods);
        let reasoning = format!(
            "${} salary / {} periods = ${}; salaried employees are overtime-exempt",
            employee.pay_rate.normalize(),
            periods,
            regular_pay
        );
        (regular_pay, round_to_cents(Decimal::ZERO), reasoning)
    };

    let gross_pay = round_to_cents(regular_pay + overtime_pay + other_earnings);

    let audit_step = AuditStep {
        step_number,
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        input: serde_json::json!({
            "pay_type": employee.pay_type,
            "pay_rate": employee.pay_rate.normalize().to_string(),
            "pay_frequency": employee.pay_frequency,
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "other_earnings": other_earnings.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_pay": regular_pay.to_string(),
            "overtime_pay": overtime_pay.to_string(),
            "gross_pay": gross_pay.to_string()
        }),
        reasoning,
    };

    GrossPayResult {
        regular_pay,
        overtime_pay,
        gross_pay,
        audit_step,
    }
}
