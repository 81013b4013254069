//! Federal and state income tax withholding.
//!
//! Both calculations annualize the period's gross pay, subtract a fixed
//! amount per allowance, compute an annual tax and divide it back over the
//! pay periods in a year.
//!
//! ## Federal
//!
//! Progressive brackets for the pay date's tax year and the employee's
//! filing status, with $4,300 per allowance.
//!
//! ## State
//!
//! A single effective rate per state with $2,000 per allowance. States with
//! progressive schedules are still withheld at their flat effective rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TaxTableProvider;
use crate::models::{AuditStep, FilingStatus, PayFrequency};

use super::{progressive_tax, round_to_cents};

/// Annual federal income exempted per withholding allowance.
pub const FEDERAL_ALLOWANCE_AMOUNT: Decimal = Decimal::from_parts(4300, 0, 0, false, 0);

/// Annual state income exempted per withholding allowance.
pub const STATE_ALLOWANCE_AMOUNT: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// The result of a withholding calculation for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    /// Amount withheld this period, rounded to cents.
    pub amount: Decimal,
    /// Gross pay annualized over the pay frequency.
    pub annual_income: Decimal,
    /// Annualized income after allowances, floored at zero.
    pub taxable_income: Decimal,
    /// Unrounded annual tax on `taxable_income`.
    pub annual_tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Annualized income less `allowances x per_allowance`, floored at zero.
fn taxable_after_allowances(annual_income: Decimal, allowances: u32, per_allowance: Decimal) -> Decimal {
    (annual_income - Decimal::from(allowances) * per_allowance).max(Decimal::ZERO)
}

/// Calculates federal income tax withholding for one pay period.
///
/// # Arguments
///
/// * `gross_pay` - Gross pay for the period
/// * `frequency` - The employee's pay frequency
/// * `filing_status` - Federal filing status (unrecognized statuses use `single`)
/// * `allowances` - Number of federal allowances
/// * `pay_date` - Pay date; its calendar year selects the bracket table
/// * `provider` - Tax table source
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_federal_withholding;
/// use payroll_engine::config::TaxTableProvider;
/// use payroll_engine::models::{FilingStatus, PayFrequency};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let provider = TaxTableProvider::builtin().unwrap();
/// let pay_date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
///
/// // $2,000 biweekly = $52,000/year; 5578.5 + (52000 - 48475) x 22% = 6354; / 26
/// let result = calculate_federal_withholding(
///     Decimal::from(2000),
///     PayFrequency::Biweekly,
///     &FilingStatus::Single,
///     0,
///     pay_date,
///     &provider,
///     1,
/// );
/// assert_eq!(result.amount, Decimal::from_str("244.38").unwrap());
/// ```
pub fn calculate_federal_withholding(
    gross_pay: Decimal,
    frequency: PayFrequency,
    filing_status: &FilingStatus,
    allowances: u32,
    pay_date: NaiveDate,
    provider: &TaxTableProvider,
    step_number: u32,
) -> WithholdingResult {
    let periods = frequency.periods_per_year();
    let tax_year = TaxTableProvider::tax_year(pay_date);
    let table_year = provider
        .federal_table(tax_year)
        .map(|table| table.year)
        .unwrap_or(tax_year);

    let annual_income = gross_pay * periods;
    let taxable_income =
        taxable_after_allowances(annual_income, allowances, FEDERAL_ALLOWANCE_AMOUNT);
    let annual_tax = progressive_tax(taxable_income, provider.brackets(tax_year, filing_status));
    let amount = round_to_cents(annual_tax / periods);

    let audit_step = AuditStep {
        step_number,
        rule_id: "federal_withholding".to_string(),
        rule_name: "Federal Income Tax Withholding".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "pay_frequency": frequency,
            "filing_status": filing_status,
            "allowances": allowances,
            "tax_year": tax_year,
            "table_year": table_year
        }),
        output: serde_json::json!({
            "annual_income": annual_income.normalize().to_string(),
            "taxable_income": taxable_income.normalize().to_string(),
            "annual_tax": annual_tax.normalize().to_string(),
            "amount": amount.to_string()
        }),
        reasoning: format!(
            "${} x {} = ${} annual; less {} x ${} allowances = ${} taxable; \
             {} {} brackets give ${} / {} = ${}",
            gross_pay,
            periods,
            annual_income.normalize(),
            allowances,
            FEDERAL_ALLOWANCE_AMOUNT,
            taxable_income.normalize(),
            table_year,
            filing_status,
            annual_tax.normalize(),
            periods,
            amount
        ),
    };

    WithholdingResult {
        amount,
        annual_income,
        taxable_income,
        annual_tax,
        audit_step,
    }
}

/// Calculates state income tax withholding for one pay period.
///
/// Returns zero when there is no state code, the state is unknown, or the
/// state's rate is zero.
///
/// # Arguments
///
/// * `gross_pay` - Gross pay for the period
/// * `frequency` - The employee's pay frequency
/// * `state_code` - Two-letter state code, if any
/// * `filing_status` - State filing status (recorded; the flat rate ignores it)
/// * `allowances` - Number of state allowances
/// * `provider` - Tax table source
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_state_withholding;
/// use payroll_engine::config::TaxTableProvider;
/// use payroll_engine::models::{FilingStatus, PayFrequency};
/// use rust_decimal::Decimal;
///
/// let provider = TaxTableProvider::builtin().unwrap();
/// let result = calculate_state_withholding(
///     Decimal::from(2000),
///     PayFrequency::Biweekly,
///     Some("TX"),
///     &FilingStatus::Single,
///     0,
///     &provider,
///     1,
/// );
/// assert_eq!(result.amount, Decimal::ZERO);
/// ```
pub fn calculate_state_withholding(
    gross_pay: Decimal,
    frequency: PayFrequency,
    state_code: Option<&str>,
    filing_status: &FilingStatus,
    allowances: u32,
    provider: &TaxTableProvider,
    step_number: u32,
) -> WithholdingResult {
    let rate = provider.state_rate(state_code);
    let input = serde_json::json!({
        "gross_pay": gross_pay.to_string(),
        "pay_frequency": frequency,
        "state_code": state_code,
        "filing_status": filing_status,
        "allowances": allowances,
        "rate": rate.normalize().to_string()
    });

    if rate.is_zero() {
        let amount = round_to_cents(Decimal::ZERO);
        let reasoning = match state_code {
            Some(code) => format!("No state income tax withheld - {} has no wage tax rate", code),
            None => "No state income tax withheld - no state code".to_string(),
        };
        return WithholdingResult {
            amount,
            annual_income: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            annual_tax: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "state_withholding".to_string(),
                rule_name: "State Income Tax Withholding".to_string(),
                input,
                output: serde_json::json!({
                    "amount": amount.to_string(),
                    "withheld": false
                }),
                reasoning,
            },
        };
    }

    let periods = frequency.periods_per_year();
    let annual_income = gross_pay * periods;
    let taxable_income = taxable_after_allowances(annual_income, allowances, STATE_ALLOWANCE_AMOUNT);
    let annual_tax = taxable_income * rate;
    let amount = round_to_cents(annual_tax / periods);

    let audit_step = AuditStep {
        step_number,
        rule_id: "state_withholding".to_string(),
        rule_name: "State Income Tax Withholding".to_string(),
        input,
        output: serde_json::json!({
            "annual_income": annual_income.normalize().to_string(),
            "taxable_income": taxable_income.normalize().to_string(),
            "annual_tax": annual_tax.normalize().to_string(),
            "amount": amount.to_string(),
            "withheld": true
        }),
        reasoning: format!(
            "(${} - {} x ${}) x {} = ${} / {} = ${}",
            annual_income.normalize(),
            allowances,
            STATE_ALLOWANCE_AMOUNT,
            rate.normalize(),
            annual_tax.normalize(),
            periods,
            amount
        ),
    };

    WithholdingResult {
        amount,
        annual_income,
        taxable_income,
        annual_tax,
        audit_step,
    }
}
