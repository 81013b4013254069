//! Pay stub assembly.
//!
//! Runs gross pay, federal and state withholding, Social Security and
//! Medicare for one employee and combines them into a
//! [`PayStubCalculation`]. Assembly is a pure function of its inputs, so
//! pay stubs for different employees can be computed independently.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::TaxTableProvider;
use crate::models::{AuditStep, Employee, EmployeePayInput, PayStubCalculation, YtdTotals};

use super::{
    calculate_federal_withholding, calculate_gross_pay, calculate_medicare,
    calculate_social_security, calculate_state_withholding, round_to_cents,
};

/// Builds pay stubs from employee inputs using a shared set of tax tables.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::calculation::PayStubAssembler;
/// use payroll_engine::config::TaxTableProvider;
/// use payroll_engine::models::{Employee, FilingStatus, PayFrequency, PayType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let assembler = PayStubAssembler::new(Arc::new(TaxTableProvider::builtin().unwrap()));
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     pay_type: PayType::Salary,
///     pay_rate: Decimal::from(52000),
///     pay_frequency: PayFrequency::Biweekly,
///     federal_filing_status: FilingStatus::Single,
///     federal_allowances: 0,
///     state_code: Some("TX".to_string()),
///     state_filing_status: None,
///     state_allowances: 0,
/// };
///
/// let stub = assembler.assemble(
///     &employee,
///     Decimal::from(80),
///     Decimal::ZERO,
///     Decimal::ZERO,
///     Decimal::ZERO,
///     None,
///     NaiveDate::from_ymd_opt(2025, 3, 14),
/// );
/// assert_eq!(stub.gross_pay, Decimal::from(2000));
/// assert_eq!(stub.net_pay, stub.gross_pay - stub.total_deductions);
/// ```
#[derive(Debug, Clone)]
pub struct PayStubAssembler {
    provider: Arc<TaxTableProvider>,
}

impl PayStubAssembler {
    /// Creates an assembler over the given tax tables.
    pub fn new(provider: Arc<TaxTableProvider>) -> Self {
        Self { provider }
    }

    /// Returns the tax tables this assembler uses.
    pub fn provider(&self) -> &TaxTableProvider {
        &self.provider
    }

    /// Calculates one employee's pay stub for a pay period.
    ///
    /// # Arguments
    ///
    /// * `employee` - The employee being paid
    /// * `regular_hours` - Regular hours worked
    /// * `overtime_hours` - Overtime hours worked
    /// * `other_earnings` - Additional earnings for the period
    /// * `other_deductions` - Additional deductions for the period
    /// * `ytd` - Totals as of the start of the period; `None` means all zero
    /// * `pay_date` - The pay date; `None` means today (UTC)
    ///
    /// # Returns
    ///
    /// A [`PayStubCalculation`] whose audit trail lists the six steps in
    /// order: gross pay, federal, state, Social Security, Medicare, totals.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        &self,
        employee: &Employee,
        regular_hours: Decimal,
        overtime_hours: Decimal,
        other_earnings: Decimal,
        other_deductions: Decimal,
        ytd: Option<&YtdTotals>,
        pay_date: Option<NaiveDate>,
    ) -> PayStubCalculation {
        let pay_date = pay_date.unwrap_or_else(|| Utc::now().date_naive());
        let ytd_gross_pay = ytd.map(|totals| totals.gross_pay).unwrap_or(Decimal::ZERO);
        let provider = self.provider();

        let gross = calculate_gross_pay(employee, regular_hours, overtime_hours, other_earnings, 1);
        let gross_pay = gross.gross_pay;

        let federal = calculate_federal_withholding(
            gross_pay,
            employee.pay_frequency,
            &employee.federal_filing_status,
            employee.federal_allowances,
            pay_date,
            provider,
            2,
        );

        let state = calculate_state_withholding(
            gross_pay,
            employee.pay_frequency,
            employee.state_code.as_deref(),
            employee.effective_state_filing_status(),
            employee.state_allowances,
            provider,
            3,
        );

        let social_security =
            calculate_social_security(gross_pay, ytd_gross_pay, pay_date, provider, 4);
        let medicare = calculate_medicare(gross_pay, ytd_gross_pay, 5);

        let other_deductions = round_to_cents(other_deductions);
        let total_deductions = round_to_cents(
            federal.amount
                + state.amount
                + social_security.amount
                + medicare.amount
                + other_deductions,
        );
        let net_pay = round_to_cents(gross_pay - total_deductions);

        let totals_step = AuditStep {
            step_number: 6,
            rule_id: "net_pay".to_string(),
            rule_name: "Net Pay".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.to_string(),
                "federal_withholding": federal.amount.to_string(),
                "state_withholding": state.amount.to_string(),
                "social_security": social_security.amount.to_string(),
                "medicare": medicare.amount.to_string(),
                "other_deductions": other_deductions.to_string()
            }),
            output: serde_json::json!({
                "total_deductions": total_deductions.to_string(),
                "net_pay": net_pay.to_string()
            }),
            reasoning: format!(
                "${} - (${} + ${} + ${} + ${} + ${}) = ${}",
                gross_pay,
                federal.amount,
                state.amount,
                social_security.amount,
                medicare.amount,
                other_deductions,
                net_pay
            ),
        };

        PayStubCalculation {
            employee_id: employee.id.clone(),
            pay_date,
            regular_hours,
            overtime_hours,
            regular_pay: gross.regular_pay,
            overtime_pay: gross.overtime_pay,
            other_earnings: round_to_cents(other_earnings),
            gross_pay,
            federal_withholding: federal.amount,
            state_withholding: state.amount,
            social_security: social_security.amount,
            medicare: medicare.amount,
            other_deductions,
            total_deductions,
            net_pay,
            audit: vec![
                gross.audit_step,
                federal.audit_step,
                state.audit_step,
                social_security.audit_step,
                medicare.audit_step,
                totals_step,
            ],
        }
    }

    /// Calculates the pay stub for one entry of a pay run.
    pub fn assemble_input(&self, input: &EmployeePayInput, pay_date: NaiveDate) -> PayStubCalculation {
        self.assemble(
            &input.employee,
            input.regular_hours,
            input.overtime_hours,
            input.other_earnings,
            input.other_deductions,
            input.ytd_totals.as_ref(),
            Some(pay_date),
        )
    }
}
