//! Batch pay run envelope.
//!
//! These types are both the input to the local batch path and the JSON
//! contract with the remote calculation service, so field names follow the
//! service's camelCase wire format.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Employee, PayStubCalculation, YtdTotals, MAX_PAY_AMOUNT, MAX_PERIOD_HOURS};

/// Share of an employee's work performed in one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStateAllocation {
    /// Two-letter state code.
    pub state_code: String,
    /// Percentage of work performed in this state (0-100).
    pub percentage: Decimal,
}

/// An agreement between a resident state and a work state that suppresses
/// double withholding for cross-border workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReciprocityAgreement {
    /// The employee's state of residence.
    pub resident_state: String,
    /// The state where the work is performed.
    pub work_state: String,
}

/// One employee's inputs for a pay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayInput {
    /// The employee being paid.
    pub employee: Employee,
    /// Regular hours worked (ignored for salaried employees).
    #[serde(default)]
    pub regular_hours: Decimal,
    /// Overtime hours worked (ignored for salaried employees).
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Additional earnings for the period.
    #[serde(default)]
    pub other_earnings: Decimal,
    /// Additional deductions for the period.
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Year-to-date totals as of the start of the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ytd_totals: Option<YtdTotals>,
    /// Work performed across states. Forwarded to the remote service; the
    /// local path withholds for `employee.state_code` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_states: Option<Vec<WorkStateAllocation>>,
    /// Reciprocity agreements that apply to this employee. Forwarded only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reciprocity_agreements: Option<Vec<ReciprocityAgreement>>,
}

impl EmployeePayInput {
    /// Creates an input with no extra earnings, deductions or YTD history.
    pub fn new(employee: Employee, regular_hours: Decimal, overtime_hours: Decimal) -> Self {
        Self {
            employee,
            regular_hours,
            overtime_hours,
            other_earnings: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            ytd_totals: None,
            work_states: None,
            reciprocity_agreements: None,
        }
    }

    /// Rejects negative or oversized quantities and out-of-range work state
    /// percentages.
    pub fn validate(&self) -> EngineResult<()> {
        self.employee.validate()?;

        let quantities = [
            ("regularHours", self.regular_hours, MAX_PERIOD_HOURS),
            ("overtimeHours", self.overtime_hours, MAX_PERIOD_HOURS),
            ("otherEarnings", self.other_earnings, MAX_PAY_AMOUNT),
            ("otherDeductions", self.other_deductions, MAX_PAY_AMOUNT),
        ];
        for (field, value, max) in quantities {
            if value < Decimal::ZERO {
                return Err(EngineError::InvalidEmployee {
                    field: field.to_string(),
                    message: format!("must not be negative (got {})", value),
                });
            }
            if value > max {
                return Err(EngineError::InvalidEmployee {
                    field: field.to_string(),
                    message: format!("must not exceed {} (got {})", max, value),
                });
            }
        }

        if let Some(ytd) = &self.ytd_totals {
            if ytd.gross_pay < Decimal::ZERO {
                return Err(EngineError::InvalidEmployee {
                    field: "ytdTotals.grossPay".to_string(),
                    message: format!("must not be negative (got {})", ytd.gross_pay),
                });
            }
            let totals = [
                ("ytdTotals.grossPay", ytd.gross_pay),
                ("ytdTotals.federalWithholding", ytd.federal_withholding),
                ("ytdTotals.stateWithholding", ytd.state_withholding),
                ("ytdTotals.socialSecurity", ytd.social_security),
                ("ytdTotals.medicare", ytd.medicare),
                ("ytdTotals.netPay", ytd.net_pay),
            ];
            for (field, value) in totals {
                if value.abs() > MAX_PAY_AMOUNT {
                    return Err(EngineError::InvalidEmployee {
                        field: field.to_string(),
                        message: format!("magnitude must not exceed {} (got {})", MAX_PAY_AMOUNT, value),
                    });
                }
            }
        }

        for allocation in self.work_states.iter().flatten() {
            if allocation.percentage < Decimal::ZERO || allocation.percentage > Decimal::ONE_HUNDRED
            {
                return Err(EngineError::InvalidEmployee {
                    field: "workStates.percentage".to_string(),
                    message: format!(
                        "{} must be between 0 and 100 (got {})",
                        allocation.state_code, allocation.percentage
                    ),
                });
            }
        }

        Ok(())
    }
}

/// A pay run submitted for calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayrollRequest {
    /// Identifier of the pay run.
    pub pay_run_id: String,
    /// The pay date shared by every employee in the run.
    pub pay_date: NaiveDate,
    /// Per-employee inputs.
    pub employees: Vec<EmployeePayInput>,
}

impl BatchPayrollRequest {
    /// Validates every employee input, reporting the first failure with
    /// its position in the run.
    pub fn validate(&self) -> EngineResult<()> {
        for (index, input) in self.employees.iter().enumerate() {
            input.validate().map_err(|err| match err {
                EngineError::InvalidEmployee { field, message } => EngineError::InvalidEmployee {
                    field: format!("employees[{}].{}", index, field),
                    message,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Which computation path produced a batch response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationSource {
    /// Results came from the remote calculation service.
    #[default]
    Remote,
    /// Results were computed in-process.
    Local,
}

/// Aggregate figures for a pay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Number of employees in the run.
    pub employee_count: usize,
    /// Sum of gross pay across the run.
    pub total_gross_pay: Decimal,
    /// Sum of total deductions across the run.
    pub total_deductions: Decimal,
    /// Sum of net pay across the run.
    pub total_net_pay: Decimal,
    /// Wall-clock time spent on the batch, in milliseconds.
    pub processing_time_ms: u64,
}

/// The calculated pay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayrollResponse {
    /// Identifier of the pay run.
    pub pay_run_id: String,
    /// The pay date of the run.
    pub pay_date: NaiveDate,
    /// One calculation per employee, in request order.
    pub results: Vec<PayStubCalculation>,
    /// Aggregate figures.
    pub summary: BatchSummary,
    /// Which computation path produced these results.
    #[serde(default)]
    pub source: CalculationSource,
}
