//! Request types for the payroll engine API.
//!
//! Batch requests reuse [`BatchPayrollRequest`](crate::models::BatchPayrollRequest)
//! directly; this module only adds the single pay stub envelope.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, EmployeePayInput, YtdTotals};

/// Request body for the `/pay-stubs/calculate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayStubRequest {
    /// The employee being paid.
    pub employee: Employee,
    /// Regular hours worked.
    #[serde(default)]
    pub regular_hours: Decimal,
    /// Overtime hours worked.
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
    /// The pay date. Defaults to today when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_date: Option<NaiveDate>,
}

impl From<PayStubRequest> for EmployeePayInput {
    fn from(req: PayStubRequest) -> Self {
        EmployeePayInput {
            employee: req.employee,
            regular_hours: req.regular_hours,
            overtime_hours: req.overtime_hours,
            other_earnings: req.other_earnings,
            other_deductions: req.other_deductions,
            ytd_totals: req.ytd_totals,
            work_states: None,
            reciprocity_agreements: None,
        }
    }
}
