//! Core data models for the payroll withholding engine.
//!
//! This module contains the request and result types shared by the
//! calculators, the batch orchestrator and the HTTP API.

mod batch;
mod employee;
mod pay_stub;
mod ytd;

pub use batch::{
    BatchPayrollRequest, BatchPayrollResponse, BatchSummary, CalculationSource, EmployeePayInput,
    ReciprocityAgreement, WorkStateAllocation,
};
pub use employee::{
    Employee, FilingStatus, PayFrequency, PayType, MAX_PAY_AMOUNT, MAX_PERIOD_HOURS,
};
pub use pay_stub::{AuditStep, PayStubCalculation};
pub use ytd::YtdTotals;
