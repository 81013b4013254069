//! Calculation logic for the payroll engine.
//!
//! This module contains the individual pay stub steps: gross pay, progressive
//! bracket evaluation, federal and state income tax withholding, Social
//! Security with its annual wage base, and Medicare with the additional
//! high-earner tax. [`PayStubAssembler`] runs them in order and records an
//! audit step for each.

mod bracket;
mod fica;
mod gross_pay;
mod pay_stub;
mod rounding;
mod withholding;

pub use bracket::{cumulative_flat_amounts, progressive_tax};
pub use fica::{
    ADDITIONAL_MEDICARE_RATE, ADDITIONAL_MEDICARE_THRESHOLD, MEDICARE_RATE, MedicareResult,
    SOCIAL_SECURITY_RATE, SocialSecurityResult, calculate_medicare, calculate_social_security,
};
pub use gross_pay::{GrossPayResult, OVERTIME_MULTIPLIER, calculate_gross_pay};
pub use pay_stub::PayStubAssembler;
pub use rounding::round_to_cents;
pub use withholding::{
    FEDERAL_ALLOWANCE_AMOUNT, STATE_ALLOWANCE_AMOUNT, WithholdingResult,
    calculate_federal_withholding, calculate_state_withholding,
};
