//! Social Security and Medicare withholding with year-to-date thresholds.
//!
//! ## Social Security
//!
//! 6.2% of wages up to the year's wage base. Once year-to-date gross pay
//! reaches the base nothing more is withheld; a period that straddles the
//! base is taxed only on the portion below it.
//!
//! ## Medicare
//!
//! 1.45% of all wages, plus the 0.9% Additional Medicare Tax on the part of
//! this period's wages that takes year-to-date gross above $200,000.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TaxTableProvider;
use crate::models::AuditStep;

use super::round_to_cents;

/// Employee Social Security rate (6.2%).
pub const SOCIAL_SECURITY_RATE: Decimal = Decimal::from_parts(62, 0, 0, false, 3);

/// Employee Medicare rate (1.45%).
pub const MEDICARE_RATE: Decimal = Decimal::from_parts(145, 0, 0, false, 4);

/// Additional Medicare Tax rate (0.9%).
pub const ADDITIONAL_MEDICARE_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 3);

/// Year-to-date wages above which Additional Medicare Tax applies.
pub const ADDITIONAL_MEDICARE_THRESHOLD: Decimal = Decimal::from_parts(200_000, 0, 0, false, 0);

/// The result of a Social Security calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityResult {
    /// Amount withheld this period, rounded to cents.
    pub amount: Decimal,
    /// The portion of this period's gross pay subject to the tax.
    pub taxable_wages: Decimal,
    /// The wage base that applied.
    pub wage_base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of a Medicare calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicareResult {
    /// Amount withheld this period, rounded to cents.
    pub amount: Decimal,
    /// Unrounded 1.45% tax on all of this period's wages.
    pub standard_tax: Decimal,
    /// Unrounded 0.9% tax on wages above the threshold.
    pub additional_tax: Decimal,
    /// The portion of this period's wages subject to the additional tax.
    pub additional_wages: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates Social Security withholding for one pay period.
///
/// # Arguments
///
/// * `gross_pay` - Gross pay for the period
/// * `ytd_gross_pay` - Gross pay earlier in the year, before this period
/// * `pay_date` - Pay date; its calendar year selects the wage base
/// * `provider` - Tax table source
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_social_security;
/// use payroll_engine::config::TaxTableProvider;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let provider = TaxTableProvider::builtin().unwrap();
/// let pay_date = NaiveDate::from_ymd_opt(2024, 11, 29).unwrap();
///
/// // Only 168600 - 165000 = 3600 of the 5000 is below the 2024 wage base.
/// let result = calculate_social_security(
///     Decimal::from(5000),
///     Decimal::from(165000),
///     pay_date,
///     &provider,
///     1,
/// );
/// assert_eq!(result.amount, Decimal::from_str("223.20").unwrap());
/// ```
pub fn calculate_social_security(
    gross_pay: Decimal,
    ytd_gross_pay: Decimal,
    pay_date: NaiveDate,
    provider: &TaxTableProvider,
    step_number: u32,
) -> SocialSecurityResult {
    let tax_year = TaxTableProvider::tax_year(pay_date);
    let wage_base = provider.social_security_wage_base(tax_year);

    let (taxable_wages, reasoning) = if ytd_gross_pay >= wage_base {
        (
            Decimal::ZERO,
            format!(
                "YTD gross ${} has reached the {} wage base of ${}",
                ytd_gross_pay, tax_year, wage_base
            ),
        )
    } else {
        let remaining = wage_base - ytd_gross_pay;
        let taxable = gross_pay.min(remaining);
        (
            taxable,
            format!(
                "min(${}, ${} remaining under ${} base) x {} = ${}",
                gross_pay,
                remaining,
                wage_base,
                SOCIAL_SECURITY_RATE,
                (taxable * SOCIAL_SECURITY_RATE).normalize()
            ),
        )
    };

    let amount = round_to_cents(taxable_wages * SOCIAL_SECURITY_RATE);

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security".to_string(),
        rule_name: "Social Security".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "ytd_gross_pay": ytd_gross_pay.to_string(),
            "tax_year": tax_year,
            "wage_base": wage_base.to_string()
        }),
        output: serde_json::json!({
            "taxable_wages": taxable_wages.normalize().to_string(),
            "amount": amount.to_string(),
            "capped": taxable_wages < gross_pay
        }),
        reasoning,
    };

    SocialSecurityResult {
        amount,
        taxable_wages,
        wage_base,
        audit_step,
    }
}

/// Calculates Medicare withholding, including Additional Medicare Tax, for
/// one pay period.
///
/// Both parts are computed unrounded and the total is rounded once.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_medicare;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// // 10000 x 1.45% + 5000 x 0.9% = 145 + 45
/// let result = calculate_medicare(Decimal::from(10000), Decimal::from(195000), 1);
/// assert_eq!(result.amount, Decimal::from_str("190.00").unwrap());
/// ```
pub fn calculate_medicare(gross_pay: Decimal, ytd_gross_pay: Decimal, step_number: u32) -> MedicareResult {
    let standard_tax = gross_pay * MEDICARE_RATE;

    let new_ytd = ytd_gross_pay + gross_pay;
    let additional_wages = if new_ytd > ADDITIONAL_MEDICARE_THRESHOLD {
        gross_pay.min(new_ytd - ADDITIONAL_MEDICARE_THRESHOLD)
    } else {
        Decimal::ZERO
    };
    let additional_tax = additional_wages * ADDITIONAL_MEDICARE_RATE;

    let amount = round_to_cents(standard_tax + additional_tax);

    let reasoning = if additional_wages.is_zero() {
        format!(
            "${} x {} = ${}",
            gross_pay,
            MEDICARE_RATE,
            standard_tax.normalize()
        )
    } else {
        format!(
            "${} x {} = ${}; YTD ${} crosses ${} so ${} x {} = ${} additional",
            gross_pay,
            MEDICARE_RATE,
            standard_tax.normalize(),
            new_ytd,
            ADDITIONAL_MEDICARE_THRESHOLD,
            additional_wages,
            ADDITIONAL_MEDICARE_RATE,
            additional_tax.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "medicare".to_string(),
        rule_name: "Medicare".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "ytd_gross_pay": ytd_gross_pay.to_string()
        }),
        output: serde_json::json!({
            "standard_tax": standard_tax.normalize().to_string(),
            "additional_wages": additional_wages.normalize().to_string(),
            "additional_tax": additional_tax.normalize().to_string(),
            "amount": amount.to_string()
        }),
        reasoning,
    };

    MedicareResult {
        amount,
        standard_tax,
        additional_tax,
        additional_wages,
        audit_step,
    }
}
