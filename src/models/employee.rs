//! Employee model and related types.
//!
//! This module defines the Employee struct together with the pay type,
//! pay frequency and filing status enums that drive gross pay and
//! withholding calculations.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest accepted pay rate or money amount on a single input (one billion).
///
/// Keeps annualized and multiplied amounts far inside `Decimal`'s range.
pub const MAX_PAY_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest accepted hour count for one pay period.
pub const MAX_PERIOD_HOURS: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// How an employee's pay rate is interpreted.
///
/// Accepts both `hourly` and `Hourly` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// `pay_rate` is an hourly rate; overtime is paid at 1.5x.
    #[serde(alias = "Hourly")]
    Hourly,
    /// `pay_rate` is an annual salary split evenly across pay periods.
    #[serde(alias = "Salary")]
    Salary,
}

/// How often an employee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// 52 pay periods per year.
    #[serde(alias = "Weekly")]
    Weekly,
    /// 26 pay periods per year.
    #[serde(alias = "Biweekly", alias = "BiWeekly")]
    Biweekly,
    /// 24 pay periods per year.
    #[serde(alias = "Semimonthly", alias = "SemiMonthly")]
    Semimonthly,
    /// 12 pay periods per year.
    #[serde(alias = "Monthly")]
    Monthly,
}

impl PayFrequency {
    /// Returns the number of pay periods in a year for this frequency.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::PayFrequency;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(PayFrequency::Biweekly.periods_per_year(), Decimal::from(26));
    /// assert_eq!(PayFrequency::Semimonthly.periods_per_year(), Decimal::from(24));
    /// ```
    pub fn periods_per_year(self) -> Decimal {
        let periods: u32 = match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Semimonthly => 24,
            PayFrequency::Monthly => 12,
        };
        Decimal::from(periods)
    }
}

/// Filing status used to select a bracket table.
///
/// Known statuses match case-insensitively and ignore `_`, `-` and spaces,
/// so `MarriedFilingJointly` and `married_filing_jointly` are the same
/// status. Any other value deserializes to [`FilingStatus::Unrecognized`]
/// holding the original text, which serializes back unchanged. Tax lookups
/// treat an unrecognized status as [`FilingStatus::Single`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilingStatus {
    /// Single filer.
    Single,
    /// Married filing jointly.
    MarriedFilingJointly,
    /// Married filing separately.
    MarriedFilingSeparately,
    /// Head of household.
    HeadOfHousehold,
    /// A status this engine has no table for, as it was received.
    Unrecognized(String),
}

impl FilingStatus {
    /// Returns the wire name of this status.
    pub fn as_str(&self) -> &str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married_filing_jointly",
            FilingStatus::MarriedFilingSeparately => "married_filing_separately",
            FilingStatus::HeadOfHousehold => "head_of_household",
            FilingStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for FilingStatus {
    fn from(value: String) -> Self {
        let key: String = value
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "single" => FilingStatus::Single,
            "marriedfilingjointly" => FilingStatus::MarriedFilingJointly,
            "marriedfilingseparately" => FilingStatus::MarriedFilingSeparately,
            "headofhousehold" => FilingStatus::HeadOfHousehold,
            _ => FilingStatus::Unrecognized(value),
        }
    }
}

impl From<FilingStatus> for String {
    fn from(value: FilingStatus) -> Self {
        match value {
            FilingStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an employee on a pay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// How `pay_rate` is interpreted.
    pub pay_type: PayType,
    /// Hourly rate for hourly employees, annual salary for salaried ones.
    pub pay_rate: Decimal,
    /// How often the employee is paid.
    pub pay_frequency: PayFrequency,
    /// Federal filing status.
    pub federal_filing_status: FilingStatus,
    /// Number of federal withholding allowances.
    #[serde(default)]
    pub federal_allowances: u32,
    /// Two-letter state code, if the employee is subject to state tax.
    #[serde(default)]
    pub state_code: Option<String>,
    /// State filing status; the federal status applies when unset.
    #[serde(default)]
    pub state_filing_status: Option<FilingStatus>,
    /// Number of state withholding allowances.
    #[serde(default)]
    pub state_allowances: u32,
}

impl Employee {
    /// Returns true if the employee is paid by the hour.
    ///
    /// # Examples
    ///
    /// ```
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
    /// assert!(employee.is_hourly());
    /// ```
    pub fn is_hourly(&self) -> bool {
        self.pay_type == PayType::Hourly
    }

    /// Returns the number of pay periods per year for this employee.
    pub fn periods_per_year(&self) -> Decimal {
        self.pay_frequency.periods_per_year()
    }

    /// Returns the filing status used for state withholding.
    pub fn effective_state_filing_status(&self) -> &FilingStatus {
        self.state_filing_status
            .as_ref()
            .unwrap_or(&self.federal_filing_status)
    }

    /// Rejects employee records that cannot produce a meaningful pay stub.
    ///
    /// The calculators themselves accept any input; callers that want
    /// negative or oversized rates rejected up front call this first.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidEmployee {
                field: "id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.pay_rate < Decimal::ZERO {
            return Err(EngineError::InvalidEmployee {
                field: "payRate".to_string(),
                message: format!("must not be negative (got {})", self.pay_rate),
            });
        }
        if self.pay_rate > MAX_PAY_AMOUNT {
            return Err(EngineError::InvalidEmployee {
                field: "payRate".to_string(),
                message: format!("must not exceed {} (got {})", MAX_PAY_AMOUNT, self.pay_rate),
            });
        }
        Ok(())
    }
}
