//! Tax table loading and lookup.
//!
//! This module provides the [`TaxTableProvider`] type for loading federal
//! brackets, state rates and Social Security wage bases from YAML files,
//! and for resolving the table that applies to a pay date.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::calculation::cumulative_flat_amounts;
use crate::error::{EngineError, EngineResult};
use crate::models::FilingStatus;

use super::types::{FederalTaxTable, SocialSecurityConfig, StateTaxConfig, TaxBracket};

const BUILTIN_FEDERAL: [(&str, &str); 2] = [
    (
        "federal/2024.yaml",
        include_str!("../../config/us_payroll/federal/2024.yaml"),
    ),
    (
        "federal/2025.yaml",
        include_str!("../../config/us_payroll/federal/2025.yaml"),
    ),
];
const BUILTIN_STATES: &str = include_str!("../../config/us_payroll/states.yaml");
const BUILTIN_SOCIAL_SECURITY: &str = include_str!("../../config/us_payroll/social_security.yaml");

/// Loads and provides access to payroll tax tables.
///
/// Lookups never fail: an unknown tax year resolves to the nearest earlier
/// table, an unknown state withholds nothing, and an unrecognized filing
/// status uses the `single` brackets.
///
/// # Directory Structure
///
/// ```text
/// config/us_payroll/
/// ├── social_security.yaml # Wage bases by year
/// ├── states.yaml          # Flat effective rate by state code
/// └── federal/
///     ├── 2024.yaml        # Brackets by filing status
///     └── 2025.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::TaxTableProvider;
/// use payroll_engine::models::FilingStatus;
///
/// let provider = TaxTableProvider::load("./config/us_payroll").unwrap();
/// let brackets = provider.brackets(2025, &FilingStatus::Single);
/// println!("{} brackets", brackets.len());
/// ```
#[derive(Debug, Clone)]
pub struct TaxTableProvider {
    /// Federal tables sorted oldest first; never empty.
    federal: Vec<FederalTaxTable>,
    /// State rates keyed by upper-case state code.
    state_rates: BTreeMap<String, Decimal>,
    /// Social Security wage bases; never empty.
    wage_bases: BTreeMap<i32, Decimal>,
}

impl TaxTableProvider {
    /// Loads tax tables from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `TaxTableProvider` on success, or an error if:
    /// - `states.yaml`, `social_security.yaml` or the `federal/` directory is missing
    /// - Any file contains invalid YAML
    /// - Any bracket table breaks its ordering or flat-amount invariants
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let states = Self::load_yaml::<StateTaxConfig>(&path.join("states.yaml"))?;
        let social_security =
            Self::load_yaml::<SocialSecurityConfig>(&path.join("social_security.yaml"))?;
        let federal = Self::load_federal(&path.join("federal"))?;

        Self::from_parts(federal, states, social_security)
    }

    /// Builds the provider from the tax tables compiled into the crate.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::TaxTableProvider;
    /// use rust_decimal::Decimal;
    ///
    /// let provider = TaxTableProvider::builtin().unwrap();
    /// assert_eq!(provider.social_security_wage_base(2025), Decimal::from(176100));
    /// assert_eq!(provider.state_rate(Some("TX")), Decimal::ZERO);
    /// ```
    pub fn builtin() -> EngineResult<Self> {
        let federal = BUILTIN_FEDERAL
            .iter()
            .map(|(name, content)| Self::parse_yaml::<FederalTaxTable>(name, content))
            .collect::<EngineResult<Vec<_>>>()?;
        let states = Self::parse_yaml::<StateTaxConfig>("states.yaml", BUILTIN_STATES)?;
        let social_security =
            Self::parse_yaml::<SocialSecurityConfig>("social_security.yaml", BUILTIN_SOCIAL_SECURITY)?;

        Self::from_parts(federal, states, social_security)
    }

    /// Assembles a provider from already-parsed tables, validating every
    /// bracket table.
    pub fn from_parts(
        federal: Vec<FederalTaxTable>,
        states: StateTaxConfig,
        social_security: SocialSecurityConfig,
    ) -> EngineResult<Self> {
        if federal.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: "federal (no bracket tables found)".to_string(),
            });
        }
        if social_security.wage_bases.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: "social_security.yaml (no wage bases found)".to_string(),
            });
        }

        for table in &federal {
            if !table.brackets.contains_key(&FilingStatus::Single) {
                return Err(EngineError::InvalidTaxTable {
                    year: table.year,
                    filing_status: FilingStatus::Single.to_string(),
                    message: "every year needs a single table to fall back on".to_string(),
                });
            }
            for (status, brackets) in &table.brackets {
                validate_brackets(table.year, status, brackets)?;
            }
        }

        let mut federal = federal;
        federal.sort_by_key(|table| table.year);

        let state_rates = states
            .rates
            .into_iter()
            .map(|(code, rate)| (code.trim().to_ascii_uppercase(), rate))
            .collect();

        Ok(Self {
            federal,
            state_rates,
            wage_bases: social_security.wage_bases,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&path_str, &content)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads all bracket files from the federal directory.
    fn load_federal(federal_dir: &Path) -> EngineResult<Vec<FederalTaxTable>> {
        let federal_dir_str = federal_dir.display().to_string();

        let entries = fs::read_dir(federal_dir).map_err(|_| EngineError::ConfigNotFound {
            path: federal_dir_str.clone(),
        })?;

        let mut tables = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: federal_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<FederalTaxTable>(&path)?);
            }
        }

        Ok(tables)
    }

    /// Returns the calendar year used for tax lookups on `pay_date`.
    pub fn tax_year(pay_date: NaiveDate) -> i32 {
        pay_date.year()
    }

    /// Returns the years that have a federal bracket table, oldest first.
    pub fn federal_years(&self) -> Vec<i32> {
        self.federal.iter().map(|table| table.year).collect()
    }

    /// Returns the federal table for `year`.
    ///
    /// The most recent table at or before `year` applies; years before the
    /// earliest table use the earliest table.
    pub fn federal_table(&self, year: i32) -> Option<&FederalTaxTable> {
        self.federal
            .iter()
            .rev()
            .find(|table| table.year <= year)
            .or_else(|| self.federal.first())
    }

    /// Returns the federal brackets for a year and filing status.
    pub fn brackets(&self, year: i32, status: &FilingStatus) -> &[TaxBracket] {
        self.federal_table(year)
            .map(|table| table.brackets_for(status))
            .unwrap_or(&[])
    }

    /// Returns the flat effective rate for a state, or zero when the state
    /// is missing, unknown, or has no wage income tax.
    pub fn state_rate(&self, state_code: Option<&str>) -> Decimal {
        state_code
            .map(|code| code.trim().to_ascii_uppercase())
            .and_then(|code| self.state_rates.get(&code).copied())
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the Social Security wage base for `year`, falling back to the
    /// earliest configured year when `year` has no entry.
    pub fn social_security_wage_base(&self, year: i32) -> Decimal {
        self.wage_bases
            .get(&year)
            .or_else(|| self.wage_bases.values().next())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Checks one filing status' brackets: they start at zero, are contiguous
/// and ascending, only the last is open-ended, rates lie in `0..=1`, and
/// each `flat_amount` is the cumulative tax of the brackets below it.
fn validate_brackets(year: i32, status: &FilingStatus, brackets: &[TaxBracket]) -> EngineResult<()> {
    let invalid = |message: String| EngineError::InvalidTaxTable {
        year,
        filing_status: status.to_string(),
        message,
    };

    let Some(first) = brackets.first() else {
        return Err(invalid("no brackets defined".to_string()));
    };
    if !first.min.is_zero() {
        return Err(invalid(format!(
            "first bracket must start at 0 (starts at {})",
            first.min
        )));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(invalid(format!(
                "bracket {} rate {} is outside 0..=1",
                index, bracket.rate
            )));
        }

        let is_last = index + 1 == brackets.len();
        match (bracket.max, brackets.get(index + 1)) {
            (Some(max), _) if max <= bracket.min => {
                return Err(invalid(format!(
                    "bracket {} max {} is not above its min {}",
                    index, max, bracket.min
                )));
            }
            (Some(max), Some(next)) if next.min != max => {
                return Err(invalid(format!(
                    "bracket {} starts at {} but the previous bracket ends at {}",
                    index + 1,
                    next.min,
                    max
                )));
            }
            (None, _) if !is_last => {
                return Err(invalid(format!(
                    "bracket {} is open-ended but is not the top bracket",
                    index
                )));
            }
            _ => {}
        }
    }

    let expected = cumulative_flat_amounts(brackets);
    for (index, (bracket, flat)) in brackets.iter().zip(expected).enumerate() {
        if bracket.flat_amount != flat {
            return Err(invalid(format!(
                "bracket {} flat_amount is {} but the brackets below it total {}",
                index, bracket.flat_amount, flat
            )));
        }
    }

    Ok(())
}
