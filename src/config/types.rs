//! Configuration types for tax tables.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML tax table files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::FilingStatus;

/// One slice of a progressive tax schedule.
///
/// `flat_amount` is the total tax owed on all income below `min`, so the tax
/// on an income inside this bracket is `flat_amount + (income - min) * rate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Lower bound of the bracket (exclusive of income at exactly this value).
    pub min: Decimal,
    /// Upper bound of the bracket; `None` for the top bracket.
    pub max: Option<Decimal>,
    /// Marginal rate applied inside the bracket (e.g. 0.22 for 22%).
    pub rate: Decimal,
    /// Cumulative tax of all lower brackets.
    pub flat_amount: Decimal,
}

/// Federal brackets for one tax year, keyed by filing status.
#[derive(Debug, Clone, Deserialize)]
pub struct FederalTaxTable {
    /// The tax year these brackets apply to.
    pub year: i32,
    /// Ordered brackets per filing status.
    pub brackets: HashMap<FilingStatus, Vec<TaxBracket>>,
}

impl FederalTaxTable {
    /// Returns the brackets for a filing status, falling back to `single`
    /// when the status has no table of its own.
    pub fn brackets_for(&self, status: &FilingStatus) -> &[TaxBracket] {
        self.brackets
            .get(status)
            .or_else(|| self.brackets.get(&FilingStatus::Single))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// State rate configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateTaxConfig {
    /// Map of two-letter state code to flat effective rate.
    pub rates: HashMap<String, Decimal>,
}

/// Social Security configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialSecurityConfig {
    /// Map of calendar year to wage base.
    pub wage_bases: BTreeMap<i32, Decimal>,
}
