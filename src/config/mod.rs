//! Tax table configuration for the payroll withholding engine.
//!
//! This module loads federal bracket tables, state rates and Social Security
//! wage bases from YAML files, and resolves which of them apply to a pay
//! date, state or filing status.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::TaxTableProvider;
//!
//! let provider = TaxTableProvider::load("./config/us_payroll").unwrap();
//! println!("Federal tables for {:?}", provider.federal_years());
//! ```

mod loader;
mod types;

pub use loader::TaxTableProvider;
pub use types::{FederalTaxTable, SocialSecurityConfig, StateTaxConfig, TaxBracket};
