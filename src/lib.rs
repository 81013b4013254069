//! Payroll withholding engine for US pay runs
//!
//! This crate calculates per-employee pay stubs (gross pay, federal and
//! state income tax withholding, Social Security and Medicare) from
//! year-versioned tax tables, and runs whole pay runs either in-process or
//! through a remote calculation service with automatic local fallback.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
