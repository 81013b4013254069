//! Error types for the payroll withholding engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading tax tables,
//! validating pay inputs, or talking to the remote calculation service.

use thiserror::Error;

/// The main error type for the payroll withholding engine.
///
/// Configuration gaps (unknown year, state or filing status) are not errors;
/// they resolve to documented fallbacks. Remote failures are represented here
/// but absorbed by the batch orchestrator before they reach a caller.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/states.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/states.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A bracket table broke one of its structural invariants.
    #[error("Invalid tax table for {year} ({filing_status}): {message}")]
    InvalidTaxTable {
        /// The tax year of the table.
        year: i32,
        /// The filing status whose brackets are invalid.
        filing_status: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// An employee or pay input field was invalid.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The remote calculation service could not be reached.
    #[error("Remote calculation service unreachable: {message}")]
    RemoteTransport {
        /// The underlying transport error.
        message: String,
    },

    /// The remote calculation service did not answer in time.
    #[error("Remote calculation service timed out after {timeout_ms}ms")]
    RemoteTimeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The remote calculation service answered with a non-success status.
    #[error("Remote calculation service returned status {status}: {body}")]
    RemoteStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body, if any.
        body: String,
    },

    /// The remote calculation service answered with an unreadable body.
    #[error("Remote calculation service returned an invalid response: {message}")]
    RemoteDecode {
        /// A description of the decode failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true for errors raised while talking to the remote service.
    ///
    /// The orchestrator absorbs these by falling back to local calculation.
    /// They only reach callers that use a `RemoteCalculator` directly.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EngineError::RemoteTransport { .. }
                | EngineError::RemoteTimeout { .. }
                | EngineError::RemoteStatus { .. }
                | EngineError::RemoteDecode { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
