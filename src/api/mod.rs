//! HTTP API module for the payroll engine.
//!
//! This module provides REST endpoints for calculating single pay stubs and
//! whole pay runs, and for inspecting or resetting the remote calculation
//! service's availability.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::PayStubRequest;
pub use response::{ApiError, AvailabilityResponse};
pub use state::AppState;
