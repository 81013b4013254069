//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{BatchPayrollRequest, EmployeePayInput};

use super::request::PayStubRequest;
use super::response::{ApiError, ApiErrorResponse, AvailabilityResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/pay-stubs/calculate", post(calculate_pay_stub_handler))
        .route("/payroll/calculate", post(calculate_payroll_handler))
        .route("/payroll/availability", get(availability_handler))
        .route("/payroll/availability/reset", post(reset_availability_handler))
        .with_state(state)
}

/// Handler for POST /pay-stubs/calculate.
///
/// Validates the pay input and returns one employee's pay stub.
async fn calculate_pay_stub_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayStubRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing pay stub request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let pay_date = request
        .pay_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let input: EmployeePayInput = request.into();

    if let Err(err) = input.validate() {
        return engine_error_response(correlation_id, err);
    }

    let start_time = Instant::now();
    let stub = state.assembler().assemble_input(&input, pay_date);

    info!(
        correlation_id = %correlation_id,
        employee_id = %stub.employee_id,
        gross_pay = %stub.gross_pay,
        net_pay = %stub.net_pay,
        duration_us = start_time.elapsed().as_micros() as u64,
        "Pay stub calculated"
    );

    json_response(StatusCode::OK, &stub)
}

/// Handler for POST /payroll/calculate.
///
/// Validates every employee, then hands the pay run to the orchestrator.
/// Remote failures never surface here; the orchestrator falls back to
/// local calculation.
async fn calculate_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing pay run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Err(err) = request.validate() {
        return engine_error_response(correlation_id, err);
    }

    let response = state.orchestrator().run(&request).await;

    info!(
        correlation_id = %correlation_id,
        pay_run_id = %response.pay_run_id,
        employee_count = response.summary.employee_count,
        source = ?response.source,
        total_net_pay = %response.summary.total_net_pay,
        "Pay run completed"
    );

    json_response(StatusCode::OK, &response)
}

/// Handler for GET /payroll/availability.
async fn availability_handler(State(state): State<AppState>) -> Json<AvailabilityResponse> {
    let orchestrator = state.orchestrator();
    Json(AvailabilityResponse {
        availability: orchestrator.availability(),
        batch_threshold: orchestrator.batch_threshold(),
    })
}

/// Handler for POST /payroll/availability/reset.
async fn reset_availability_handler(State(state): State<AppState>) -> StatusCode {
    state.orchestrator().reset_availability();
    StatusCode::NO_CONTENT
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request rejected"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}
