//! Integration tests for the payroll withholding engine.
//!
//! This test suite covers:
//! - Single pay stubs for hourly and salaried employees
//! - State withholding, including no-income-tax states
//! - Social Security wage base and additional Medicare thresholds
//! - Pay run routing between local calculation and the remote service
//! - Remote failure fallback, cooldown and availability reset
//! - Filing status and enum spellings on the wire
//! - Error cases, including oversized amounts

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{create_router, AppState};
use payroll_engine::batch::{
    BatchOrchestrator, HttpRemoteCalculator, OrchestratorConfig, RemoteCalculator, CALCULATE_PATH,
};
use payroll_engine::calculation::PayStubAssembler;
use payroll_engine::config::TaxTableProvider;
use payroll_engine::error::EngineError;
use payroll_engine::models::{BatchPayrollRequest, CalculationSource};

// =============================================================================
// Test Helpers
// =============================================================================

/// Nothing listens on the discard port, so remote calls fail immediately.
const UNREACHABLE_REMOTE: &str = "http://127.0.0.1:9";

fn assembler() -> PayStubAssembler {
    let provider = TaxTableProvider::load("./config/us_payroll").expect("Failed to load tax tables");
    PayStubAssembler::new(Arc::new(provider))
}

fn create_router_for_remote(base_url: &str) -> Router {
    let config = OrchestratorConfig {
        base_url: base_url.to_string(),
        ..OrchestratorConfig::default()
    };
    create_router(AppState::new(BatchOrchestrator::from_config(assembler(), config)))
}

fn create_router_for_test() -> Router {
    create_router_for_remote(UNREACHABLE_REMOTE)
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn decimal_field(value: &Value, field: &str) -> Decimal {
    let raw = value[field]
        .as_str()
        .unwrap_or_else(|| panic!("{} should be a decimal string, got {}", field, value[field]));
    decimal(raw)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn get_availability(router: Router) -> Value {
    let request = Request::builder()
        .uri("/payroll/availability")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn reset_availability(router: Router) -> StatusCode {
    let request = Request::builder()
        .method("POST")
        .uri("/payroll/availability/reset")
        .body(Body::empty())
        .unwrap();
    send(router, request).await.0
}

fn hourly_employee(id: &str, rate: &str, state_code: Option<&str>) -> Value {
    let mut employee = json!({
        "id": id,
        "payType": "hourly",
        "payRate": rate,
        "payFrequency": "weekly",
        "federalFilingStatus": "single"
    });
    if let Some(code) = state_code {
        employee["stateCode"] = json!(code);
    }
    employee
}

fn pay_stub_request(employee: Value, regular_hours: &str, overtime_hours: &str, pay_date: &str) -> Value {
    json!({
        "employee": employee,
        "regularHours": regular_hours,
        "overtimeHours": overtime_hours,
        "payDate": pay_date
    })
}

fn pay_run(pay_run_id: &str, employee_count: usize) -> Value {
    let employees: Vec<Value> = (0..employee_count)
        .map(|i| {
            json!({
                "employee": hourly_employee(&format!("emp_{:03}", i), "20", Some("CA")),
                "regularHours": "40",
                "overtimeHours": "10"
            })
        })
        .collect();

    json!({
        "payRunId": pay_run_id,
        "payDate": "2025-06-13",
        "employees": employees
    })
}

// =============================================================================
// Fake remote calculation service
// =============================================================================

#[derive(Clone)]
struct FakeRemote {
    assembler: Arc<PayStubAssembler>,
    calls: Arc<AtomicUsize>,
}

/// Calculates the run the same way the engine does, omitting `source` as the
/// real service does.
async fn fake_remote_success(
    State(remote): State<FakeRemote>,
    Json(request): Json<BatchPayrollRequest>,
) -> Json<Value> {
    remote.calls.fetch_add(1, Ordering::SeqCst);

    let results: Vec<Value> = request
        .employees
        .iter()
        .map(|input| serde_json::to_value(remote.assembler.assemble_input(input, request.pay_date)).unwrap())
        .collect();
    let employee_count = results.len();

    Json(json!({
        "payRunId": request.pay_run_id,
        "payDate": request.pay_date,
        "results": results,
        "summary": {
            "employeeCount": employee_count,
            "totalGrossPay": "0",
            "totalDeductions": "0",
            "totalNetPay": "0",
            "processingTimeMs": 3
        }
    }))
}

async fn fake_remote_unavailable(State(remote): State<FakeRemote>) -> (StatusCode, &'static str) {
    remote.calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::SERVICE_UNAVAILABLE, "calculation service is down")
}

/// Starts a fake remote service on an ephemeral port and returns its base
/// URL together with its call counter.
async fn spawn_fake_remote(healthy: bool) -> (String, Arc<AtomicUsize>) {
    let state = FakeRemote {
        assembler: Arc::new(assembler()),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let calls = state.calls.clone();

    let routes = if healthy {
        Router::new().route(CALCULATE_PATH, post(fake_remote_success))
    } else {
        Router::new().route(CALCULATE_PATH, post(fake_remote_unavailable))
    };
    let app = routes.with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), calls)
}

// =============================================================================
// Single pay stubs
// =============================================================================

#[tokio::test]
async fn test_hourly_weekly_new_york() {
    let router = create_router_for_test();
    let request = pay_stub_request(hourly_employee("emp_ny_001", "20", Some("NY")), "40", "10", "2025-06-13");

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["employeeId"], "emp_ny_001");
    assert_eq!(stub["regularPay"], "800.00");
    assert_eq!(stub["overtimePay"], "300.00");
    assert_eq!(stub["grossPay"], "1100.00");
    assert_eq!(stub["federalWithholding"], "144.19");
    assert_eq!(stub["stateWithholding"], "64.35");
    assert_eq!(stub["socialSecurity"], "68.20");
    assert_eq!(stub["medicare"], "15.95");
    assert_eq!(stub["totalDeductions"], "292.69");
    assert_eq!(stub["netPay"], "807.31");
}

#[tokio::test]
async fn test_salaried_biweekly_ignores_hours() {
    let router = create_router_for_test();
    let request = json!({
        "employee": {
            "id": "emp_salary_001",
            "payType": "salary",
            "payRate": "52000",
            "payFrequency": "biweekly",
            "federalFilingStatus": "married_filing_jointly",
            "stateCode": "TX"
        },
        "regularHours": "80",
        "overtimeHours": "12",
        "payDate": "2025-06-13"
    });

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["regularPay"], "2000.00");
    assert_eq!(stub["overtimePay"], "0.00");
    assert_eq!(stub["grossPay"], "2000.00");
    assert_eq!(stub["federalWithholding"], "221.65");
    assert_eq!(stub["stateWithholding"], "0.00");
}

#[tokio::test]
async fn test_no_income_tax_states_withhold_nothing() {
    for state_code in ["TX", "FL", "WA", "NV", "tx"] {
        let router = create_router_for_test();
        let request = pay_stub_request(hourly_employee("emp_state", "35", Some(state_code)), "40", "0", "2025-06-13");

        let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(stub["stateWithholding"], "0.00", "state {}", state_code);
    }
}

#[tokio::test]
async fn test_unknown_state_withholds_nothing() {
    let router = create_router_for_test();
    let request = pay_stub_request(hourly_employee("emp_zz", "20", Some("ZZ")), "40", "0", "2025-06-13");

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["stateWithholding"], "0.00");
}

#[tokio::test]
async fn test_tax_year_follows_pay_date() {
    let employee = hourly_employee("emp_year", "20", None);

    let (_, stub_2024) = post_json(
        create_router_for_test(),
        "/pay-stubs/calculate",
        pay_stub_request(employee.clone(), "40", "10", "2024-06-14"),
    )
    .await;
    let (_, stub_2025) = post_json(
        create_router_for_test(),
        "/pay-stubs/calculate",
        pay_stub_request(employee, "40", "10", "2025-06-13"),
    )
    .await;

    assert_eq!(stub_2025["federalWithholding"], "144.19");
    assert_ne!(stub_2024["federalWithholding"], stub_2025["federalWithholding"]);
}

#[tokio::test]
async fn test_social_security_stops_at_wage_base() {
    let router = create_router_for_test();
    let mut request = pay_stub_request(hourly_employee("emp_cap", "100", None), "40", "0", "2025-11-28");
    request["ytdTotals"] = json!({ "grossPay": "176100" });

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["socialSecurity"], "0.00");
    assert_eq!(stub["medicare"], "58.00");
}

#[tokio::test]
async fn test_additional_medicare_above_threshold() {
    let router = create_router_for_test();
    let request = json!({
        "employee": hourly_employee("emp_high", "250", None),
        "regularHours": "40",
        "payDate": "2025-11-28",
        "ytdTotals": { "grossPay": "195000" }
    });

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    // gross 10000: 145.00 standard + 5000 * 0.9% additional
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["grossPay"], "10000.00");
    assert_eq!(stub["medicare"], "190.00");
}

#[tokio::test]
async fn test_pay_stub_balances() {
    let router = create_router_for_test();
    let mut request = pay_stub_request(hourly_employee("emp_bal", "27.35", Some("IL")), "37.5", "3.25", "2025-03-14");
    request["otherEarnings"] = json!("125.40");
    request["otherDeductions"] = json!("42.17");

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    let gross = decimal_field(&stub, "grossPay");
    let total = decimal_field(&stub, "totalDeductions");
    let net = decimal_field(&stub, "netPay");
    let parts = decimal_field(&stub, "federalWithholding")
        + decimal_field(&stub, "stateWithholding")
        + decimal_field(&stub, "socialSecurity")
        + decimal_field(&stub, "medicare")
        + decimal_field(&stub, "otherDeductions");

    assert_eq!(total, parts);
    assert_eq!(net, gross - total);
}

#[tokio::test]
async fn test_audit_trail_is_ordered() {
    let router = create_router_for_test();
    let request = pay_stub_request(hourly_employee("emp_audit", "20", Some("CA")), "40", "0", "2025-06-13");

    let (status, stub) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    let steps = stub["audit"].as_array().unwrap();
    let rule_ids: Vec<&str> = steps.iter().map(|s| s["ruleId"].as_str().unwrap()).collect();
    assert_eq!(
        rule_ids,
        [
            "gross_pay",
            "federal_withholding",
            "state_withholding",
            "social_security",
            "medicare",
            "net_pay"
        ]
    );
    for (index, step) in steps.iter().enumerate() {
        assert_eq!(step["stepNumber"], index as u64 + 1);
        assert!(step["ruleName"].is_string());
        assert!(step["reasoning"].is_string());
    }
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_negative_pay_rate_is_rejected() {
    let router = create_router_for_test();
    let request = pay_stub_request(hourly_employee("emp_neg", "-20", None), "40", "0", "2025-06-13");

    let (status, error) = post_json(router, "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");
}

#[tokio::test]
async fn test_unknown_pay_frequency_is_rejected() {
    let router = create_router_for_test();
    let mut employee = hourly_employee("emp_freq", "20", None);
    employee["payFrequency"] = json!("fortnightly");

    let (status, error) = post_json(
        router,
        "/pay-stubs/calculate",
        pay_stub_request(employee, "40", "0", "2025-06-13"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_unrecognized_filing_status_uses_single_brackets() {
    let mut employee = hourly_employee("emp_status", "20", None);
    employee["federalFilingStatus"] = json!("qualifying_widow");

    let (status, stub) = post_json(
        create_router_for_test(),
        "/pay-stubs/calculate",
        pay_stub_request(employee, "40", "10", "2025-06-13"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["federalWithholding"], "144.19");
}

#[tokio::test]
async fn test_pascal_case_enums_are_accepted() {
    let mut employee = hourly_employee("emp_pascal", "20", Some("NY"));
    employee["payType"] = json!("Hourly");
    employee["payFrequency"] = json!("Weekly");
    employee["federalFilingStatus"] = json!("MarriedFilingJointly");

    let (status, stub) = post_json(
        create_router_for_test(),
        "/pay-stubs/calculate",
        pay_stub_request(employee, "40", "10", "2025-06-13"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub["grossPay"], "1100.00");
    assert_eq!(stub["audit"][1]["input"]["filing_status"], "married_filing_jointly");
}

#[tokio::test]
async fn test_oversized_pay_rate_is_rejected_before_routing() {
    let (base_url, calls) = spawn_fake_remote(true).await;
    let router = create_router_for_remote(&base_url);
    let mut run = pay_run("run_overflow", 50);
    run["employees"][3]["employee"]["payRate"] = json!("79228162514264337593543950335");

    let (status, error) = post_json(router, "/payroll/calculate", run).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");
    assert!(error["message"].as_str().unwrap().contains("employees[3].payRate"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_hours_are_rejected() {
    let request = pay_stub_request(hourly_employee("emp_hours", "20", None), "40", "1000000", "2025-06-13");

    let (status, error) = post_json(create_router_for_test(), "/pay-stubs/calculate", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");
}

// =============================================================================
// Pay run routing
// =============================================================================

#[tokio::test]
async fn test_pay_run_below_threshold_stays_local() {
    let (base_url, calls) = spawn_fake_remote(true).await;
    let router = create_router_for_remote(&base_url);

    let (status, run) = post_json(router, "/payroll/calculate", pay_run("run_small", 49)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["source"], "local");
    assert_eq!(run["results"].as_array().unwrap().len(), 49);
    assert_eq!(run["summary"]["employeeCount"], 49);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pay_run_at_threshold_goes_remote() {
    let (base_url, calls) = spawn_fake_remote(true).await;
    let router = create_router_for_remote(&base_url);

    let (status, run) = post_json(router.clone(), "/payroll/calculate", pay_run("run_large", 50)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["source"], "remote");
    assert_eq!(run["payRunId"], "run_large");
    assert_eq!(run["results"].as_array().unwrap().len(), 50);
    assert_eq!(run["summary"]["processingTimeMs"], 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(get_availability(router).await["availability"], "available");
}

#[tokio::test]
async fn test_remote_failure_falls_back_and_cools_down() {
    let (base_url, calls) = spawn_fake_remote(false).await;
    let router = create_router_for_remote(&base_url);

    let (status, run) = post_json(router.clone(), "/payroll/calculate", pay_run("run_fail", 50)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["source"], "local");
    assert_eq!(run["results"].as_array().unwrap().len(), 50);
    assert_eq!(run["summary"]["totalGrossPay"], "55000.00");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(get_availability(router.clone()).await["availability"], "unavailable");

    // Within the cooldown the remote service is not called again
    let (_, run) = post_json(router.clone(), "/payroll/calculate", pay_run("run_cooldown", 50)).await;
    assert_eq!(run["source"], "local");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(reset_availability(router.clone()).await, StatusCode::NO_CONTENT);
    assert_eq!(get_availability(router.clone()).await["availability"], "available");

    post_json(router, "/payroll/calculate", pay_run("run_retry", 50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_remote_falls_back_to_local() {
    let router = create_router_for_test();

    let (status, run) = post_json(router.clone(), "/payroll/calculate", pay_run("run_offline", 60)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["source"], "local");
    assert_eq!(run["results"].as_array().unwrap().len(), 60);
    assert_eq!(get_availability(router).await["availability"], "unavailable");
}

#[tokio::test]
async fn test_local_and_remote_results_agree() {
    let (base_url, _) = spawn_fake_remote(true).await;

    let (_, remote_run) = post_json(
        create_router_for_remote(&base_url),
        "/payroll/calculate",
        pay_run("run_compare", 50),
    )
    .await;
    let (_, local_run) = post_json(create_router_for_test(), "/payroll/calculate", pay_run("run_compare", 50)).await;

    assert_eq!(remote_run["source"], "remote");
    assert_eq!(local_run["source"], "local");
    assert_eq!(remote_run["results"], local_run["results"]);
}

#[tokio::test]
async fn test_unrecognized_filing_status_is_forwarded_unchanged() {
    let (base_url, calls) = spawn_fake_remote(true).await;
    let mut run = pay_run("run_status", 50);
    run["employees"][0]["employee"]["federalFilingStatus"] = json!("qualifying_surviving_spouse");

    let (status, run) = post_json(create_router_for_remote(&base_url), "/payroll/calculate", run).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["source"], "remote");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let results = run["results"].as_array().unwrap();
    assert_eq!(
        results[0]["audit"][1]["input"]["filing_status"],
        "qualifying_surviving_spouse"
    );
    assert_eq!(
        results[0]["federalWithholding"],
        results[1]["federalWithholding"]
    );
}

#[tokio::test]
async fn test_availability_endpoint_reports_threshold() {
    let body = get_availability(create_router_for_test()).await;

    assert_eq!(body["availability"], "available");
    assert_eq!(body["batchThreshold"], 50);
}

// =============================================================================
// Remote client
// =============================================================================

fn small_request() -> BatchPayrollRequest {
    serde_json::from_value(pay_run("run_client", 2)).unwrap()
}

#[tokio::test]
async fn test_http_client_defaults_missing_source_to_remote() {
    let (base_url, calls) = spawn_fake_remote(true).await;
    let client = HttpRemoteCalculator::new(&base_url, Duration::from_secs(5));

    let response = client.calculate(&small_request()).await.unwrap();

    assert_eq!(response.source, CalculationSource::Remote);
    assert_eq!(response.results.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_http_client_reports_error_status() {
    let (base_url, _) = spawn_fake_remote(false).await;
    let client = HttpRemoteCalculator::new(&base_url, Duration::from_secs(5));

    let err = client.calculate(&small_request()).await.unwrap_err();

    match err {
        EngineError::RemoteStatus { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("down"));
        }
        other => panic!("expected RemoteStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_client_reports_transport_error() {
    let client = HttpRemoteCalculator::new(UNREACHABLE_REMOTE, Duration::from_secs(5));

    let err = client.calculate(&small_request()).await.unwrap_err();

    assert!(err.is_remote());
    assert!(matches!(
        err,
        EngineError::RemoteTransport { .. } | EngineError::RemoteTimeout { .. }
    ));
}
