//! Pay run orchestration.
//!
//! Small pay runs are always calculated in-process. Large ones are sent to
//! the remote calculation service first, falling back to local calculation
//! whenever the service fails, times out, or was recently unavailable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::calculation::{PayStubAssembler, round_to_cents};
use crate::error::EngineError;
use crate::models::{
    BatchPayrollRequest, BatchPayrollResponse, BatchSummary, CalculationSource,
    PayStubCalculation,
};

use super::{Availability, AvailabilityTracker, HttpRemoteCalculator, RemoteCalculator};

/// Pay runs with at least this many employees are offered to the remote service.
pub const DEFAULT_BATCH_THRESHOLD: usize = 50;

/// Seconds to wait after a remote failure before trying the service again.
pub const DEFAULT_AVAILABILITY_COOLDOWN_SECS: u64 = 60;

/// Milliseconds to wait for the remote service before falling back.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 30_000;

/// Base URL of a locally running calculation service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:54321";

/// Tunables for [`BatchOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Base URL of the remote calculation service.
    pub base_url: String,
    /// Minimum pay run size that is sent to the remote service.
    pub batch_threshold: usize,
    /// Seconds after a failure during which the remote service is skipped.
    pub availability_cooldown_secs: u64,
    /// Milliseconds allowed for the remote call.
    pub remote_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            availability_cooldown_secs: DEFAULT_AVAILABILITY_COOLDOWN_SECS,
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

impl OrchestratorConfig {
    /// Returns the cooldown as a [`Duration`].
    pub fn availability_cooldown(&self) -> Duration {
        Duration::from_secs(self.availability_cooldown_secs)
    }

    /// Returns the remote timeout as a [`Duration`].
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

/// Routes pay runs between local calculation and the remote service.
///
/// Each orchestrator owns its own availability state, so separate instances
/// (for example one per tenant) never affect each other. [`run`] never
/// fails: remote problems are logged and absorbed by calculating locally.
///
/// [`run`]: BatchOrchestrator::run
pub struct BatchOrchestrator {
    assembler: PayStubAssembler,
    remote: Arc<dyn RemoteCalculator>,
    availability: AvailabilityTracker,
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    /// Creates an orchestrator with the default threshold, cooldown and timeout.
    pub fn new(assembler: PayStubAssembler, remote: Arc<dyn RemoteCalculator>) -> Self {
        Self::with_config(assembler, remote, OrchestratorConfig::default())
    }

    /// Creates an orchestrator that talks to the service at `config.base_url`
    /// over HTTP.
    pub fn from_config(assembler: PayStubAssembler, config: OrchestratorConfig) -> Self {
        let remote = HttpRemoteCalculator::new(&config.base_url, config.remote_timeout());
        Self::with_config(assembler, Arc::new(remote), config)
    }

    /// Creates an orchestrator with explicit settings.
    pub fn with_config(
        assembler: PayStubAssembler,
        remote: Arc<dyn RemoteCalculator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            assembler,
            remote,
            availability: AvailabilityTracker::new(config.availability_cooldown()),
            config,
        }
    }

    /// Returns the assembler used for local calculation.
    pub fn assembler(&self) -> &PayStubAssembler {
        &self.assembler
    }

    /// Returns the last known availability of the remote service.
    pub fn availability(&self) -> Availability {
        self.availability.availability()
    }

    /// Returns the pay run size at which the remote service is tried.
    pub fn batch_threshold(&self) -> usize {
        self.config.batch_threshold
    }

    /// Marks the remote service available again, e.g. after connectivity
    /// was confirmed out-of-band.
    pub fn reset_availability(&self) {
        info!("Remote payroll service availability reset");
        self.availability.reset();
    }

    /// Calculates a pay run, choosing the remote or local path.
    pub async fn run(&self, request: &BatchPayrollRequest) -> BatchPayrollResponse {
        let started = Instant::now();
        let employee_count = request.employees.len();

        if employee_count < self.config.batch_threshold {
            debug!(
                pay_run_id = %request.pay_run_id,
                employee_count,
                threshold = self.config.batch_threshold,
                "Pay run below remote threshold, calculating locally"
            );
            return self.calculate_locally(request, started);
        }

        if !self.availability.should_attempt_remote() {
            info!(
                pay_run_id = %request.pay_run_id,
                employee_count,
                "Remote payroll service unavailable within cooldown, calculating locally"
            );
            return self.calculate_locally(request, started);
        }

        match self.call_remote(request).await {
            Ok(mut response) => {
                self.availability.record_success();
                response.source = CalculationSource::Remote;
                info!(
                    pay_run_id = %request.pay_run_id,
                    employee_count,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Pay run calculated by remote service"
                );
                response
            }
            Err(err) => {
                self.availability.record_failure();
                warn!(
                    pay_run_id = %request.pay_run_id,
                    employee_count,
                    error = %err,
                    "Remote payroll calculation failed, falling back to local"
                );
                self.calculate_locally(request, started)
            }
        }
    }

    /// Calls the remote service under the configured timeout and checks
    /// that the response answers this run: same pay run id and one result
    /// per employee, in request order.
    async fn call_remote(&self, request: &BatchPayrollRequest) -> Result<BatchPayrollResponse, EngineError> {
        let timeout = self.config.remote_timeout();
        let response = tokio::time::timeout(timeout, self.remote.calculate(request))
            .await
            .map_err(|_| EngineError::RemoteTimeout {
                timeout_ms: self.config.remote_timeout_ms,
            })??;

        if response.results.len() != request.employees.len() {
            return Err(EngineError::RemoteDecode {
                message: format!(
                    "expected {} results, got {}",
                    request.employees.len(),
                    response.results.len()
                ),
            });
        }

        if response.pay_run_id != request.pay_run_id {
            return Err(EngineError::RemoteDecode {
                message: format!(
                    "expected pay run {}, got {}",
                    request.pay_run_id, response.pay_run_id
                ),
            });
        }

        let misplaced = request
            .employees
            .iter()
            .zip(&response.results)
            .position(|(input, result)| input.employee.id != result.employee_id);
        if let Some(index) = misplaced {
            return Err(EngineError::RemoteDecode {
                message: format!(
                    "result {} is for employee {}, expected {}",
                    index, response.results[index].employee_id, request.employees[index].employee.id
                ),
            });
        }

        Ok(response)
    }

    /// Calculates every employee in-process and summarizes the run.
    fn calculate_locally(&self, request: &BatchPayrollRequest, started: Instant) -> BatchPayrollResponse {
        let results: Vec<PayStubCalculation> = request
            .employees
            .iter()
            .map(|input| self.assembler.assemble_input(input, request.pay_date))
            .collect();

        let summary = summarize(&results, started.elapsed());

        info!(
            pay_run_id = %request.pay_run_id,
            employee_count = summary.employee_count,
            total_gross_pay = %summary.total_gross_pay,
            total_net_pay = %summary.total_net_pay,
            duration_ms = summary.processing_time_ms,
            "Pay run calculated locally"
        );

        BatchPayrollResponse {
            pay_run_id: request.pay_run_id.clone(),
            pay_date: request.pay_date,
            results,
            summary,
            source: CalculationSource::Local,
        }
    }
}

/// Sums a pay run's results, rounding each total to cents.
pub fn summarize(results: &[PayStubCalculation], elapsed: Duration) -> BatchSummary {
    let (gross, deductions, net) = results.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(gross, deductions, net), stub| {
            (
                gross + stub.gross_pay,
                deductions + stub.total_deductions,
                net + stub.net_pay,
            )
        },
    );

    BatchSummary {
        employee_count: results.len(),
        total_gross_pay: round_to_cents(gross),
        total_deductions: round_to_cents(deductions),
        total_net_pay: round_to_cents(net),
        processing_time_ms: elapsed.as_millis() as u64,
    }
}
