//! Client for the remote payroll calculation service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{EngineError, EngineResult};
use crate::models::{BatchPayrollRequest, BatchPayrollResponse};

/// Path of the batch calculation endpoint on the remote service.
pub const CALCULATE_PATH: &str = "/functions/payroll/calculate";

/// A service that can calculate a whole pay run.
///
/// Implementations report every failure as an [`EngineError`]; the
/// orchestrator decides what to do with it.
#[async_trait]
pub trait RemoteCalculator: Send + Sync {
    /// Calculates every employee in `request`.
    async fn calculate(&self, request: &BatchPayrollRequest) -> EngineResult<BatchPayrollResponse>;
}

/// [`RemoteCalculator`] that posts the pay run as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteCalculator {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpRemoteCalculator {
    /// Creates a client for the service at `base_url`, e.g.
    /// `https://api.example.com`.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), base_url, timeout)
    }

    /// Creates a client that reuses an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: impl AsRef<str>, timeout: Duration) -> Self {
        let endpoint = format!("{}{}", base_url.as_ref().trim_end_matches('/'), CALCULATE_PATH);
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// Returns the full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteCalculator for HttpRemoteCalculator {
    async fn calculate(&self, request: &BatchPayrollRequest) -> EngineResult<BatchPayrollResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::RemoteTimeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    EngineError::RemoteTransport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<BatchPayrollResponse>()
            .await
            .map_err(|e| EngineError::RemoteDecode {
                message: e.to_string(),
            })
    }
}
