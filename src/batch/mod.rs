//! Batch pay run processing with remote offload and local fallback.

mod availability;
mod orchestrator;
mod remote;

pub use availability::{Availability, AvailabilityTracker};
pub use orchestrator::{
    BatchOrchestrator, DEFAULT_AVAILABILITY_COOLDOWN_SECS, DEFAULT_BASE_URL, DEFAULT_BATCH_THRESHOLD,
    DEFAULT_REMOTE_TIMEOUT_MS, OrchestratorConfig, summarize,
};
pub use remote::{CALCULATE_PATH, HttpRemoteCalculator, RemoteCalculator};
