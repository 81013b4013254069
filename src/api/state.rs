//! Application state for the payroll engine API.

use std::sync::Arc;

use crate::batch::BatchOrchestrator;
use crate::calculation::PayStubAssembler;

/// Shared application state.
///
/// Holds the batch orchestrator, which in turn owns the pay stub assembler
/// and the remote service availability state.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<BatchOrchestrator>,
}

impl AppState {
    /// Creates a new application state around an orchestrator.
    pub fn new(orchestrator: BatchOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Returns the batch orchestrator.
    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// Returns the assembler used for single pay stubs.
    pub fn assembler(&self) -> &PayStubAssembler {
        self.orchestrator.assembler()
    }
}
