//! Remote service availability tracking.
//!
//! Each orchestrator owns one [`AvailabilityTracker`]. After a failed remote
//! call the service is marked unavailable and not retried until the
//! cooldown since the last check has elapsed.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Last known state of the remote calculation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The last call succeeded, or no call has failed yet.
    Available,
    /// The last call failed.
    Unavailable,
}

#[derive(Debug)]
struct AvailabilityState {
    availability: Availability,
    last_check: Option<Instant>,
}

/// Tracks whether the remote service should be tried.
///
/// The lock is only held for reads and writes of the state, never across
/// the remote call itself.
#[derive(Debug)]
pub struct AvailabilityTracker {
    state: Mutex<AvailabilityState>,
    cooldown: Duration,
}

impl AvailabilityTracker {
    /// Creates a tracker that starts out `Available`.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(AvailabilityState {
                availability: Availability::Available,
                last_check: None,
            }),
            cooldown,
        }
    }

    /// Returns the current availability.
    pub fn availability(&self) -> Availability {
        self.state.lock().availability
    }

    /// Returns when the remote service was last called, if ever.
    pub fn last_check(&self) -> Option<Instant> {
        self.state.lock().last_check
    }

    /// Returns the cooldown applied after a failure.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns true unless the service is unavailable and the cooldown since
    /// the last check has not yet elapsed.
    pub fn should_attempt_remote(&self) -> bool {
        let state = self.state.lock();
        match (state.availability, state.last_check) {
            (Availability::Available, _) => true,
            (Availability::Unavailable, None) => true,
            (Availability::Unavailable, Some(checked)) => checked.elapsed() >= self.cooldown,
        }
    }

    /// Records a successful remote call.
    pub fn record_success(&self) {
        self.record(Availability::Available);
    }

    /// Records a failed remote call.
    pub fn record_failure(&self) {
        self.record(Availability::Unavailable);
    }

    fn record(&self, availability: Availability) {
        let mut state = self.state.lock();
        state.availability = availability;
        state.last_check = Some(Instant::now());
    }

    /// Forces the state back to `Available` and forgets the last check.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.availability = Availability::Available;
        state.last_check = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> AvailabilityTracker {
        AvailabilityTracker::new(Duration::from_secs(60))
    }

    #[test]
    fn test_starts_available() {
        let tracker = tracker();
        assert_eq!(tracker.availability(), Availability::Available);
        assert!(tracker.last_check().is_none());
        assert!(tracker.should_attempt_remote());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_blocks_remote_until_cooldown_elapses() {
        let tracker = tracker();
        tracker.record_failure();

        assert_eq!(tracker.availability(), Availability::Unavailable);
        assert!(!tracker.should_attempt_remote());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!tracker.should_attempt_remote());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(tracker.should_attempt_remote());
        // Still unavailable until a call actually succeeds
        assert_eq!(tracker.availability(), Availability::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_restores_availability() {
        let tracker = tracker();
        tracker.record_failure();
        tokio::time::advance(Duration::from_secs(61)).await;

        tracker.record_success();
        assert_eq!(tracker.availability(), Availability::Available);
        assert!(tracker.should_attempt_remote());
        assert!(tracker.last_check().is_some());
    }

    #[test]
    fn test_reset_clears_failure() {
        let tracker = tracker();
        tracker.record_failure();

        tracker.reset();
        assert_eq!(tracker.availability(), Availability::Available);
        assert!(tracker.last_check().is_none());
        assert!(tracker.should_attempt_remote());
    }

    #[test]
    fn test_availability_serialization() {
        assert_eq!(
            serde_json::to_string(&Availability::Unavailable).unwrap(),
            "\"unavailable\""
        );
    }

    #[test]
    fn test_tracker_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AvailabilityTracker>();
    }
}
