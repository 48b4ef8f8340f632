//! Graceful shutdown controller with in-flight request tracking.
//!
//! Health state lives in an `ArcSwap` so probes read it without locking.
//! The in-flight count is a `watch` channel: guards bump it up and down and
//! draining waits for it to reach zero instead of polling.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::sync::watch;

/// Server health state.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Listener bound but not yet serving.
    Starting,
    /// Accepting dispatch requests.
    Ready,
    /// Refusing new dispatch requests while in-flight ones finish.
    Draining,
    /// Every in-flight request has finished.
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Starting => "starting",
            HealthState::Ready => "ready",
            HealthState::Draining => "draining",
            HealthState::Stopped => "stopped",
        }
    }

    /// Returns true once shutdown has begun.
    #[must_use]
    pub fn is_shutting_down(self) -> bool {
        matches!(self, HealthState::Draining | HealthState::Stopped)
    }
}

/// Coordinates health state and draining across the server.
#[derive(Debug)]
pub struct ShutdownController {
    health_state: ArcSwap<HealthState>,
    in_flight: Arc<watch::Sender<u64>>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            health_state: ArcSwap::from_pointee(HealthState::Starting),
            in_flight: Arc::new(tx),
        }
    }

    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Moves to `Draining`; dispatch routes start answering 503.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Tracks one request until the returned guard is dropped.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.send_modify(|n| *n += 1);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        *self.in_flight.borrow()
    }

    /// Waits up to `timeout` for the in-flight count to reach zero.
    ///
    /// On success the state becomes `Stopped` and `true` is returned. On
    /// timeout the state stays `Draining` and `false` is returned.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let mut rx = self.in_flight.subscribe();
        let drained = tokio::time::timeout(timeout, rx.wait_for(|n| *n == 0))
            .await
            .is_ok_and(|res| res.is_ok());
        if drained {
            self.health_state.store(Arc::new(HealthState::Stopped));
        }
        drained
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight count on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<watch::Sender<u64>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }
}
