//! Health, liveness, and readiness endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;
use crate::network::HealthState;

/// Returns health details as JSON.
///
/// Always 200; the `state` field says whether the server is ready,
/// draining, or still starting.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let registry = state.dispatcher.registry();

    Json(json!({
        "state": state.shutdown.health_state(),
        "in_flight": state.shutdown.in_flight_count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "categories": registry.category_names().len(),
        "resources": registry.resource_names().len(),
    }))
}

/// Liveness probe: 200 whenever the process answers.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 200 when `Ready`, 503 while starting or shutting down.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use discord_dispatch_core::ActionRegistry;

    use super::*;
    use crate::network::ShutdownController;
    use crate::service::{Dispatcher, DryRunPlatform};

    fn test_state() -> AppState {
        let registry = Arc::new(ActionRegistry::builtin().unwrap());
        AppState {
            dispatcher: Arc::new(Dispatcher::new(registry, Arc::new(DryRunPlatform::new()))),
            shutdown: Arc::new(ShutdownController::new()),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn health_handler_returns_json_with_all_fields() {
        let state = test_state();
        state.shutdown.set_ready();

        let json = health_handler(State(state)).await.0;
        assert_eq!(json["state"], "ready");
        assert_eq!(json["in_flight"], 0);
        assert!(json["uptime_secs"].is_number());
        assert!(json["categories"].as_u64().unwrap() > 0);
        assert!(json["resources"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn health_handler_reports_draining_state() {
        let state = test_state();
        state.shutdown.set_ready();
        state.shutdown.trigger_shutdown();

        let json = health_handler(State(state)).await.0;
        assert_eq!(json["state"], "draining");
    }

    #[tokio::test]
    async fn health_handler_reports_in_flight_count() {
        let state = test_state();
        let _guard = state.shutdown.in_flight_guard();

        let json = health_handler(State(state)).await.0;
        assert_eq!(json["in_flight"], 1);
    }

    #[tokio::test]
    async fn liveness_handler_always_returns_200() {
        assert_eq!(liveness_handler().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_health_state() {
        let state = test_state();
        assert_eq!(
            readiness_handler(State(state.clone())).await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.shutdown.set_ready();
        assert_eq!(readiness_handler(State(state.clone())).await, StatusCode::OK);

        state.shutdown.trigger_shutdown();
        assert_eq!(
            readiness_handler(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
