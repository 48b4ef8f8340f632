//! HTTP middleware for the dispatch server.
//!
//! Transport-level concerns only. Invocation-level instrumentation lives in
//! the service pipeline.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::config::NetworkConfig;
use super::shutdown::ShutdownController;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps `router` in the transport middleware stack.
///
/// Ordering, outermost first:
/// 1. `SetRequestId` -- assigns a UUID `x-request-id` when the caller sent none
/// 2. `Trace` -- request/response spans
/// 3. `Compression` -- gzip responses
/// 4. `Cors` -- configured origins, GET and POST
/// 5. `PropagateRequestId` -- echoes `x-request-id` on the response
///
/// The request timeout is not part of this stack; see [`timeout_layer`].
pub fn apply_http_layers<S>(router: Router<S>, config: &NetworkConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors_layer(&config.cors_origins))
            .layer(PropagateRequestIdLayer::new(request_id)),
    )
}

/// Answers 408 once `request_timeout` elapses.
///
/// Only for routes that touch no platform: dropping an execute, query, or
/// batch future mid-flight would lose the result of calls already made.
#[must_use]
pub fn timeout_layer(config: &NetworkConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Counts the request as in flight, or answers 503 once draining has begun.
pub async fn track_in_flight(
    State(shutdown): State<Arc<ShutdownController>>,
    request: Request,
    next: Next,
) -> Response {
    if shutdown.health_state().is_shutting_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": "server is shutting down" })),
        )
            .into_response();
    }
    let _guard = shutdown.in_flight_guard();
    next.run(request).await
}
