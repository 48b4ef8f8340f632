//! Metrics middleware for invocations.
//!
//! Wraps every invocation in an `operation` span, logs its outcome, and
//! records `dispatch_operations_total{operation,outcome}` and
//! `dispatch_operation_duration_seconds{operation}` through the `metrics`
//! facade. Without an installed recorder the `metrics` calls are no-ops.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use discord_dispatch_core::DispatchError;
use serde_json::Value;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::invocation::Invocation;

pub const OPERATIONS_TOTAL: &str = "dispatch_operations_total";
pub const OPERATION_DURATION_SECONDS: &str = "dispatch_operation_duration_seconds";

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments invocations with spans, logs, and metrics.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Invocation> for MetricsService<S>
where
    S: Service<Invocation, Response = Value, Error = DispatchError> + Send,
    S::Future: Send + 'static,
{
    type Response = Value;
    type Error = DispatchError;
    type Future = Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        let operation = invocation.operation_name();
        let call_id = invocation.ctx.call_id;
        let entry = invocation.ctx.entry.as_str();

        let span = info_span!(
            "operation",
            call_id = call_id,
            entry = entry,
            label = %invocation.ctx.label,
            operation = operation,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(invocation);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();

                let outcome = if result.is_ok() { "ok" } else { "error" };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                let span = tracing::Span::current();
                span.record("duration_ms", duration_ms);
                span.record("outcome", outcome);

                metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
                    .record(elapsed.as_secs_f64());

                match &result {
                    Ok(_) => tracing::info!(call_id, operation, duration_ms, "operation complete"),
                    Err(err) => tracing::warn!(
                        call_id,
                        operation,
                        duration_ms,
                        error = %err,
                        "operation failed"
                    ),
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
