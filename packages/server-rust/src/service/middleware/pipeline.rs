//! Pipeline composition: wraps the platform service in the invocation layers.

use std::sync::Arc;

use tower::ServiceBuilder;

use super::metrics::{MetricsLayer, MetricsService};
use crate::service::platform::{ChatPlatform, PlatformService};

/// The composed invocation service held by the dispatcher.
pub type InvocationPipeline = MetricsService<PlatformService>;

/// Builds the invocation pipeline around `platform`.
///
/// Layer order (outermost to innermost):
/// 1. `MetricsLayer` -- span, outcome log, counters and duration histogram
/// 2. `PlatformService` -- hands the bound operation to the platform
///
/// No timeout layer: individual platform calls are not time-bounded here.
#[must_use]
pub fn build_invocation_pipeline(platform: Arc<dyn ChatPlatform>) -> InvocationPipeline {
    ServiceBuilder::new()
        .layer(MetricsLayer)
        .service(PlatformService::new(platform))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
