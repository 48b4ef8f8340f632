//! Tower middleware layers for the invocation pipeline.
//!
//! - [`metrics`]: Span, outcome log, and `metrics` counters per invocation
//! - [`pipeline`]: Composes the layers around the platform service

pub mod metrics;
pub mod pipeline;

pub use metrics::MetricsLayer;
pub use pipeline::{build_invocation_pipeline, InvocationPipeline};
