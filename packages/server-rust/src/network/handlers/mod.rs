//! HTTP handler definitions for the dispatch server.
//!
//! Defines `AppState` (the shared state carried through axum extractors)
//! and re-exports every handler for router assembly.

pub mod dispatch;
pub mod health;

pub use dispatch::{
    batch_handler, describe_category_handler, describe_handler, execute_handler, help_handler,
    query_handler,
};
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::service::Dispatcher;

/// Shared state passed to all axum handlers via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub shutdown: Arc<ShutdownController>,
    /// Process start time, for uptime reporting.
    pub start_time: Instant,
}
