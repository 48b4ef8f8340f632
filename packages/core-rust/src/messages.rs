//! Inbound request and outbound result shapes.
//!
//! All types use `#[serde(rename_all = "camelCase")]` so the JSON produced
//! for HTTP callers is `completedCount`, `stopOnError`, and so on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;
use crate::params::Params;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Execute one action of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub category: String,
    pub action: String,
    #[serde(default)]
    pub parameters: Params,
}

impl ExecuteRequest {
    #[must_use]
    pub fn new(category: impl Into<String>, action: impl Into<String>, parameters: Params) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            parameters,
        }
    }
}

/// Read a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filters: Option<Params>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub limit: Option<u64>,
}

/// Run several execute requests in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub requests: Vec<ExecuteRequest>,
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,
}

fn default_stop_on_error() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of one execute or query call.
///
/// Carries either `data` (on success) or `error` (on failure), never both.
/// Fields are private so that invariant cannot be broken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ExecutionResult {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl From<Result<Value, DispatchError>> for ExecutionResult {
    fn from(result: Result<Value, DispatchError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}

/// Outcome of a batch.
///
/// `results` holds one entry per attempted request; requests skipped after an
/// early stop have no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success: bool,
    pub results: Vec<ExecutionResult>,
    pub completed_count: usize,
    pub failed_count: usize,
}

impl BatchResult {
    /// Number of requests never attempted out of `submitted`.
    #[must_use]
    pub fn skipped(&self, submitted: usize) -> usize {
        submitted.saturating_sub(self.results.len())
    }
}
