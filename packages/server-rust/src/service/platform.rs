//! Chat-platform collaborator boundary.
//!
//! [`ChatPlatform`] is the only seam between the dispatch layer and the
//! remote API. [`PlatformService`] adapts it into the innermost tower service
//! of the invocation pipeline.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anyhow::anyhow;
use async_trait::async_trait;
use discord_dispatch_core::{DispatchError, Operation, OperationKind};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tower::Service;

use super::invocation::Invocation;

/// Performs bound operations against the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Runs one operation and returns its JSON result.
    ///
    /// # Errors
    ///
    /// Any failure reported by the platform. The dispatcher renders it into
    /// `DispatchError::UnderlyingOperationFailure`.
    async fn invoke(&self, operation: Operation) -> anyhow::Result<Value>;
}

// ---------------------------------------------------------------------------
// DryRunPlatform
// ---------------------------------------------------------------------------

/// Platform that performs no I/O and echoes each invocation back.
///
/// Result shape: `{"dryRun": true, "operation": <name>, "args": {..}}`.
#[derive(Debug, Default)]
pub struct DryRunPlatform {
    recorded: Option<Mutex<Vec<Operation>>>,
    rejected: HashSet<OperationKind>,
}

impl DryRunPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dry-run platform that keeps every invocation for later inspection.
    #[must_use]
    pub fn recording() -> Self {
        Self {
            recorded: Some(Mutex::new(Vec::new())),
            ..Self::default()
        }
    }

    /// Makes every invocation of `kinds` fail.
    #[must_use]
    pub fn rejecting(mut self, kinds: impl IntoIterator<Item = OperationKind>) -> Self {
        self.rejected.extend(kinds);
        self
    }

    /// Operations invoked so far, oldest first. Empty unless recording.
    #[must_use]
    pub fn invocations(&self) -> Vec<Operation> {
        self.recorded
            .as_ref()
            .map(|calls| calls.lock().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatPlatform for DryRunPlatform {
    async fn invoke(&self, operation: Operation) -> anyhow::Result<Value> {
        if let Some(calls) = &self.recorded {
            calls.lock().push(operation.clone());
        }
        if self.rejected.contains(&operation.kind()) {
            return Err(anyhow!("dry run rejects {}", operation.name()));
        }

        let Value::Object(tagged) = serde_json::to_value(&operation)? else {
            return Err(anyhow!("{} did not serialize to an object", operation.name()));
        };
        let mut echo = Map::with_capacity(tagged.len() + 1);
        echo.insert("dryRun".to_string(), Value::Bool(true));
        echo.extend(tagged);
        Ok(Value::Object(echo))
    }
}

// ---------------------------------------------------------------------------
// PlatformService
// ---------------------------------------------------------------------------

/// Innermost pipeline service: hands the operation to the platform.
#[derive(Clone)]
pub struct PlatformService {
    platform: Arc<dyn ChatPlatform>,
}

impl PlatformService {
    #[must_use]
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }
}

impl Service<Invocation> for PlatformService {
    type Response = Value;
    type Error = DispatchError;
    type Future = Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        let platform = Arc::clone(&self.platform);
        Box::pin(async move {
            let operation = invocation.operation_name();
            platform
                .invoke(invocation.operation)
                .await
                .map_err(|err| DispatchError::UnderlyingOperationFailure {
                    operation,
                    message: format!("{err:#}"),
                })
        })
    }
}
