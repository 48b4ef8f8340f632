//! Sequential batch runner.
//!
//! Requests run strictly in input order with one pending call at a time.
//! With `stop_on_error`, the first failure ends the batch and later requests
//! are never attempted. Nothing is rolled back.

use std::future::Future;

use discord_dispatch_core::{BatchResult, ExecuteRequest, ExecutionResult};
use tracing::{info, warn};

/// Runs `requests` through `execute` one after another.
pub async fn run_batch<F, Fut>(
    requests: Vec<ExecuteRequest>,
    stop_on_error: bool,
    mut execute: F,
) -> BatchResult
where
    F: FnMut(ExecuteRequest) -> Fut,
    Fut: Future<Output = ExecutionResult>,
{
    let submitted = requests.len();
    let mut results = Vec::with_capacity(submitted);
    let mut completed_count = 0;
    let mut failed_count = 0;

    for (index, request) in requests.into_iter().enumerate() {
        let result = execute(request).await;
        let failed = !result.is_success();
        results.push(result);

        if failed {
            failed_count += 1;
            if stop_on_error {
                warn!(index, submitted, "batch stopped at failed request");
                break;
            }
        } else {
            completed_count += 1;
        }
    }

    info!(
        submitted,
        attempted = results.len(),
        completed_count,
        failed_count,
        "batch finished"
    );

    BatchResult {
        success: failed_count == 0,
        results,
        completed_count,
        failed_count,
    }
}

#[cfg(test)]
mod tests {
    use discord_dispatch_core::Params;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn request(action: &str) -> ExecuteRequest {
        ExecuteRequest::new("message", action, Params::new())
    }

    /// Runs a batch where actions named `"fail"` fail, returning the result
    /// and the actions that were attempted.
    async fn run(actions: &[&str], stop_on_error: bool) -> (BatchResult, Vec<String>) {
        let mut attempted = Vec::new();
        let requests = actions.iter().map(|a| request(a)).collect();
        let result = run_batch(requests, stop_on_error, |req| {
            attempted.push(req.action.clone());
            let fail = req.action == "fail";
            async move {
                if fail {
                    ExecutionResult::failed("boom")
                } else {
                    ExecutionResult::ok(json!(req.action))
                }
            }
        })
        .await;
        (result, attempted)
    }

    #[tokio::test]
    async fn stop_on_error_omits_unattempted_requests() {
        let (result, attempted) = run(&["send", "fail", "pin"], true).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.completed_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(attempted, vec!["send", "fail"]);
    }

    #[tokio::test]
    async fn continue_on_error_attempts_everything() {
        let (result, attempted) = run(&["send", "fail", "pin"], false).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.completed_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(attempted, vec!["send", "fail", "pin"]);
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let (result, _) = run(&["a", "b", "c"], true).await;
        let data: Vec<_> = result.results.iter().filter_map(|r| r.data().cloned()).collect();
        assert_eq!(data, vec![json!("a"), json!("b"), json!("c")]);
        assert!(result.success);
    }

    #[tokio::test]
    async fn empty_batch_succeeds() {
        let (result, attempted) = run(&[], true).await;
        assert!(result.success);
        assert!(result.results.is_empty());
        assert!(attempted.is_empty());
    }

    proptest! {
        #[test]
        fn counts_always_add_up(outcomes in proptest::collection::vec(any::<bool>(), 0..12), stop in any::<bool>()) {
            let actions: Vec<&str> = outcomes.iter().map(|ok| if *ok { "send" } else { "fail" }).collect();
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (result, attempted) = runtime.block_on(run(&actions, stop));

            prop_assert_eq!(result.results.len(), attempted.len());
            prop_assert_eq!(result.completed_count + result.failed_count, result.results.len());
            prop_assert_eq!(result.success, result.failed_count == 0);
            if stop {
                prop_assert!(result.failed_count <= 1);
                if result.failed_count == 1 {
                    prop_assert!(!result.results[result.results.len() - 1].is_success());
                }
            } else {
                prop_assert_eq!(result.results.len(), actions.len());
            }
        }
    }
}
