//! Dispatcher: the execute, query, batch, and introspection entry points.
//!
//! Every entry point validates names first, then normalizes, resolves,
//! positions, binds, and invokes through the pipeline. Failures at any stage
//! come back inside the result; nothing here returns `Err` to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use discord_dispatch_core::normalize::{COUNT_KEY, KEY_ALIASES};
use discord_dispatch_core::{
    describe, normalize, ActionRegistry, BatchResult, DispatchError, ExecuteRequest,
    ExecutionResult, HelpIndex, Operation, Params, ResolveError, Resolved,
};
use serde_json::Value;
use tower::ServiceExt;
use tracing::error;

use super::batch::run_batch;
use super::invocation::{EntryPoint, Invocation, InvocationContext};
use super::middleware::{build_invocation_pipeline, InvocationPipeline};
use super::platform::ChatPlatform;

/// Entry point for all dispatch traffic.
///
/// Holds the shared immutable registry and the invocation pipeline. Cheap to
/// share behind an `Arc`; independent calls may run concurrently.
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    pipeline: InvocationPipeline,
    call_id_counter: AtomicU64,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<ActionRegistry>, platform: Arc<dyn ChatPlatform>) -> Self {
        Self {
            registry,
            pipeline: build_invocation_pipeline(platform),
            call_id_counter: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    fn next_call_id(&self) -> u64 {
        self.call_id_counter.fetch_add(1, Ordering::Relaxed)
    }

    // ----- Entry points -----

    /// Executes `action` of `category` with `params`.
    pub async fn execute(&self, category: &str, action: &str, params: Params) -> ExecutionResult {
        self.try_execute(category, action, params).await.into()
    }

    /// Reads `resource`, with `limit` taking precedence over any count filter.
    pub async fn query(
        &self,
        resource: &str,
        filters: Option<Params>,
        limit: Option<u64>,
    ) -> ExecutionResult {
        self.try_query(resource, filters, limit).await.into()
    }

    /// Executes `requests` in order; see [`run_batch`].
    pub async fn batch(&self, requests: Vec<ExecuteRequest>, stop_on_error: bool) -> BatchResult {
        run_batch(requests, stop_on_error, |request| self.execute_request(request)).await
    }

    /// Category -> action names, plus resource names.
    #[must_use]
    pub fn help(&self) -> HelpIndex {
        self.registry.help()
    }

    /// Text description of one category, or of everything.
    ///
    /// # Errors
    ///
    /// `DispatchError::InvalidCategory` for an unregistered category.
    pub fn describe(&self, category: Option<&str>) -> Result<String, DispatchError> {
        describe(&self.registry, category)
    }

    // ----- Stages -----

    async fn execute_request(&self, request: ExecuteRequest) -> ExecutionResult {
        let ExecuteRequest {
            category,
            action,
            parameters,
        } = request;
        self.execute(&category, &action, parameters).await
    }

    async fn try_execute(
        &self,
        category: &str,
        action: &str,
        params: Params,
    ) -> Result<Value, DispatchError> {
        self.registry.check_action(category, action)?;

        let label = format!("{category}.{action}");
        let resolved = self
            .registry
            .resolve_action(category, action, normalize(params))
            .map_err(|err| resolution_error(&label, err))?;

        self.invoke(EntryPoint::Execute, label, resolved).await
    }

    async fn try_query(
        &self,
        resource: &str,
        filters: Option<Params>,
        limit: Option<u64>,
    ) -> Result<Value, DispatchError> {
        self.registry.check_resource(resource)?;

        let mut filters = filters.unwrap_or_default();
        if let Some(limit) = limit {
            remove_count_keys(&mut filters);
            filters.insert(COUNT_KEY.to_string(), Value::from(limit));
        }

        let resolved = self
            .registry
            .resolve_query(resource, normalize(filters))
            .map_err(|err| resolution_error(resource, err))?;

        self.invoke(EntryPoint::Query, resource.to_string(), resolved).await
    }

    async fn invoke(
        &self,
        entry: EntryPoint,
        label: String,
        resolved: Resolved,
    ) -> Result<Value, DispatchError> {
        let Resolved { operation, params } = resolved;
        let slots = operation.positional_args(&params);
        let bound = Operation::bind(operation, slots).map_err(|err| {
            DispatchError::InvalidParameters {
                operation: label.clone(),
                reason: err.to_string(),
            }
        })?;

        let ctx = InvocationContext {
            call_id: self.next_call_id(),
            entry,
            label,
        };
        self.pipeline
            .clone()
            .oneshot(Invocation::new(ctx, bound))
            .await
    }
}

/// Drops every key that normalizes onto the count key.
fn remove_count_keys(filters: &mut Params) {
    filters.remove(COUNT_KEY);
    for (alias, canonical) in KEY_ALIASES {
        if *canonical == COUNT_KEY {
            filters.remove(*alias);
        }
    }
}

fn resolution_error(target: &str, err: ResolveError) -> DispatchError {
    match err {
        ResolveError::Discriminator { .. } => DispatchError::InvalidParameters {
            operation: target.to_string(),
            reason: err.to_string(),
        },
        other => {
            error!(name = target, error = %other, "registry failed to resolve a validated name");
            DispatchError::ResolutionFailure {
                target: target.to_string(),
                reason: other.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use discord_dispatch_core::{args, params, ChannelOptions, OperationKind};
    use serde_json::json;

    use super::*;
    use crate::service::platform::DryRunPlatform;

    fn dispatcher_with(platform: Arc<DryRunPlatform>) -> Dispatcher {
        let registry = Arc::new(ActionRegistry::builtin().unwrap());
        Dispatcher::new(registry, platform)
    }

    fn recording() -> (Dispatcher, Arc<DryRunPlatform>) {
        let platform = Arc::new(DryRunPlatform::recording());
        (dispatcher_with(Arc::clone(&platform)), platform)
    }

    // ----- execute -----

    #[tokio::test]
    async fn execute_send_positions_aliased_message() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute(
                "message",
                "send",
                params([("channelId", json!("123")), ("content", json!("hi"))]),
            )
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(
            platform.invocations(),
            vec![Operation::SendMessage(args::SendMessage {
                channel_id: "123".to_string(),
                message: "hi".to_string(),
            })]
        );
        assert_eq!(result.data().unwrap()["args"]["message"], "hi");
    }

    #[tokio::test]
    async fn execute_unknown_category_lists_valid_categories() {
        let (dispatcher, platform) = recording();
        let result = dispatcher.execute("nope", "send", Params::new()).await;

        assert!(!result.is_success());
        let expected = format!(
            "Invalid category 'nope'. Valid categories: {}",
            dispatcher.registry().category_names().join(", ")
        );
        assert_eq!(result.error(), Some(expected.as_str()));
        assert!(platform.invocations().is_empty());
    }

    #[tokio::test]
    async fn execute_unknown_action_lists_valid_actions() {
        let (dispatcher, platform) = recording();
        let result = dispatcher.execute("message", "shout", Params::new()).await;

        let error = result.error().unwrap();
        assert!(error.starts_with("Invalid action 'shout' for category 'message'. Valid actions: "));
        assert!(error.contains("send"));
        assert!(platform.invocations().is_empty());
    }

    #[tokio::test]
    async fn execute_coerces_numeric_count() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute(
                "message",
                "bulk_delete",
                params([("channelId", json!("c")), ("limit", json!(25))]),
            )
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(
            platform.invocations(),
            vec![Operation::BulkDeleteMessages(args::BulkDeleteMessages {
                channel_id: "c".to_string(),
                count: "25".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn execute_applies_rename_table() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute(
                "message",
                "reply",
                params([
                    ("channelId", json!("c")),
                    ("replyTo", json!("m")),
                    ("text", json!("yo")),
                ]),
            )
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(
            platform.invocations(),
            vec![Operation::ReplyToMessage(args::ReplyToMessage {
                channel_id: "c".to_string(),
                message_id: "m".to_string(),
                message: "yo".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn execute_channel_create_packs_options() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute(
                "channel",
                "create",
                params([
                    ("serverId", json!("g")),
                    ("name", json!("lobby")),
                    ("type", json!("voice")),
                    ("userLimit", json!(10)),
                    ("bitrate", json!(64_000)),
                ]),
            )
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(
            platform.invocations(),
            vec![Operation::CreateVoiceChannel(args::CreateVoiceChannel {
                guild_id: Some("g".to_string()),
                name: "lobby".to_string(),
                options: Some(ChannelOptions {
                    user_limit: Some("10".to_string()),
                    bitrate: Some(64_000),
                    ..ChannelOptions::default()
                }),
            })]
        );
    }

    #[tokio::test]
    async fn execute_unknown_discriminator_is_invalid_parameters() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute(
                "channel",
                "create",
                params([("name", json!("x")), ("type", json!("stage"))]),
            )
            .await;

        assert_eq!(
            result.error(),
            Some(
                "Invalid parameters for channel.create: unsupported type 'stage', expected one of: text, voice, category, forum"
            )
        );
        assert!(platform.invocations().is_empty());
    }

    #[tokio::test]
    async fn execute_missing_required_parameter_is_invalid_parameters() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .execute("message", "send", params([("message", json!("hi"))]))
            .await;

        assert_eq!(
            result.error(),
            Some("Invalid parameters for message.send: missing required parameter 'channelId'")
        );
        assert!(platform.invocations().is_empty());
    }

    #[tokio::test]
    async fn execute_platform_failure_is_underlying_failure() {
        let platform =
            Arc::new(DryRunPlatform::recording().rejecting([OperationKind::SendMessage]));
        let dispatcher = dispatcher_with(Arc::clone(&platform));
        let result = dispatcher
            .execute(
                "message",
                "send",
                params([("channelId", json!("1")), ("message", json!("hi"))]),
            )
            .await;

        assert_eq!(
            result.error(),
            Some("sendMessage failed: dry run rejects sendMessage")
        );
        assert!(result.data().is_none());
    }

    // ----- query -----

    #[tokio::test]
    async fn query_limit_overrides_count_filter() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .query(
                "messages",
                Some(params([("channelId", json!("c")), ("limit", json!(99))])),
                Some(10),
            )
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(
            platform.invocations(),
            vec![Operation::GetMessages(args::GetMessages {
                channel_id: "c".to_string(),
                count: Some("10".to_string()),
            })]
        );
    }

    #[tokio::test]
    async fn query_without_limit_uses_filter_alias() {
        let (dispatcher, platform) = recording();
        dispatcher
            .query(
                "messages",
                Some(params([("channelId", json!("c")), ("limit", json!(5))])),
                None,
            )
            .await;

        assert_eq!(
            platform.invocations(),
            vec![Operation::GetMessages(args::GetMessages {
                channel_id: "c".to_string(),
                count: Some("5".to_string()),
            })]
        );
    }

    #[tokio::test]
    async fn query_unknown_resource_lists_valid_resources() {
        let (dispatcher, platform) = recording();
        let result = dispatcher.query("nope", None, None).await;

        let expected = format!(
            "Invalid resource 'nope'. Valid resources: {}",
            dispatcher.registry().query_names().join(", ")
        );
        assert_eq!(result.error(), Some(expected.as_str()));
        assert!(platform.invocations().is_empty());
    }

    #[tokio::test]
    async fn query_category_name_reads_default_resource() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .query("message", Some(params([("channelId", json!("c"))])), None)
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(platform.invocations()[0].kind(), OperationKind::GetMessages);
    }

    #[tokio::test]
    async fn query_channel_lists_channels_not_one_channel() {
        let (dispatcher, platform) = recording();
        let result = dispatcher
            .query("channel", Some(params([("guildId", json!("g"))])), None)
            .await;

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(platform.invocations()[0].kind(), OperationKind::ListChannels);
    }

    #[tokio::test]
    async fn query_without_filters_invokes_zero_arg_operation() {
        let (dispatcher, platform) = recording();
        let result = dispatcher.query("servers", None, None).await;

        assert!(result.is_success());
        assert_eq!(
            platform.invocations(),
            vec![Operation::ListServers(args::ListServers {})]
        );
    }

    // ----- batch -----

    fn send(channel: &str) -> ExecuteRequest {
        ExecuteRequest::new(
            "message",
            "send",
            params([("channelId", json!(channel)), ("message", json!("hi"))]),
        )
    }

    #[tokio::test]
    async fn batch_stops_after_first_failure() {
        let (dispatcher, platform) = recording();
        let requests = vec![
            send("1"),
            ExecuteRequest::new("nope", "send", Params::new()),
            send("3"),
        ];

        let result = dispatcher.batch(requests, true).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.completed_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(platform.invocations().len(), 1);
    }

    #[tokio::test]
    async fn batch_continues_when_asked() {
        let (dispatcher, platform) = recording();
        let requests = vec![
            send("1"),
            ExecuteRequest::new("nope", "send", Params::new()),
            send("3"),
        ];

        let result = dispatcher.batch(requests, false).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.completed_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(platform.invocations().len(), 2);
    }

    #[tokio::test]
    async fn batch_does_not_roll_back_completed_work() {
        let platform =
            Arc::new(DryRunPlatform::recording().rejecting([OperationKind::PinMessage]));
        let dispatcher = dispatcher_with(Arc::clone(&platform));
        let requests = vec![
            send("1"),
            ExecuteRequest::new(
                "message",
                "pin",
                params([("channelId", json!("1")), ("messageId", json!("m"))]),
            ),
        ];

        let result = dispatcher.batch(requests, true).await;
        assert!(result.results[0].is_success());
        assert!(!result.results[1].is_success());
        assert_eq!(platform.invocations().len(), 2);
    }

    // ----- introspection -----

    #[test]
    fn help_lists_categories_and_resources() {
        let dispatcher = dispatcher_with(Arc::new(DryRunPlatform::new()));
        let help = dispatcher.help();
        assert!(help.categories["message"].contains(&"send"));
        assert!(help.resources.contains(&"messages"));
    }

    #[test]
    fn describe_unknown_category_matches_execute_error() {
        let dispatcher = dispatcher_with(Arc::new(DryRunPlatform::new()));
        let err = dispatcher.describe(Some("nope")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid category 'nope'"));
    }

    #[test]
    fn call_ids_are_unique_and_monotonic() {
        let dispatcher = dispatcher_with(Arc::new(DryRunPlatform::new()));
        let first = dispatcher.next_call_id();
        let second = dispatcher.next_call_id();
        assert!(second > first);
    }
}
