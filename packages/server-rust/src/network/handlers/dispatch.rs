//! Dispatch endpoints: execute, query, batch, help, and describe.
//!
//! Every body that parses yields 200; success or failure travels inside the
//! `ExecutionResult` / `BatchResult`. Malformed JSON is rejected by the
//! `Json` extractor before reaching the dispatcher.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use discord_dispatch_core::{
    BatchRequest, BatchResult, ExecuteRequest, ExecutionResult, HelpIndex, QueryRequest,
};

use super::AppState;

pub async fn execute_handler(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Json<ExecutionResult> {
    let result = state
        .dispatcher
        .execute(&request.category, &request.action, request.parameters)
        .await;
    Json(result)
}

pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<ExecutionResult> {
    let result = state
        .dispatcher
        .query(&request.resource, request.filters, request.limit)
        .await;
    Json(result)
}

pub async fn batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResult> {
    let result = state
        .dispatcher
        .batch(request.requests, request.stop_on_error)
        .await;
    Json(result)
}

pub async fn help_handler(State(state): State<AppState>) -> Json<HelpIndex> {
    Json(state.dispatcher.help())
}

/// Plain-text description of every category and resource.
pub async fn describe_handler(State(state): State<AppState>) -> Result<String, (StatusCode, String)> {
    describe(&state, None)
}

/// Plain-text description of one category; 404 when it is not registered.
pub async fn describe_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<String, (StatusCode, String)> {
    describe(&state, Some(&category))
}

fn describe(state: &AppState, category: Option<&str>) -> Result<String, (StatusCode, String)> {
    state
        .dispatcher
        .describe(category)
        .map_err(|err| (StatusCode::NOT_FOUND, err.to_string()))
}
