// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HTTP-based tool-calling transport (spec.md §6 "Network mode").
//!
//! Grounded on `sven-gateway`'s `http::auth::bearer_auth_mw` for the
//! middleware shape — extract the header, fail fast on a missing/malformed
//! bearer, otherwise let the request through — generalised per spec.md §4.2:
//! there is no pre-shared secret to verify the token against here, since the
//! bearer token itself *is* the session key [`tgmcp_core::session::SessionManager`]
//! keys on, so unlike `sven-gateway`'s hashed-token comparison this
//! middleware only validates *presence*, not a fixed value.
//!
//! The wire shape of "dispatches named tools, serializes results" is
//! treated as an external collaborator's interface in spec.md §1 ("the
//! tool-calling transport framework itself"); this module supplies the
//! minimal concrete realisation of that interface: `GET /tools` lists
//! schemas, `POST /tools/call` invokes one by name.
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tgmcp_core::auth;
use tgmcp_tools::{ToolCall, ToolRegistry};

#[derive(Clone)]
struct AppState {
    registry: Arc<ToolRegistry>,
    auth_required: bool,
}

/// Builds the axum [`Router`] for network mode: `GET /tools`, `POST
/// /tools/call`, both behind the bearer-extraction middleware.
pub fn router(registry: Arc<ToolRegistry>, auth_required: bool) -> Router {
    let state = AppState {
        registry,
        auth_required,
    };
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// Extracts the bearer token (if any) and installs it as this request's
/// auth-context scope before running the rest of the chain. When auth is
/// required and no valid bearer is present, fails the request with `401`
/// and the spec.md §4.2 message before the handler ever runs.
async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let header_pairs: Vec<(&str, &str)> = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect();
    let token = auth::extract_bearer(header_pairs);

    if state.auth_required && token.is_none() {
        return (StatusCode::UNAUTHORIZED, "Missing Bearer token").into_response();
    }

    auth::with_auth_context(token, next.run(req)).await
}

#[derive(Debug, Serialize)]
struct ToolSummary {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSummary>> {
    let summaries = state
        .registry
        .schemas()
        .into_iter()
        .map(|s| ToolSummary {
            name: s.name,
            description: s.description,
            parameters: s.parameters,
        })
        .collect();
    Json(summaries)
}

#[derive(Debug, Deserialize)]
struct CallToolRequest {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CallToolResponse {
    #[serde(flatten)]
    value: serde_json::Value,
}

async fn call_tool(State(state): State<AppState>, Json(req): Json<CallToolRequest>) -> Response {
    let call = ToolCall {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        args: req.arguments,
    };
    let output = state.registry.execute(call).await;
    let status = if output.is_error {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(CallToolResponse { value: output.value })).into_response()
}
