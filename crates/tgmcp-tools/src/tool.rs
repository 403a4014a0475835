// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The [`Tool`] trait and the request/response envelope every tool call is
//! wrapped in, grounded on `sven-tools`'s `tool::Tool` trait and
//! `registry::ToolRegistry`'s central dispatcher.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use tgmcp_core::{CoreError, PlatformClient};

/// A single tool invocation requested by the transport.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// A tool's declared body: pure domain logic against an already-acquired
/// platform session. Everything outside this — auth resolution, session
/// acquisition, error recording — is handled once by
/// [`crate::registry::ToolRegistry::execute`] (spec.md §4.9's interceptor
/// chain), so bodies never see a bearer token or a `SessionManager`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for this tool's parameters.
    fn parameters_schema(&self) -> Value;
    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError>;
}

/// The structured error record spec.md §3/§7 mandates: `{ok: false, error,
/// operation, request_id, params}`, additionally tagged with the
/// [`CoreError`] kind.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub ok: bool,
    pub operation: String,
    pub request_id: String,
    pub params: Value,
    pub error: String,
    pub kind: &'static str,
}

impl ErrorRecord {
    pub fn from_core_error(operation: &str, request_id: &str, params: Value, err: &CoreError) -> Self {
        Self {
            ok: false,
            operation: operation.to_string(),
            request_id: request_id.to_string(),
            params,
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// The outcome of one tool call: either the tool body's JSON return value,
/// or an [`ErrorRecord`] — both serialisable, so the transport layer never
/// needs to distinguish the two cases to forward a response.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    pub value: Value,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, value: Value) -> Self {
        Self {
            call_id: call_id.into(),
            value,
            is_error: false,
        }
    }

    pub fn error(call_id: impl Into<String>, record: ErrorRecord) -> Self {
        Self {
            call_id: call_id.into(),
            value: serde_json::to_value(record).expect("ErrorRecord always serialises"),
            is_error: true,
        }
    }
}
