// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Central tool dispatcher implementing spec.md §4.9's interceptor chain:
//! error-handling → auth-context → tool-body (outermost first). Grounded on
//! `sven-tools`'s `registry::ToolRegistry::execute`, generalised so the
//! "auth-context" step resolves a platform session instead of a mode filter.
use std::collections::HashMap;
use std::sync::Arc;

use tgmcp_core::{auth, CoreError, SessionManager};

use crate::tool::{ErrorRecord, Tool, ToolCall, ToolOutput};

#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    sessions: Arc<SessionManager>,
    auth_required: bool,
    request_seq: std::sync::atomic::AtomicU64,
}

impl ToolRegistry {
    pub fn new(sessions: Arc<SessionManager>, auth_required: bool) -> Self {
        Self {
            tools: HashMap::new(),
            sessions,
            auth_required,
            request_seq: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    fn next_request_id(&self) -> String {
        let seq = self.request_seq.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("req-{seq}")
    }

    /// Runs one tool call through the full interceptor chain: resolves the
    /// effective session key from the request-scoped auth context, acquires
    /// (or reuses) the matching session, and invokes the tool body. Any
    /// failure at any stage becomes an [`ErrorRecord`] rather than
    /// propagating — the only authoritative failure shape a caller ever
    /// sees (spec.md §7).
    pub async fn execute(&self, call: ToolCall) -> ToolOutput {
        let request_id = self.next_request_id();

        let Some(tool) = self.tools.get(&call.name).cloned() else {
            return ToolOutput::error(
                call.id,
                ErrorRecord {
                    ok: false,
                    operation: call.name.clone(),
                    request_id,
                    params: call.args,
                    error: format!("unknown tool: {}", call.name),
                    kind: "not_found",
                },
            );
        };

        let token = auth::get_request_token();
        let session_key = match auth::resolve_session_key(token.as_deref(), self.auth_required) {
            Ok(key) => key,
            Err(err) => return self.error_output(&call, &request_id, &err),
        };

        let handle = match self.sessions.acquire(&session_key).await {
            Ok(handle) => handle,
            Err(err) => return self.error_output(&call, &request_id, &err),
        };

        match tool.call(handle.client().clone(), call.args.clone()).await {
            Ok(value) => ToolOutput::ok(call.id, value),
            Err(err) => {
                if matches!(err, CoreError::Unavailable(_)) {
                    handle.mark_failed();
                }
                self.error_output(&call, &request_id, &err)
            }
        }
    }

    fn error_output(&self, call: &ToolCall, request_id: &str, err: &CoreError) -> ToolOutput {
        ToolOutput::error(
            call.id.clone(),
            ErrorRecord::from_core_error(&call.name, request_id, call.args.clone(), err),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tgmcp_core::platform::MockPlatformClient;
    use tgmcp_core::PlatformClient;
    use tgmcp_config::SessionConfig;

    struct EchoFactory;

    #[async_trait]
    impl tgmcp_core::session::PlatformClientFactory for EchoFactory {
        async fn connect(&self, _token: &str) -> Result<Arc<dyn PlatformClient>, CoreError> {
            Ok(Arc::new(MockPlatformClient::new()))
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its args"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({ "type": "object" })
        }
        async fn call(&self, _client: Arc<dyn PlatformClient>, args: serde_json::Value) -> Result<serde_json::Value, CoreError> {
            Ok(args)
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "always fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({ "type": "object" })
        }
        async fn call(&self, _client: Arc<dyn PlatformClient>, _args: serde_json::Value) -> Result<serde_json::Value, CoreError> {
            Err(CoreError::NotFound("nope".into()))
        }
    }

    fn registry(auth_required: bool) -> ToolRegistry {
        let sessions = Arc::new(SessionManager::new(Arc::new(EchoFactory), SessionConfig::default()));
        let mut reg = ToolRegistry::new(sessions, auth_required);
        reg.register(EchoTool);
        reg.register(FailingTool);
        reg
    }

    #[tokio::test]
    async fn unknown_tool_returns_not_found_error_record() {
        let reg = registry(false);
        let call = ToolCall {
            id: "1".into(),
            name: "missing".into(),
            args: json!({}),
        };
        let out = reg.execute(call).await;
        assert!(out.is_error);
        assert_eq!(out.value["kind"], "not_found");
    }

    #[tokio::test]
    async fn known_tool_executes_and_returns_its_value() {
        let reg = registry(false);
        let call = ToolCall {
            id: "1".into(),
            name: "echo".into(),
            args: json!({"x": 1}),
        };
        let out = reg.execute(call).await;
        assert!(!out.is_error);
        assert_eq!(out.value["x"], 1);
    }

    #[tokio::test]
    async fn auth_required_without_token_is_unauthorized() {
        let reg = registry(true);
        let call = ToolCall {
            id: "1".into(),
            name: "echo".into(),
            args: json!({}),
        };
        let out = reg.execute(call).await;
        assert!(out.is_error);
        assert_eq!(out.value["kind"], "unauthorized");
    }

    #[tokio::test]
    async fn auth_context_token_is_used_as_session_key() {
        let reg = registry(true);
        let call = ToolCall {
            id: "1".into(),
            name: "echo".into(),
            args: json!({}),
        };
        let out = auth::with_auth_context(Some("tok".to_string()), reg.execute(call)).await;
        assert!(!out.is_error);
    }

    #[tokio::test]
    async fn tool_error_is_wrapped_in_error_record() {
        let reg = registry(false);
        let call = ToolCall {
            id: "1".into(),
            name: "failing".into(),
            args: json!({}),
        };
        let out = reg.execute(call).await;
        assert!(out.is_error);
        assert_eq!(out.value["operation"], "failing");
        assert_eq!(out.value["kind"], "not_found");
    }
}
