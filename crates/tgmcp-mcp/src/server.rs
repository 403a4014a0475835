// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! [`TgmcpMcpServer`] — the rmcp [`ServerHandler`] implementation that
//! exposes a [`ToolRegistry`] over the MCP `tools/list` / `tools/call`
//! protocol methods, grounded on `sven-mcp`'s `SvenMcpServer`.
//!
//! The server itself is stateless: every `call_tool` request runs the full
//! interceptor chain in [`ToolRegistry::execute`] (error-handling →
//! auth-context → tool-body, spec.md §4.9) in isolation. For the stdio
//! transport there is no bearer header to extract, so no auth-context scope
//! is installed here — `ToolRegistry::execute` reads `None` from
//! `tgmcp_core::auth::get_request_token` and falls back to the anonymous
//! default session (spec.md §4.2). The HTTP transport installs that scope
//! itself, in [`crate::http`], before delegating into the same registry.
use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use tgmcp_tools::{ToolCall, ToolRegistry};
use uuid::Uuid;

use crate::bridge::{output_to_call_result, schema_to_mcp_tool};

/// Wraps a [`ToolRegistry`] and speaks the MCP protocol over whatever
/// transport `rmcp::ServiceExt::serve` is given (stdio for this crate).
#[derive(Clone)]
pub struct TgmcpMcpServer {
    registry: Arc<ToolRegistry>,
}

impl TgmcpMcpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for TgmcpMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let registry = self.registry.clone();
        async move {
            let tools = registry.schemas().into_iter().map(schema_to_mcp_tool).collect();
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(|m| serde_json::Value::Object(m.into_iter().collect()))
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let call = ToolCall {
            id: Uuid::new_v4().to_string(),
            name: request.name.to_string(),
            args,
        };

        let output = self.registry.execute(call).await;
        Ok(output_to_call_result(output))
    }
}
