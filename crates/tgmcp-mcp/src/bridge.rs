// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Type conversions between `tgmcp-tools`' protocol-agnostic types and
//! rmcp's MCP model types.
//!
//! Grounded on `sven-mcp`'s `bridge.rs` (`schema_to_mcp_tool`,
//! `output_to_call_result`), adapted for `tgmcp-tools`' single-JSON-value
//! [`ToolOutput`] (no text/image parts — every tool here returns a
//! structured JSON record, never media).
use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject};
use tgmcp_tools::{ToolOutput, ToolSchema};

/// Convert a [`ToolSchema`] into an rmcp [`Tool`](rmcp::model::Tool) descriptor.
pub fn schema_to_mcp_tool(schema: ToolSchema) -> rmcp::model::Tool {
    let input_schema: JsonObject = value_to_object(schema.parameters);
    rmcp::model::Tool::new(
        std::borrow::Cow::Owned(schema.name),
        std::borrow::Cow::Owned(schema.description),
        Arc::new(input_schema),
    )
}

/// MCP requires the input schema to be a JSON object; every tool here
/// already declares an `{"type": "object", ...}` schema, but a defensive
/// wrapper keeps this function total.
fn value_to_object(v: serde_json::Value) -> JsonObject {
    use serde_json::{Map, Value};
    match v {
        Value::Object(m) => m,
        other => {
            let mut m = Map::new();
            m.insert("type".to_string(), Value::String("object".to_string()));
            m.insert("value".to_string(), other);
            m
        }
    }
}

/// Convert a [`ToolOutput`] into an rmcp [`CallToolResult`], serialising its
/// JSON value as a single text content part.
pub fn output_to_call_result(output: ToolOutput) -> CallToolResult {
    let text = serde_json::to_string(&output.value).unwrap_or_else(|_| output.value.to_string());
    let content = vec![Content::text(text)];
    if output.is_error {
        CallToolResult {
            content,
            is_error: Some(true),
            structured_content: None,
            meta: None,
        }
    } else {
        CallToolResult::success(content)
    }
}
