// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use tgmcp_core::{CoreError, PlatformClient};

use crate::tool::Tool;

#[derive(Debug, Deserialize)]
struct Args {
    method_full_name: String,
    #[serde(default)]
    params: Map<String, Value>,
}

/// `invoke_mtproto`: escape hatch onto the raw platform RPC surface for
/// methods with no dedicated tool (spec.md §4.8).
pub struct InvokeMtprotoTool;

#[async_trait]
impl Tool for InvokeMtprotoTool {
    fn name(&self) -> &str {
        "invoke_mtproto"
    }

    fn description(&self) -> &str {
        "Invoke an arbitrary MTProto method by its fully-qualified name \
         (e.g. `messages.GetHistoryRequest`) with named parameters. Use this \
         only when no dedicated tool covers the operation you need."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "method_full_name": {"type": "string"},
                "params": {"type": "object"}
            },
            "required": ["method_full_name"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;
        let result = tgmcp_core::rpc::invoke(client.as_ref(), &args.method_full_name, args.params).await?;
        serde_json::to_value(result).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}
