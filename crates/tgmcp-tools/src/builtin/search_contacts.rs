// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use tgmcp_core::{CoreError, PlatformClient};

use crate::tool::Tool;

#[derive(Debug, Deserialize)]
struct Args {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

/// `search_contacts`: comma-split contact search, fanned out one call per
/// term and merge-deduped by entity id (spec.md §4.6).
pub struct SearchContactsTool;

#[async_trait]
impl Tool for SearchContactsTool {
    fn name(&self) -> &str {
        "search_contacts"
    }

    fn description(&self) -> &str {
        "Search contacts by name, username or phone number. `query` may \
         contain multiple comma-separated terms, merged and deduplicated."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer", "default": 20}
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;
        let entities = tgmcp_core::contacts::find_chats(client, &args.query, args.limit).await?;
        serde_json::to_value(entities).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}
