// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use tgmcp_core::{CoreError, PlatformClient};

use crate::tool::{Tool, ToolCall};

#[derive(Debug, Deserialize)]
struct Args {
    query: String,
    chat_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
    chat_type: Option<tgmcp_core::ChatType>,
    min_date: Option<DateTime<Utc>>,
    max_date: Option<DateTime<Utc>>,
    #[serde(default = "default_auto_expand")]
    auto_expand_batches: usize,
    #[serde(default)]
    include_total_count: bool,
}

fn default_limit() -> usize {
    50
}

fn default_auto_expand() -> usize {
    2
}

/// `search_messages`: comma-split multi-term search, per-chat or global,
/// with dedup, pagination and an optional total count (spec.md §4.3).
pub struct SearchMessagesTool;

#[async_trait]
impl Tool for SearchMessagesTool {
    fn name(&self) -> &str {
        "search_messages"
    }

    fn description(&self) -> &str {
        "Search Telegram messages by text, either within one chat or across \
         every chat the session can see.\n\n\
         `query` may contain multiple comma-separated terms — each term is \
         searched independently and results are merged, deduplicated by \
         (chat, message id). Pass `chat_id` to scope the search to one chat; \
         omit it for a global search, which requires a non-empty query. Use \
         `chat_type` (private|group|channel) to additionally filter results \
         by the kind of chat they came from."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "chat_id": {"type": "string"},
                "limit": {"type": "integer", "default": 50},
                "offset": {"type": "integer", "default": 0},
                "chat_type": {"type": "string", "enum": ["private", "group", "channel"]},
                "min_date": {"type": "string", "format": "date-time"},
                "max_date": {"type": "string", "format": "date-time"},
                "auto_expand_batches": {"type": "integer", "default": 2},
                "include_total_count": {"type": "boolean", "default": false}
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;

        let request = tgmcp_core::SearchRequest {
            query: args.query,
            chat_id: args.chat_id,
            limit: args.limit,
            offset: args.offset,
            min_date: args.min_date,
            max_date: args.max_date,
            chat_type: args.chat_type,
            auto_expand_batches: args.auto_expand_batches,
            include_total_count: args.include_total_count,
        };

        let response = tgmcp_core::search::search(client, request).await?;
        serde_json::to_value(response).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}
