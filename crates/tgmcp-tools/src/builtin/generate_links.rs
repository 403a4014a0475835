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
    chat_id: String,
    message_ids: Vec<i64>,
    thread_id: Option<i64>,
    comment_id: Option<i64>,
    media_timestamp: Option<i64>,
}

/// `generate_links`: builds public/private `t.me` deep links for a chat and
/// a set of message ids (spec.md §4.7).
pub struct GenerateLinksTool;

#[async_trait]
impl Tool for GenerateLinksTool {
    fn name(&self) -> &str {
        "generate_links"
    }

    fn description(&self) -> &str {
        "Generate shareable t.me links for a chat and specific messages in it."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "chat_id": {"type": "string"},
                "message_ids": {"type": "array", "items": {"type": "integer"}},
                "thread_id": {"type": "integer"},
                "comment_id": {"type": "integer"},
                "media_timestamp": {"type": "integer"}
            },
            "required": ["chat_id", "message_ids"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;
        let entity = client.resolve_entity(&args.chat_id).await?;
        let result = tgmcp_core::links::generate_links(
            entity.as_ref(),
            &args.message_ids,
            args.thread_id,
            args.comment_id,
            args.media_timestamp,
        );
        serde_json::to_value(result).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}
