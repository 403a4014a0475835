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
}

/// `read_messages`: fetches specific message ids from a chat. Ids the
/// platform has no record of become `{id, error}` entries rather than
/// failing the whole call (spec.md §8 scenario 4).
pub struct ReadMessagesTool;

#[async_trait]
impl Tool for ReadMessagesTool {
    fn name(&self) -> &str {
        "read_messages"
    }

    fn description(&self) -> &str {
        "Read one or more specific messages from a chat by id."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "chat_id": {"type": "string"},
                "message_ids": {"type": "array", "items": {"type": "integer"}}
            },
            "required": ["chat_id", "message_ids"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;
        let entries = tgmcp_core::reader::read_messages(client.as_ref(), &args.chat_id, &args.message_ids).await?;
        serde_json::to_value(entries).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}
