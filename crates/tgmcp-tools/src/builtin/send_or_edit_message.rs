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
    message: String,
    reply_to_msg_id: Option<i64>,
    parse_mode: Option<String>,
    message_id: Option<i64>,
}

/// `send_or_edit_message`: sends a new message, or edits an existing one
/// when `message_id` is given (spec.md §4.5).
pub struct SendOrEditMessageTool;

#[async_trait]
impl Tool for SendOrEditMessageTool {
    fn name(&self) -> &str {
        "send_or_edit_message"
    }

    fn description(&self) -> &str {
        "Send a message to a chat, or edit a previously sent one. Pass \
         `message_id` to edit that message instead of sending a new one."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "chat_id": {"type": "string"},
                "message": {"type": "string"},
                "reply_to_msg_id": {"type": "integer"},
                "parse_mode": {"type": "string", "enum": ["HTML", "Markdown", "MarkdownV2"]},
                "message_id": {"type": "integer", "description": "Edit this message instead of sending a new one"}
            },
            "required": ["chat_id", "message"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;

        let result = tgmcp_core::sender::send_or_edit(
            client.as_ref(),
            &args.chat_id,
            &args.message,
            args.reply_to_msg_id,
            args.parse_mode.as_deref(),
            args.message_id,
        )
        .await?;

        serde_json::to_value(result).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgmcp_core::platform::MockPlatformClient;
    use tgmcp_core::Entity;

    #[tokio::test]
    async fn sends_a_new_message() {
        let chat = Entity::chat(1, Some("Room".into()));
        let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new().with_entity(chat));
        let out = SendOrEditMessageTool
            .call(client, json!({"chat_id": "1", "message": "hi"}))
            .await
            .unwrap();
        assert_eq!(out["status"], "sent");
        assert_eq!(out["text"], "hi");
    }

    #[tokio::test]
    async fn unknown_chat_is_not_found() {
        let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new());
        let err = SendOrEditMessageTool
            .call(client, json!({"chat_id": "@missing", "message": "hi"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
