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
}

/// `get_contact_details`: resolves a chat id/username to its entity
/// (spec.md §4.6).
pub struct GetContactDetailsTool;

#[async_trait]
impl Tool for GetContactDetailsTool {
    fn name(&self) -> &str {
        "get_contact_details"
    }

    fn description(&self) -> &str {
        "Look up full details for a chat, user or channel by id or @username."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"chat_id": {"type": "string"}},
            "required": ["chat_id"],
            "additionalProperties": false
        })
    }

    async fn call(&self, client: Arc<dyn PlatformClient>, args: Value) -> Result<Value, CoreError> {
        let args: Args = serde_json::from_value(args).map_err(|e| CoreError::Validation(e.to_string()))?;
        let entity = tgmcp_core::contacts::get_chat_info(client.as_ref(), &args.chat_id).await?;
        serde_json::to_value(entity).map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgmcp_core::platform::MockPlatformClient;
    use tgmcp_core::Entity;

    #[tokio::test]
    async fn resolves_known_entity() {
        let chat = Entity::chat(1, Some("Room".into()));
        let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new().with_entity(chat));
        let out = GetContactDetailsTool.call(client, json!({"chat_id": "1"})).await.unwrap();
        assert_eq!(out["title"], "Room");
    }

    #[tokio::test]
    async fn unknown_chat_is_not_found() {
        let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new());
        let err = GetContactDetailsTool
            .call(client, json!({"chat_id": "@missing"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
