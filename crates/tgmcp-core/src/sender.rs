// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `send_or_edit_message` (spec.md §4.5), grounded on
//! `original_source/src/tools/messages.py`.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::build::build_message_with_link;
use crate::entity::Entity;
use crate::error::CoreError;
use crate::links;
use crate::message::Sender;
use crate::platform::PlatformClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Edited,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub message_id: i64,
    pub date: DateTime<Utc>,
    pub chat: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub sender: Option<Sender>,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<DateTime<Utc>>,
}

/// Sends a new message into `chat_id`, or edits an existing one when
/// `message_id` is present — the single entry point `send_or_edit_message`
/// dispatches to (spec.md §6's parameter table: `message_id?` present ⇒ edit).
pub async fn send_or_edit(
    client: &dyn PlatformClient,
    chat_id: &str,
    text: &str,
    reply_to_msg_id: Option<i64>,
    parse_mode: Option<&str>,
    message_id: Option<i64>,
) -> Result<SendResult, CoreError> {
    let entity = client
        .resolve_entity(chat_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Could not find chat with ID '{chat_id}'")))?;

    match message_id {
        Some(id) => edit(client, &entity, id, text, parse_mode).await,
        None => send(client, &entity, text, reply_to_msg_id, parse_mode).await,
    }
}

async fn send(
    client: &dyn PlatformClient,
    entity: &Entity,
    text: &str,
    reply_to_msg_id: Option<i64>,
    parse_mode: Option<&str>,
) -> Result<SendResult, CoreError> {
    let raw = client.send_message(entity, text, reply_to_msg_id, parse_mode).await?;
    let link = links::generate_links(Some(entity), &[raw.id], None, None, None)
        .message_links
        .into_iter()
        .next();
    let built = build_message_with_link(client, raw, entity, link).await;
    Ok(SendResult {
        message_id: built.id,
        date: built.date,
        chat: built.chat,
        text: built.text,
        sender: built.sender,
        status: SendStatus::Sent,
        edit_date: None,
    })
}

async fn edit(
    client: &dyn PlatformClient,
    entity: &Entity,
    message_id: i64,
    new_text: &str,
    parse_mode: Option<&str>,
) -> Result<SendResult, CoreError> {
    let raw = client.edit_message(entity, message_id, new_text, parse_mode).await?;
    let edit_date = raw.edit_date;
    let link = links::generate_links(Some(entity), &[raw.id], None, None, None)
        .message_links
        .into_iter()
        .next();
    let built = build_message_with_link(client, raw, entity, link).await;
    Ok(SendResult {
        message_id: built.id,
        date: built.date,
        chat: built.chat,
        text: built.text,
        sender: built.sender,
        status: SendStatus::Edited,
        edit_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatformClient;

    #[tokio::test]
    async fn send_creates_a_new_message_with_sent_status() {
        let chat = Entity::chat(1, Some("Room".into()));
        let client = MockPlatformClient::new().with_entity(chat);
        let result = send_or_edit(&client, "1", "hello", None, None, None).await.unwrap();
        assert_eq!(result.status, SendStatus::Sent);
        assert_eq!(result.text.as_deref(), Some("hello"));
        assert!(result.edit_date.is_none());
    }

    #[tokio::test]
    async fn edit_updates_existing_message_with_edited_status() {
        let chat = Entity::chat(1, Some("Room".into()));
        let client = MockPlatformClient::new().with_entity(chat);
        let sent = send_or_edit(&client, "1", "hello", None, None, None).await.unwrap();
        let edited = send_or_edit(&client, "1", "goodbye", None, None, Some(sent.message_id))
            .await
            .unwrap();
        assert_eq!(edited.status, SendStatus::Edited);
        assert_eq!(edited.text.as_deref(), Some("goodbye"));
        assert!(edited.edit_date.is_some());
        assert_eq!(edited.message_id, sent.message_id);
    }

    #[tokio::test]
    async fn unknown_chat_is_not_found() {
        let client = MockPlatformClient::new();
        let err = send_or_edit(&client, "@missing", "hi", None, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn editing_unknown_message_is_not_found() {
        let chat = Entity::chat(1, Some("Room".into()));
        let client = MockPlatformClient::new().with_entity(chat);
        let err = send_or_edit(&client, "1", "x", None, None, Some(999)).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
