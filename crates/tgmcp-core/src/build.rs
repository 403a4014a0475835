// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Assembles a [`Message`] from a platform [`RawMessage`], resolving its
//! sender and forward origin against the same session.
//!
//! Grounded on `original_source/src/utils/message_format.py`'s
//! `build_message_result` / `get_sender_info`.
use crate::entity::Entity;
use crate::links;
use crate::message::{ForwardOrigin, MediaPlaceholder, Message, Sender};
use crate::platform::{PlatformClient, RawForwardOrigin, RawMessage};

/// A [`RawMessage`] has "content" iff it carries non-empty text or any
/// recognised media kind (spec.md §4.3's content filter). Every
/// [`crate::platform::RawMedia`] already represents one of the fourteen
/// recognised kinds, so presence alone is sufficient.
pub fn has_content(raw: &RawMessage) -> bool {
    raw.text.as_deref().is_some_and(|t| !t.is_empty()) || raw.media.is_some()
}

pub async fn build_message(client: &dyn PlatformClient, raw: RawMessage, chat: &Entity) -> Message {
    let link = links::generate_links(Some(chat), &[raw.id], None, None, None)
        .message_links
        .into_iter()
        .next();
    build_message_with_link(client, raw, chat, link).await
}

pub async fn build_message_with_link(
    client: &dyn PlatformClient,
    raw: RawMessage,
    chat: &Entity,
    link: Option<String>,
) -> Message {
    let sender = match raw.sender_id {
        Some(id) => Some(resolve_sender(client, id).await),
        None => None,
    };

    let forwarded_from = match raw.forwarded_from {
        Some(RawForwardOrigin::Hidden { name }) => Some(ForwardOrigin::Hidden { name }),
        Some(RawForwardOrigin::EntityId(id)) => client
            .resolve_entity(&id.to_string())
            .await
            .ok()
            .flatten()
            .map(ForwardOrigin::Entity),
        None => None,
    };

    let media = raw.media.map(|m| MediaPlaceholder {
        mime_type: m.mime_type,
        filename: m.filename,
        approx_size_bytes: m.approx_size_bytes,
    });

    Message {
        id: raw.id,
        date: raw.date,
        chat: chat.clone(),
        text: raw.text,
        sender,
        reply_to_msg_id: raw.reply_to_msg_id,
        link,
        forwarded_from,
        media,
    }
}

async fn resolve_sender(client: &dyn PlatformClient, id: i64) -> Sender {
    match client.resolve_entity(&id.to_string()).await {
        Ok(Some(entity)) => Sender::Resolved(entity),
        Ok(None) => Sender::Unresolved {
            id,
            error: "Sender not found".to_string(),
        },
        Err(_) => Sender::Unresolved {
            id,
            error: "Failed to retrieve sender".to_string(),
        },
    }
}
