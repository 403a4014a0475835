// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `read_messages` (spec.md §4.4), grounded on
//! `original_source/src/tools/messages.py`.
use crate::build::build_message;
use crate::error::CoreError;
use crate::message::ReadEntry;
use crate::platform::PlatformClient;

const NOT_FOUND_ERROR: &str = "Message not found or inaccessible";

/// Fetches the given message ids from `chat_id`, in request order. An id the
/// platform has no record of (deleted, or out of the caller's reach) becomes
/// a [`ReadEntry::Missing`] entry rather than failing the whole batch
/// (spec.md §8 scenario 4).
pub async fn read_messages(
    client: &dyn PlatformClient,
    chat_id: &str,
    message_ids: &[i64],
) -> Result<Vec<ReadEntry>, CoreError> {
    if message_ids.is_empty() {
        return Err(CoreError::Validation("message_ids must not be empty".into()));
    }

    let entity = client
        .resolve_entity(chat_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Could not find chat with ID '{chat_id}'")))?;

    let raw = client.get_messages(&entity, message_ids).await?;
    let mut entries = Vec::with_capacity(raw.len());
    for (id, slot) in message_ids.iter().zip(raw) {
        entries.push(match slot {
            Some(msg) => ReadEntry::Found(build_message(client, msg, &entity).await),
            None => ReadEntry::Missing {
                id: *id,
                error: NOT_FOUND_ERROR.to_string(),
            },
        });
    }
    Ok(entries)
}
