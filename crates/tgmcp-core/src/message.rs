// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Message domain value and its supporting types (spec.md §3).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Sender of a message: a resolved [`Entity`], or a bare id the platform
/// could not resolve (mirrors `original_source/src/utils/message_format.py`'s
/// `get_sender_info`, which falls back to `{id, error}` rather than failing
/// the whole message build).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    Resolved(Entity),
    Unresolved { id: i64, error: String },
}

/// Forward origin of a message. **[ADDED]** per SPEC_FULL.md §3: the
/// original distinguishes a resolvable source chat/user from a source that
/// hid its identity (`fwd_from.from_name` with no `from_id`), so this is an
/// enum rather than a plain [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForwardOrigin {
    Entity(Entity),
    Hidden { name: String },
}

/// Lightweight, serialisable stand-in for a message's media payload.
/// Never carries the raw media bytes or platform media object — LLM callers
/// only need to know media is present and, if cheaply available, its shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPlaceholder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approx_size_bytes: Option<i64>,
}

/// A fully-built message result, ready to be returned from a tool.
///
/// Invariant (spec.md §3): `text` is `None` iff the message had no textual
/// content and no caption; `media` is `Some` iff the message carried media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub chat: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub sender: Option<Sender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_msg_id: Option<i64>,
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_from: Option<ForwardOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPlaceholder>,
}

/// One entry of a `read_messages` result: either the built message, or a
/// placeholder recording that the id could not be read (spec.md §8 scenario
/// 4: a missing id does not fail the whole batch, it becomes an entry with
/// `error` set).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadEntry {
    Found(Message),
    Missing { id: i64, error: String },
}

/// One of the fourteen media kinds `original_source/src/tools/search.py`'s
/// `_has_any_media` recognises as giving a message "content" even when it has
/// no text (spec.md §4.3's content filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
    Audio,
    Voice,
    Video,
    WebPage,
    Geo,
    Contact,
    Poll,
    Dice,
    Venue,
    Game,
    Invoice,
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[test]
    fn sender_unresolved_round_trips_through_json() {
        let s = Sender::Unresolved {
            id: 7,
            error: "Sender not found".into(),
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["id"], 7);
        assert_eq!(v["error"], "Sender not found");
    }

    #[test]
    fn message_without_text_or_media_serialises_without_those_keys() {
        let m = Message {
            id: 1,
            date: Utc::now(),
            chat: Entity::chat(1, None),
            text: None,
            sender: None,
            reply_to_msg_id: None,
            link: Some("https://t.me/c/1/1".into()),
            forwarded_from: None,
            media: None,
        };
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("text").is_none());
        assert!(v.get("media").is_none());
        assert!(v.get("reply_to_msg_id").is_none());
    }
}
