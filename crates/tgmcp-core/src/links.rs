// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Deep-link generator (spec.md §4.7), grounded on
//! `original_source/src/tools/links.py`'s `generate_telegram_links`.
use serde::Serialize;

use crate::entity::Entity;

const LINK_NOTE: &str = "Private chat links only work for chat members. Public links work for anyone.";
const UNRESOLVED_NOTE: &str = "Cannot resolve chat entity. Check chat_id or username.";

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_chat_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_chat_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub message_links: Vec<String>,
    pub note: String,
}

/// Builds public/private deep links for `entity`, per spec.md §4.7's
/// templates. `entity` is `None` when the caller's chat id could not be
/// resolved — the original Python falls back to a `note`-only result rather
/// than erroring, which this mirrors.
pub fn generate_links(
    entity: Option<&Entity>,
    message_ids: &[i64],
    thread_id: Option<i64>,
    comment_id: Option<i64>,
    media_timestamp: Option<i64>,
) -> LinkResult {
    let Some(entity) = entity else {
        return LinkResult {
            public_chat_link: None,
            private_chat_link: None,
            message_links: Vec::new(),
            note: UNRESOLVED_NOTE.to_string(),
        };
    };

    let mut query_parts = Vec::new();
    if let Some(c) = comment_id {
        query_parts.push(format!("comment={c}"));
    }
    if let Some(t) = media_timestamp {
        query_parts.push(format!("t={t}"));
    }
    let query_string = if query_parts.is_empty() {
        String::new()
    } else {
        format!("?{}", query_parts.join("&"))
    };

    let message_link = |base: &str, id: &i64| match thread_id {
        Some(t) => format!("{base}/{t}/{id}{query_string}"),
        None => format!("{base}/{id}{query_string}"),
    };

    if let Some(username) = &entity.username {
        let base = format!("https://t.me/{username}");
        LinkResult {
            public_chat_link: Some(base.clone()),
            private_chat_link: None,
            message_links: message_ids.iter().map(|id| message_link(&base, id)).collect(),
            note: LINK_NOTE.to_string(),
        }
    } else {
        let base = format!("https://t.me/c/{}", entity.id);
        LinkResult {
            public_chat_link: None,
            private_chat_link: Some(base.clone()),
            message_links: message_ids.iter().map(|id| message_link(&base, id)).collect(),
            note: LINK_NOTE.to_string(),
        }
    }
}
