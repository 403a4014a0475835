// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Heterogeneous platform entities, normalised into a tagged variant.
//!
//! The upstream platform represents users, basic groups and channels as
//! distinct wire types (and, for channels the caller has no access to,
//! `ChannelForbidden`). spec.md §9 directs that this "heterogeneous entity"
//! pattern become a tagged Rust enum rather than runtime class-name
//! sniffing; `ChannelForbidden` is folded into `Channel` per spec.md §3.
use serde::{Deserialize, Serialize};

/// `private | group | channel` chat-type filter accepted by `search_messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Channel,
}

impl std::str::FromStr for ChatType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ChatType::Private),
            "group" => Ok(ChatType::Group),
            "channel" => Ok(ChatType::Channel),
            other => anyhow::bail!("unknown chat_type {other:?} (expected private|group|channel)"),
        }
    }
}

/// A normalised platform entity: a user, a basic group, or a channel
/// (including channels the caller is forbidden from, per spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub kind: EntityKind,
    pub title: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Chat,
    Channel,
}

impl Entity {
    pub fn user(id: i64, first_name: Option<String>, last_name: Option<String>, username: Option<String>) -> Self {
        Self {
            id,
            kind: EntityKind::User,
            title: None,
            username,
            first_name,
            last_name,
        }
    }

    pub fn chat(id: i64, title: Option<String>) -> Self {
        Self {
            id,
            kind: EntityKind::Chat,
            title,
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn channel(id: i64, title: Option<String>, username: Option<String>) -> Self {
        Self {
            id,
            kind: EntityKind::Channel,
            title,
            username,
            first_name: None,
            last_name: None,
        }
    }

    /// Whether this entity's kind matches a `chat_type` filter value.
    pub fn matches_chat_type(&self, chat_type: ChatType) -> bool {
        matches!(
            (self.kind, chat_type),
            (EntityKind::User, ChatType::Private)
                | (EntityKind::Chat, ChatType::Group)
                | (EntityKind::Channel, ChatType::Channel)
        )
    }

    /// Canonical identifier used only for deep-link construction (spec.md §3):
    /// `@username` if known, else `-100<id>` for channels, else the bare id.
    pub fn canonical_identifier(&self) -> String {
        if let Some(username) = &self.username {
            format!("@{username}")
        } else if self.kind == EntityKind::Channel {
            format!("-100{}", self.id)
        } else {
            self.id.to_string()
        }
    }
}
