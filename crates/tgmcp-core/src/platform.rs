// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! [`PlatformClient`]: the capability spec.md §1 names as "the low-level
//! messaging-platform client library", treated as an external collaborator
//! and specified here only as an interface (spec.md §2's component table).
//!
//! Everything in this crate that touches the network goes through this
//! trait so the Session Manager, Search Orchestrator and tool
//! implementations can be tested against [`MockPlatformClient`] instead of a
//! live account (SPEC_FULL.md §6 "Test tooling").
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entity::Entity;
use crate::error::CoreError;

/// A message as returned by the platform, before sender/forward resolution.
///
/// `original_source/src/utils/message_format.py`'s `build_message_result`
/// resolves `sender_id` to a full entity and `forwarded_from` to an entity
/// or hidden-name descriptor as a *second* step after the platform call
/// returns; `RawMessage` models the platform's half of that split.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub text: Option<String>,
    pub sender_id: Option<i64>,
    pub reply_to_msg_id: Option<i64>,
    pub edit_date: Option<DateTime<Utc>>,
    pub media: Option<RawMedia>,
    pub forwarded_from: Option<RawForwardOrigin>,
}

#[derive(Debug, Clone)]
pub struct RawMedia {
    pub kind: crate::message::MediaKind,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub approx_size_bytes: Option<i64>,
}

#[derive(Debug, Clone)]
pub enum RawForwardOrigin {
    EntityId(i64),
    Hidden { name: String },
}

/// Authenticated connection to the messaging platform, bound to exactly one
/// bearer token (one [`PlatformClient`] per `tgmcp_core::session::Session`).
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Establish the underlying connection. Bounded by the Session Manager's
    /// `connect_timeout` (spec.md §4.1).
    async fn connect(&self) -> Result<(), CoreError>;

    /// Whether the connection is authenticated and ready for calls.
    async fn is_authorized(&self) -> Result<bool, CoreError>;

    /// Tear down the underlying connection. Called by the Session Manager's
    /// cleaner and shutdown path; always treated as best-effort.
    async fn disconnect(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Resolve a chat id, `@username`, or `-100…`-prefixed channel id to an
    /// entity. `None` means the platform has no such entity.
    async fn resolve_entity(&self, id_or_username: &str) -> Result<Option<Entity>, CoreError>;

    /// One page of a per-chat message iteration, newest-first, starting
    /// strictly before `offset_id` (`0` means "from the newest message").
    async fn iter_messages(
        &self,
        entity: &Entity,
        query: &str,
        offset_id: i64,
        limit: usize,
    ) -> Result<Vec<RawMessage>, CoreError>;

    /// Fetch messages by id, in the same order as `ids`. A `None` slot means
    /// the platform has no such message (deleted, or caller lacks access).
    async fn get_messages(
        &self,
        entity: &Entity,
        ids: &[i64],
    ) -> Result<Vec<Option<RawMessage>>, CoreError>;

    async fn send_message(
        &self,
        entity: &Entity,
        text: &str,
        reply_to: Option<i64>,
        parse_mode: Option<&str>,
    ) -> Result<RawMessage, CoreError>;

    async fn edit_message(
        &self,
        entity: &Entity,
        message_id: i64,
        new_text: &str,
        parse_mode: Option<&str>,
    ) -> Result<RawMessage, CoreError>;

    /// One page of a global (cross-chat) search, newest-first. Each hit is
    /// paired with its resolved owning chat entity.
    async fn global_search(
        &self,
        query: &str,
        min_date: Option<DateTime<Utc>>,
        max_date: Option<DateTime<Utc>>,
        offset_id: i64,
        limit: usize,
    ) -> Result<Vec<(Entity, RawMessage)>, CoreError>;

    /// Total message count in a chat (used for `include_total_count`).
    async fn get_search_counters(&self, entity: &Entity) -> Result<u64, CoreError>;

    /// Contact search by name/username/phone (single term; the orchestrator
    /// in `tgmcp_core::contacts` handles comma-splitting and fan-out).
    async fn search_contacts(&self, query: &str, limit: usize) -> Result<Vec<Entity>, CoreError>;

    /// Invoke an arbitrary platform RPC method by its already-resolved name
    /// (e.g. `messages.GetHistoryRequest`) with named parameters, returning
    /// the result serialised to JSON (spec.md §4.8).
    async fn invoke_raw(
        &self,
        method_full_name: &str,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError>;
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockPlatformClient;

#[cfg(any(test, feature = "test-util"))]
mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory [`PlatformClient`] double for tests (SPEC_FULL.md §6).
    ///
    /// Holds a fixed set of entities and, per chat id, a message list in
    /// newest-first order — the ordering `original_source`'s Telethon-backed
    /// client presumes throughout `src/tools/search.py`.
    #[derive(Default)]
    pub struct MockPlatformClient {
        entities: HashMap<String, Entity>,
        messages: Mutex<HashMap<i64, Vec<RawMessage>>>,
        authorized: bool,
        fail_connect: Option<String>,
        next_id: Mutex<i64>,
    }

    impl MockPlatformClient {
        pub fn new() -> Self {
            Self {
                authorized: true,
                next_id: Mutex::new(1_000_000),
                ..Default::default()
            }
        }

        pub fn unauthorized() -> Self {
            Self {
                authorized: false,
                ..Self::new()
            }
        }

        pub fn failing_connect(reason: impl Into<String>) -> Self {
            Self {
                fail_connect: Some(reason.into()),
                ..Self::new()
            }
        }

        /// Register an entity, reachable by id, `@username` and bare numeric
        /// string (whichever the caller later passes to `resolve_entity`).
        pub fn with_entity(mut self, entity: Entity) -> Self {
            self.entities.insert(entity.id.to_string(), entity.clone());
            if let Some(username) = &entity.username {
                self.entities.insert(format!("@{username}"), entity.clone());
            }
            self
        }

        /// Seed a chat's message list. Messages should be given newest-first,
        /// matching platform iteration order.
        pub fn with_messages(self, chat_id: i64, messages: Vec<RawMessage>) -> Self {
            self.messages.lock().unwrap().insert(chat_id, messages);
            self
        }

        fn lookup(&self, id_or_username: &str) -> Option<Entity> {
            self.entities.get(id_or_username).cloned()
        }
    }

    fn text_matches(text: &Option<String>, query: &str) -> bool {
        query.is_empty()
            || text
                .as_deref()
                .map(|t| t.to_lowercase().contains(&query.to_lowercase()))
                .unwrap_or(false)
    }

    #[async_trait]
    impl PlatformClient for MockPlatformClient {
        async fn connect(&self) -> Result<(), CoreError> {
            match &self.fail_connect {
                Some(reason) => Err(CoreError::Unavailable(reason.clone())),
                None => Ok(()),
            }
        }

        async fn is_authorized(&self) -> Result<bool, CoreError> {
            Ok(self.authorized)
        }

        async fn resolve_entity(&self, id_or_username: &str) -> Result<Option<Entity>, CoreError> {
            Ok(self.lookup(id_or_username))
        }

        async fn iter_messages(
            &self,
            entity: &Entity,
            query: &str,
            offset_id: i64,
            limit: usize,
        ) -> Result<Vec<RawMessage>, CoreError> {
            let messages = self.messages.lock().unwrap();
            let all = messages.get(&entity.id).cloned().unwrap_or_default();
            let page: Vec<RawMessage> = all
                .into_iter()
                .filter(|m| offset_id == 0 || m.id < offset_id)
                .filter(|m| text_matches(&m.text, query))
                .take(limit)
                .collect();
            Ok(page)
        }

        async fn get_messages(
            &self,
            entity: &Entity,
            ids: &[i64],
        ) -> Result<Vec<Option<RawMessage>>, CoreError> {
            let messages = self.messages.lock().unwrap();
            let all = messages.get(&entity.id).cloned().unwrap_or_default();
            Ok(ids
                .iter()
                .map(|id| all.iter().find(|m| m.id == *id).cloned())
                .collect())
        }

        async fn send_message(
            &self,
            entity: &Entity,
            text: &str,
            reply_to: Option<i64>,
            _parse_mode: Option<&str>,
        ) -> Result<RawMessage, CoreError> {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            let msg = RawMessage {
                id,
                date: Utc::now(),
                text: Some(text.to_string()),
                sender_id: None,
                reply_to_msg_id: reply_to,
                edit_date: None,
                media: None,
                forwarded_from: None,
            };
            self.messages
                .lock()
                .unwrap()
                .entry(entity.id)
                .or_default()
                .insert(0, msg.clone());
            Ok(msg)
        }

        async fn edit_message(
            &self,
            entity: &Entity,
            message_id: i64,
            new_text: &str,
            _parse_mode: Option<&str>,
        ) -> Result<RawMessage, CoreError> {
            let mut messages = self.messages.lock().unwrap();
            let chat = messages.entry(entity.id).or_default();
            let msg = chat
                .iter_mut()
                .find(|m| m.id == message_id)
                .ok_or_else(|| CoreError::NotFound(format!("message {message_id} not found")))?;
            msg.text = Some(new_text.to_string());
            msg.edit_date = Some(Utc::now());
            Ok(msg.clone())
        }

        async fn global_search(
            &self,
            query: &str,
            min_date: Option<DateTime<Utc>>,
            max_date: Option<DateTime<Utc>>,
            offset_id: i64,
            limit: usize,
        ) -> Result<Vec<(Entity, RawMessage)>, CoreError> {
            let messages = self.messages.lock().unwrap();
            let mut hits: Vec<(Entity, RawMessage)> = Vec::new();
            for (chat_id, chat_messages) in messages.iter() {
                let entity = match self.entities.values().find(|e| e.id == *chat_id) {
                    Some(e) => e.clone(),
                    None => continue,
                };
                for m in chat_messages {
                    if offset_id != 0 && m.id >= offset_id {
                        continue;
                    }
                    if let Some(min) = min_date {
                        if m.date < min {
                            continue;
                        }
                    }
                    if let Some(max) = max_date {
                        if m.date > max {
                            continue;
                        }
                    }
                    if text_matches(&m.text, query) {
                        hits.push((entity.clone(), m.clone()));
                    }
                }
            }
            hits.sort_by(|a, b| b.1.id.cmp(&a.1.id));
            hits.truncate(limit);
            Ok(hits)
        }

        async fn get_search_counters(&self, entity: &Entity) -> Result<u64, CoreError> {
            let messages = self.messages.lock().unwrap();
            Ok(messages.get(&entity.id).map(|m| m.len()).unwrap_or(0) as u64)
        }

        async fn search_contacts(&self, query: &str, limit: usize) -> Result<Vec<Entity>, CoreError> {
            let q = query.to_lowercase();
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for entity in self.entities.values() {
                if !seen.insert(entity.id) {
                    continue;
                }
                let haystack = [
                    entity.username.as_deref(),
                    entity.first_name.as_deref(),
                    entity.last_name.as_deref(),
                    entity.title.as_deref(),
                ];
                if haystack
                    .iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains(&q))
                {
                    out.push(entity.clone());
                }
                if out.len() >= limit {
                    break;
                }
            }
            Ok(out)
        }

        async fn invoke_raw(
            &self,
            method_full_name: &str,
            params: serde_json::Map<String, serde_json::Value>,
        ) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::json!({
                "method": method_full_name,
                "echo": params,
            }))
        }
    }
}
