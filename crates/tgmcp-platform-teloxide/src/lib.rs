// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! [`tgmcp_core::PlatformClient`] backed by the Telegram Bot API via
//! `teloxide`, grounded on
//! `examples/unicity-astrid-astrid`'s `astralis-telegram`/`astrid-telegram`
//! crates (`Bot::new`, `Requester::send_message`/`get_chat` usage).
//!
//! **Capability gap.** The Bot API has no equivalent of MTProto's message
//! history, global search, or contact-search RPCs — those are the
//! account-level calls only a user session (not a bot token) can make. This
//! client implements everything the Bot API genuinely supports
//! (`connect`, `resolve_entity`, `send_message`, `edit_message`) and returns
//! [`CoreError::Unavailable`] with an explanatory message for the rest
//! (`iter_messages`, `global_search`, `get_search_counters`,
//! `search_contacts`, `invoke_raw`), except for `get_messages`, which serves
//! from a local cache of messages this client itself sent or edited — a
//! best-effort answer rather than a hard failure, since that much is within
//! reach without history access.
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode, Recipient};
use tgmcp_core::session::PlatformClientFactory;
use tgmcp_core::{CoreError, Entity, EntityKind, PlatformClient, RawMessage};

const UNAVAILABLE: &str =
    "This operation requires MTProto account-level access; the Bot API token backing this session cannot perform it";

pub struct TeloxideClient {
    bot: Bot,
    authorized: AtomicBool,
    sent: Mutex<HashMap<(i64, i64), RawMessage>>,
}

impl TeloxideClient {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
            authorized: AtomicBool::new(false),
            sent: Mutex::new(HashMap::new()),
        }
    }

    fn cache_insert(&self, chat_id: i64, message: RawMessage) {
        self.sent.lock().unwrap().insert((chat_id, message.id), message);
    }
}

fn parse_recipient(id_or_username: &str) -> Recipient {
    match id_or_username.strip_prefix('@') {
        Some(name) => Recipient::ChannelUsername(format!("@{name}")),
        None => match id_or_username.parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(id_or_username.to_string()),
        },
    }
}

fn parse_mode(parse_mode: Option<&str>) -> Result<Option<ParseMode>, CoreError> {
    match parse_mode {
        None => Ok(None),
        Some(mode) => ParseMode::from_str(mode)
            .map(Some)
            .map_err(|_| CoreError::Validation(format!("unknown parse_mode {mode:?}"))),
    }
}

fn chat_to_entity(chat: teloxide::types::Chat) -> Entity {
    let id = chat.id.0;
    let username = chat.username().map(str::to_string);
    let title = chat.title().map(str::to_string);
    if chat.is_private() {
        Entity {
            id,
            kind: EntityKind::User,
            title: None,
            username,
            first_name: chat.first_name().map(str::to_string),
            last_name: chat.last_name().map(str::to_string),
        }
    } else if chat.is_channel() {
        Entity::channel(id, title, username)
    } else {
        Entity::chat(id, title)
    }
}

fn message_to_raw(message: teloxide::types::Message) -> RawMessage {
    let sender_id = message.from().map(|u| u.id.0 as i64);
    let reply_to_msg_id = message.reply_to_message().map(|m| m.id.0 as i64);
    RawMessage {
        id: message.id.0 as i64,
        date: message.date,
        text: message.text().map(str::to_string),
        sender_id,
        reply_to_msg_id,
        edit_date: message.edit_date(),
        media: None,
        forwarded_from: None,
    }
}

fn map_teloxide_err(err: teloxide::RequestError) -> CoreError {
    CoreError::Unavailable(err.to_string())
}

#[async_trait]
impl PlatformClient for TeloxideClient {
    async fn connect(&self) -> Result<(), CoreError> {
        self.bot.get_me().await.map_err(map_teloxide_err)?;
        self.authorized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_authorized(&self) -> Result<bool, CoreError> {
        Ok(self.authorized.load(Ordering::SeqCst))
    }

    async fn disconnect(&self) -> Result<(), CoreError> {
        // The Bot API is stateless HTTP — there is no connection to tear down.
        self.authorized.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn resolve_entity(&self, id_or_username: &str) -> Result<Option<Entity>, CoreError> {
        match self.bot.get_chat(parse_recipient(id_or_username)).await {
            Ok(chat) => Ok(Some(chat_to_entity(chat))),
            Err(teloxide::RequestError::Api(_)) => Ok(None),
            Err(err) => Err(map_teloxide_err(err)),
        }
    }

    async fn iter_messages(
        &self,
        _entity: &Entity,
        _query: &str,
        _offset_id: i64,
        _limit: usize,
    ) -> Result<Vec<RawMessage>, CoreError> {
        Err(CoreError::Unavailable(format!("iter_messages: {UNAVAILABLE}")))
    }

    async fn get_messages(&self, entity: &Entity, ids: &[i64]) -> Result<Vec<Option<RawMessage>>, CoreError> {
        let cache = self.sent.lock().unwrap();
        Ok(ids.iter().map(|id| cache.get(&(entity.id, *id)).cloned()).collect())
    }

    async fn send_message(
        &self,
        entity: &Entity,
        text: &str,
        reply_to: Option<i64>,
        mode: Option<&str>,
    ) -> Result<RawMessage, CoreError> {
        let mut request = self.bot.send_message(Recipient::Id(ChatId(entity.id)), text);
        if let Some(reply_to) = reply_to {
            request = request.reply_to_message_id(MessageId(reply_to as i32));
        }
        if let Some(mode) = parse_mode(mode)? {
            request = request.parse_mode(mode);
        }
        let message = request.await.map_err(map_teloxide_err)?;
        let raw = message_to_raw(message);
        self.cache_insert(entity.id, raw.clone());
        Ok(raw)
    }

    async fn edit_message(
        &self,
        entity: &Entity,
        message_id: i64,
        new_text: &str,
        mode: Option<&str>,
    ) -> Result<RawMessage, CoreError> {
        let mut request =
            self.bot
                .edit_message_text(Recipient::Id(ChatId(entity.id)), MessageId(message_id as i32), new_text);
        if let Some(mode) = parse_mode(mode)? {
            request = request.parse_mode(mode);
        }
        let message = request.await.map_err(map_teloxide_err)?;
        let mut raw = message_to_raw(message);
        raw.edit_date.get_or_insert_with(Utc::now);
        self.cache_insert(entity.id, raw.clone());
        Ok(raw)
    }

    async fn global_search(
        &self,
        _query: &str,
        _min_date: Option<DateTime<Utc>>,
        _max_date: Option<DateTime<Utc>>,
        _offset_id: i64,
        _limit: usize,
    ) -> Result<Vec<(Entity, RawMessage)>, CoreError> {
        Err(CoreError::Unavailable(format!("global_search: {UNAVAILABLE}")))
    }

    async fn get_search_counters(&self, _entity: &Entity) -> Result<u64, CoreError> {
        Err(CoreError::Unavailable(format!("get_search_counters: {UNAVAILABLE}")))
    }

    async fn search_contacts(&self, _query: &str, _limit: usize) -> Result<Vec<Entity>, CoreError> {
        Err(CoreError::Unavailable(format!("search_contacts: {UNAVAILABLE}")))
    }

    async fn invoke_raw(
        &self,
        _method_full_name: &str,
        _params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        Err(CoreError::Unavailable(format!("invoke_raw: {UNAVAILABLE}")))
    }
}

/// Builds [`TeloxideClient`]s for [`tgmcp_core::session::SessionManager`]
/// (spec.md §4.1's `PlatformClientFactory` seam).
///
/// The Bot API has no separate "bearer token" layer of its own — a bot's
/// token *is* its credential — so the MCP caller's bearer token is used
/// directly as the bot token for every session keyed by a real token. The
/// one exception is stdio/anonymous mode, where the caller presents no
/// bearer at all and [`tgmcp_core::auth::DEFAULT_TOKEN`] is used as the
/// session key instead; there `default_bot_token` (sourced from the
/// process's own `API_HASH`/credential configuration, per spec.md §6)
/// supplies the bot token to connect with.
pub struct TeloxideClientFactory {
    default_bot_token: Option<String>,
}

impl TeloxideClientFactory {
    pub fn new(default_bot_token: Option<String>) -> Self {
        Self { default_bot_token }
    }
}

#[async_trait]
impl PlatformClientFactory for TeloxideClientFactory {
    async fn connect(&self, token: &str) -> Result<Arc<dyn PlatformClient>, CoreError> {
        let bot_token = if token == tgmcp_core::auth::DEFAULT_TOKEN {
            self.default_bot_token
                .clone()
                .ok_or_else(|| CoreError::Unauthorized("no default bot token configured".into()))?
        } else {
            token.to_string()
        };

        let client = TeloxideClient::new(&bot_token);
        client.connect().await?;
        Ok(Arc::new(client))
    }
}
