// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Search orchestrator (spec.md §4.3).
//!
//! Grounded on `original_source/src/tools/search.py`: `_append_dedup_until_limit`,
//! `_matches_chat_type`, `_has_any_media` (folded into
//! [`crate::build::has_content`]), `_execute_parallel_searches`,
//! `_search_chat_messages`, `_search_global_messages`.
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::build::{build_message, has_content};
use crate::entity::{ChatType, Entity};
use crate::error::CoreError;
use crate::message::Message;
use crate::platform::PlatformClient;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub chat_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
    pub min_date: Option<DateTime<Utc>>,
    pub max_date: Option<DateTime<Utc>>,
    pub chat_type: Option<ChatType>,
    pub auto_expand_batches: usize,
    pub include_total_count: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            chat_id: None,
            limit: 50,
            offset: 0,
            min_date: None,
            max_date: None,
            chat_type: None,
            auto_expand_batches: 2,
            include_total_count: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<Message>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// Splits `query` on commas, trims each term, and drops empty terms
/// (spec.md §4.3).
fn normalize_terms(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Runs a `search_messages` call end to end: validates, fans out per-term
/// tasks, merges/dedupes, applies filters, and paginates.
pub async fn search(client: Arc<dyn PlatformClient>, req: SearchRequest) -> Result<SearchResponse, CoreError> {
    let terms = normalize_terms(&req.query);

    if req.chat_id.is_none() && terms.is_empty() {
        return Err(CoreError::Validation(
            "Search query must not be empty for global search.".into(),
        ));
    }

    let target = req.offset + req.limit;

    let (merged, total_count) = if let Some(chat_id) = &req.chat_id {
        let entity = client
            .resolve_entity(chat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Could not find chat with ID '{chat_id}'")))?;

        let per_chat_terms = if terms.is_empty() { vec![String::new()] } else { terms };
        let mut tasks = Vec::with_capacity(per_chat_terms.len());
        for term in per_chat_terms {
            let client = client.clone();
            let entity = entity.clone();
            let chat_type = req.chat_type;
            let limit = req.limit;
            let auto_expand = req.auto_expand_batches;
            tasks.push(tokio::spawn(async move {
                search_chat_messages(client, entity, term, limit, chat_type, auto_expand).await
            }));
        }
        let merged = dedup_merge(tasks, target).await?;

        let total_count = if req.include_total_count {
            Some(client.get_search_counters(&entity).await?)
        } else {
            None
        };
        (merged, total_count)
    } else {
        let mut tasks = Vec::with_capacity(terms.len());
        for term in terms {
            let client = client.clone();
            let min_date = req.min_date;
            let max_date = req.max_date;
            let chat_type = req.chat_type;
            let limit = req.limit;
            let auto_expand = req.auto_expand_batches;
            tasks.push(tokio::spawn(async move {
                search_global_messages(client, term, limit, min_date, max_date, chat_type, auto_expand).await
            }));
        }
        let merged = dedup_merge(tasks, target).await?;
        (merged, None)
    };

    let window: Vec<Message> = merged.iter().skip(req.offset).take(req.limit).cloned().collect();
    // spec.md §4.3's literal formula. `merged` is capped at `offset + limit`
    // by `dedup_merge`'s early stop, so this is structurally almost always
    // false — preserved as specified rather than "fixed".
    let has_more = merged.len() > req.offset + window.len();

    Ok(SearchResponse {
        messages: window,
        has_more,
        total_count,
    })
}

/// Awaits every fan-out task in submission order and concatenates-then-dedupes
/// their outputs by `(chat.id, id)`, stopping once `target` items accumulate
/// (spec.md §4.3 "Merge and deduplicate"). Cancelling the calling future
/// drops this `JoinHandle` set, which aborts every still-running task.
async fn dedup_merge(
    tasks: Vec<tokio::task::JoinHandle<Result<Vec<Message>, CoreError>>>,
    target: usize,
) -> Result<Vec<Message>, CoreError> {
    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut collected = Vec::new();
    for task in tasks {
        let partial = task.await.map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))??;
        for message in partial {
            let key = (message.chat.id, message.id);
            if seen.insert(key) {
                collected.push(message);
                if collected.len() >= target {
                    return Ok(collected);
                }
            }
        }
    }
    Ok(collected)
}

fn max_batches(chat_type: Option<ChatType>, auto_expand_batches: usize) -> usize {
    if chat_type.is_some() {
        1 + auto_expand_batches
    } else {
        1
    }
}

async fn search_chat_messages(
    client: Arc<dyn PlatformClient>,
    entity: Entity,
    query: String,
    limit: usize,
    chat_type: Option<ChatType>,
    auto_expand_batches: usize,
) -> Result<Vec<Message>, CoreError> {
    let mut results = Vec::new();
    let mut cursor: i64 = 0;
    let max_batches = max_batches(chat_type, auto_expand_batches);

    for _ in 0..max_batches {
        if results.len() >= limit {
            break;
        }
        let batch = client
            .iter_messages(&entity, &query, cursor, limit * 2)
            .await?;
        if batch.is_empty() {
            break;
        }
        cursor = batch.last().map(|m| m.id).unwrap_or(cursor);

        for raw in batch {
            if !has_content(&raw) {
                continue;
            }
            if let Some(ct) = chat_type {
                if !entity.matches_chat_type(ct) {
                    continue;
                }
            }
            results.push(build_message(client.as_ref(), raw, &entity).await);
            if results.len() >= limit {
                break;
            }
        }
    }

    results.truncate(limit);
    Ok(results)
}

async fn search_global_messages(
    client: Arc<dyn PlatformClient>,
    query: String,
    limit: usize,
    min_date: Option<DateTime<Utc>>,
    max_date: Option<DateTime<Utc>>,
    chat_type: Option<ChatType>,
    auto_expand_batches: usize,
) -> Result<Vec<Message>, CoreError> {
    let mut results = Vec::new();
    let mut cursor: i64 = 0;
    let max_batches = max_batches(chat_type, auto_expand_batches);

    for _ in 0..max_batches {
        if results.len() >= limit {
            break;
        }
        let batch = client
            .global_search(&query, min_date, max_date, cursor, limit * 2)
            .await?;
        if batch.is_empty() {
            break;
        }
        cursor = batch.last().map(|(_, m)| m.id).unwrap_or(cursor);

        for (chat, raw) in batch {
            if !has_content(&raw) {
                continue;
            }
            if let Some(ct) = chat_type {
                if !chat.matches_chat_type(ct) {
                    continue;
                }
            }
            results.push(build_message(client.as_ref(), raw, &chat).await);
            if results.len() >= limit {
                break;
            }
        }
    }

    results.truncate(limit);
    Ok(results)
}
