// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Contact resolver (spec.md §4.6), grounded on
//! `original_source/src/tools/contacts.py`.
use std::collections::HashSet;
use std::sync::Arc;

use crate::entity::Entity;
use crate::error::CoreError;
use crate::platform::PlatformClient;

/// `search_contacts(query, limit)`: comma-split `query`, fan out one
/// contact-search call per term, merge-dedupe the results by entity id, and
/// truncate to `limit`.
///
/// `original_source/src/tools/contacts.py`'s `search_contacts_telegram`
/// returns an error record instead of an empty list when nothing matches
/// ("for consistency" — every other no-match path in that file does the
/// same); a genuinely empty match set is therefore `CoreError::NotFound`,
/// never `Ok(vec![])`.
pub async fn find_chats(client: Arc<dyn PlatformClient>, query: &str, limit: usize) -> Result<Vec<Entity>, CoreError> {
    let terms: Vec<String> = query
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return Err(CoreError::Validation("query must not be empty".into()));
    }

    let mut tasks = Vec::with_capacity(terms.len());
    for term in terms {
        let client = client.clone();
        tasks.push(tokio::spawn(async move { client.search_contacts(&term, limit).await }));
    }

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for task in tasks {
        let partial = task.await.map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))??;
        for entity in partial {
            if seen.insert(entity.id) {
                merged.push(entity);
            }
        }
    }
    merged.truncate(limit);
    if merged.is_empty() {
        return Err(CoreError::NotFound(format!("No contacts found matching query '{query}'")));
    }
    Ok(merged)
}

/// `get_chat_info(chat_id)`: resolve a chat id/username and return its
/// entity, or `NotFound` if the platform has no such entity.
pub async fn get_chat_info(client: &dyn PlatformClient, chat_id: &str) -> Result<Entity, CoreError> {
    client
        .resolve_entity(chat_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Could not find chat with ID '{chat_id}'")))
}
