// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! End-to-end tests wiring the session manager, tool registry and HTTP
//! transport together against [`MockPlatformClient`], the way a real
//! deployment wires `tgmcp-platform-teloxide` in (spec.md §8's scenarios).
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use tgmcp_core::platform::MockPlatformClient;
use tgmcp_core::session::PlatformClientFactory;
use tgmcp_core::{CoreError, Entity, PlatformClient, RawMessage, SessionManager};
use tgmcp_tools::{
    GenerateLinksTool, GetContactDetailsTool, ReadMessagesTool, SearchContactsTool, SearchMessagesTool,
    SendOrEditMessageTool, ToolCall, ToolRegistry,
};

/// Hands out one fixed [`MockPlatformClient`] regardless of bearer token,
/// mirroring `tgmcp-platform-teloxide`'s one-client-per-token contract
/// closely enough for tests that don't care about per-token isolation.
struct FixedFactory(Arc<dyn PlatformClient>);

#[async_trait]
impl PlatformClientFactory for FixedFactory {
    async fn connect(&self, _token: &str) -> Result<Arc<dyn PlatformClient>, CoreError> {
        Ok(self.0.clone())
    }
}

/// One factory per token, so quarantine/eviction tests can tell sessions
/// apart by which token produced them.
struct PerTokenFactory;

#[async_trait]
impl PlatformClientFactory for PerTokenFactory {
    async fn connect(&self, token: &str) -> Result<Arc<dyn PlatformClient>, CoreError> {
        if token == "bad-token" {
            return Err(CoreError::Unauthorized("invalid credentials".into()));
        }
        let ann = Entity::user(1, Some("Ann".into()), None, Some("a".into()));
        Ok(Arc::new(MockPlatformClient::new().with_entity(ann)))
    }
}

fn raw(id: i64, text: &str) -> RawMessage {
    RawMessage {
        id,
        date: chrono::Utc::now(),
        text: Some(text.to_string()),
        sender_id: None,
        reply_to_msg_id: None,
        edit_date: None,
        media: None,
        forwarded_from: None,
    }
}

fn registry_with_all_tools(sessions: Arc<SessionManager>, auth_required: bool) -> ToolRegistry {
    let mut registry = ToolRegistry::new(sessions, auth_required);
    registry.register(SearchMessagesTool);
    registry.register(SendOrEditMessageTool);
    registry.register(ReadMessagesTool);
    registry.register(GenerateLinksTool);
    registry.register(SearchContactsTool);
    registry.register(GetContactDetailsTool);
    registry
}

#[tokio::test]
async fn search_messages_round_trips_through_the_full_registry() {
    let chat = Entity::channel(1, None, Some("news".into()));
    let client: Arc<dyn PlatformClient> = Arc::new(
        MockPlatformClient::new()
            .with_entity(chat)
            .with_messages(1, vec![raw(2, "second"), raw(1, "first hello")]),
    );
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(client)),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, false);

    let out = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "search_messages".into(),
            args: json!({"query": "hello", "chat_id": "@news"}),
        })
        .await;

    assert!(!out.is_error, "unexpected error: {:?}", out.value);
    assert_eq!(out.value["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn send_then_read_messages_sees_the_sent_message() {
    let chat = Entity::channel(5, None, Some("room".into()));
    let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new().with_entity(chat));
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(client)),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, false);

    let send = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "send_or_edit_message".into(),
            args: json!({"chat_id": "@room", "message": "hi there"}),
        })
        .await;
    assert!(!send.is_error, "send failed: {:?}", send.value);
    let sent_id = send.value["message_id"].as_i64().expect("sent result carries message_id");

    let read = registry
        .execute(ToolCall {
            id: "2".into(),
            name: "read_messages".into(),
            args: json!({"chat_id": "@room", "message_ids": [sent_id]}),
        })
        .await;
    assert!(!read.is_error, "read failed: {:?}", read.value);
    let entries = read.value.as_array().unwrap();
    assert_eq!(entries[0]["text"], "hi there");
}

#[tokio::test]
async fn unknown_tool_name_is_a_not_found_error_record() {
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(Arc::new(MockPlatformClient::new()))),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, false);

    let out = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "delete_universe".into(),
            args: json!({}),
        })
        .await;

    assert!(out.is_error);
    assert_eq!(out.value["kind"], "not_found");
}

#[tokio::test]
async fn auth_required_without_a_bearer_token_fails_session_acquisition() {
    let sessions = Arc::new(SessionManager::new(
        Arc::new(PerTokenFactory),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, true);

    // No tgmcp_core::auth::with_auth_context scope installed — the request
    // carries no bearer, and auth is required.
    let out = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "search_messages".into(),
            args: json!({"query": "hello"}),
        })
        .await;

    assert!(out.is_error);
    assert_eq!(out.value["kind"], "unauthorized");
}

#[tokio::test]
async fn each_bearer_token_gets_an_independent_session() {
    let sessions = Arc::new(SessionManager::new(
        Arc::new(PerTokenFactory),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = Arc::new(registry_with_all_tools(sessions, true));

    let good = tgmcp_core::auth::with_auth_context(Some("good-token".to_string()), async {
        registry
            .execute(ToolCall {
                id: "1".into(),
                name: "search_contacts".into(),
                args: json!({"query": "a"}),
            })
            .await
    })
    .await;
    assert!(!good.is_error, "good token should acquire a session: {:?}", good.value);

    let bad = tgmcp_core::auth::with_auth_context(Some("bad-token".to_string()), async {
        registry
            .execute(ToolCall {
                id: "2".into(),
                name: "search_contacts".into(),
                args: json!({"query": "a"}),
            })
            .await
    })
    .await;
    assert!(bad.is_error);
    assert_eq!(bad.value["kind"], "unauthorized");
}

#[tokio::test]
async fn generate_links_tool_round_trips_a_public_channel() {
    let chat = Entity::channel(42, Some("Announcements".into()), Some("announce".into()));
    let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new().with_entity(chat));
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(client)),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, false);

    let out = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "generate_links".into(),
            args: json!({"chat_id": "@announce", "message_ids": [10, 11]}),
        })
        .await;

    assert!(!out.is_error, "unexpected error: {:?}", out.value);
    assert_eq!(out.value["public_chat_link"], "https://t.me/announce");
    let message_links = out.value["message_links"].as_array().unwrap();
    assert_eq!(message_links.len(), 2);
    assert!(message_links[0].as_str().unwrap().contains("t.me/announce"));
}

#[tokio::test]
async fn get_contact_details_resolves_a_known_user() {
    let user = Entity::user(7, Some("Ada".into()), Some("Lovelace".into()), Some("ada".into()));
    let client: Arc<dyn PlatformClient> = Arc::new(MockPlatformClient::new().with_entity(user));
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(client)),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = registry_with_all_tools(sessions, false);

    let out = registry
        .execute(ToolCall {
            id: "1".into(),
            name: "get_contact_details".into(),
            args: json!({"chat_id": "@ada"}),
        })
        .await;

    assert!(!out.is_error, "unexpected error: {:?}", out.value);
    assert_eq!(out.value["username"], "ada");
}

#[tokio::test]
async fn http_transport_serves_the_same_registry_end_to_end() {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    let chat = Entity::channel(9, None, Some("live".into()));
    let client: Arc<dyn PlatformClient> = Arc::new(
        MockPlatformClient::new()
            .with_entity(chat)
            .with_messages(9, vec![raw(1, "breaking news")]),
    );
    let sessions = Arc::new(SessionManager::new(
        Arc::new(FixedFactory(client)),
        tgmcp_config::SessionConfig::default(),
    ));
    let registry = Arc::new(registry_with_all_tools(sessions, true));
    let router = tgmcp_mcp::http::router(registry, true);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/call")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, "Bearer demo-token")
                .body(Body::from(
                    json!({"name": "search_messages", "arguments": {"query": "news", "chat_id": "@live"}}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let missing_auth = router
        .oneshot(
            Request::builder()
                .uri("/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing_auth.status(), StatusCode::UNAUTHORIZED);
}
