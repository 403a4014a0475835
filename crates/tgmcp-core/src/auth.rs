// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Request-scoped auth context (spec.md §4.2).
//!
//! Grounded on `sven-gateway`'s `http::auth::extract_bearer` for the header
//! parsing rule (case-insensitive `authorization` lookup, `Bearer ` prefix
//! stripping). Unlike `sven-gateway`'s `AuthState`, there is no pre-shared
//! secret to verify the token against here — the bearer token itself *is*
//! the session key handed to [`crate::session::SessionManager`], so
//! `sven-gateway`'s hashed-token comparison and per-IP rate limiting have no
//! counterpart and are not carried over (SPEC_FULL.md §4.2).
use tokio::task_local;

use crate::error::CoreError;

/// Reserved key used in single-connection stdio mode, where there is no
/// bearer header to extract (spec.md §4.2).
pub const DEFAULT_TOKEN: &str = "__stdio_default__";

task_local! {
    static REQUEST_TOKEN: Option<String>;
}

/// Reads the bearer token stored for the current logical request, if any.
///
/// Returns `None` both when [`with_auth_context`] installed `None` (no
/// header on this request) and when no scope was ever entered at all — the
/// stdio transport never installs one, since there is no bearer header to
/// extract, and relies on this falling through to the anonymous default
/// session rather than panicking.
pub fn get_request_token() -> Option<String> {
    REQUEST_TOKEN.try_with(|t| t.clone()).unwrap_or(None)
}

/// Runs `fut` with `token` installed as the current request's bearer token,
/// clearing it on exit (normal return, error, or cancellation — task-local
/// storage is scoped to the future's lifetime, so it cannot leak across
/// concurrently-running requests).
pub async fn with_auth_context<F, T>(token: Option<String>, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    REQUEST_TOKEN.scope(token, fut).await
}

/// Extracts a bearer token from request headers.
///
/// Header lookup is case-insensitive; the value must start with `Bearer `
/// (exactly one space) followed by the opaque token (spec.md §4.2, §6).
/// `headers` is a plain `(name, value)` iterator so this function has no
/// dependency on a specific HTTP crate's header map type — both the axum
/// (network mode) and stdio bridges adapt their own header representation
/// into this shape.
pub fn extract_bearer<'a, I>(headers: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers.into_iter().find_map(|(name, value)| {
        if name.eq_ignore_ascii_case("authorization") {
            value.strip_prefix("Bearer ").map(|tok| tok.to_string())
        } else {
            None
        }
    })
}

/// Resolves the effective session key for an acquisition: the caller's
/// bearer token if present, else [`DEFAULT_TOKEN`] for stdio/anonymous mode.
///
/// Returns [`CoreError::Unauthorized`] when `auth_required` is set and no
/// token is present — the network-mode "Missing Bearer token" failure
/// spec.md §4.2 describes, raised before the tool handler runs.
pub fn resolve_session_key(token: Option<&str>, auth_required: bool) -> Result<String, CoreError> {
    match token {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ if auth_required => Err(CoreError::Unauthorized("Missing Bearer token".into())),
        _ => Ok(DEFAULT_TOKEN.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_is_case_insensitive_on_header_name() {
        let headers = [("Authorization", "Bearer abc123")];
        assert_eq!(extract_bearer(headers), Some("abc123".to_string()));
        let headers = [("AUTHORIZATION", "Bearer abc123")];
        assert_eq!(extract_bearer(headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_bearer_requires_exact_prefix() {
        let headers = [("authorization", "Basic abc123")];
        assert_eq!(extract_bearer(headers), None);
    }

    #[test]
    fn extract_bearer_missing_header_returns_none() {
        let headers: [(&str, &str); 0] = [];
        assert_eq!(extract_bearer(headers), None);
    }

    #[test]
    fn resolve_session_key_uses_token_when_present() {
        assert_eq!(resolve_session_key(Some("abc"), true).unwrap(), "abc");
    }

    #[test]
    fn resolve_session_key_falls_back_to_default_when_auth_not_required() {
        assert_eq!(resolve_session_key(None, false).unwrap(), DEFAULT_TOKEN);
    }

    #[test]
    fn resolve_session_key_errors_when_auth_required_and_token_missing() {
        let err = resolve_session_key(None, true).unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }

    #[tokio::test]
    async fn with_auth_context_is_visible_inside_scope_only() {
        assert_eq!(get_request_token(), None, "no scope entered yet, not a panic");

        with_auth_context(Some("tok".to_string()), async {
            assert_eq!(get_request_token(), Some("tok".to_string()));
        })
        .await;

        assert_eq!(get_request_token(), None, "scope exited, falls back to None again");
    }

    #[tokio::test]
    async fn with_auth_context_does_not_leak_across_concurrent_scopes() {
        let a = with_auth_context(Some("a".to_string()), async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            get_request_token()
        });
        let b = with_auth_context(Some("b".to_string()), async { get_request_token() });
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a, Some("a".to_string()));
        assert_eq!(b, Some("b".to_string()));
    }
}
