// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::env;
use std::time::Duration;

use tracing::debug;

use crate::{SessionConfig, Settings, Transport};

/// Load configuration from the process environment, per spec.md §6's table.
///
/// CLI flags take precedence over environment variables; callers (the
/// binary's `cli.rs`) apply flag overrides on top of the value this returns.
pub fn load() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(v) = env::var("MCP_TRANSPORT") {
        debug!(value = %v, "MCP_TRANSPORT set");
        settings.transport = v.parse()?;
    }
    if let Ok(v) = env::var("MCP_HOST") {
        settings.host = v;
    }
    if let Ok(v) = env::var("MCP_PORT") {
        settings.port = v
            .parse()
            .map_err(|_| anyhow::anyhow!("MCP_PORT must be a valid u16, got {v:?}"))?;
    }
    if let Ok(v) = env::var("API_ID") {
        settings.api_id = Some(
            v.parse()
                .map_err(|_| anyhow::anyhow!("API_ID must be a valid integer, got {v:?}"))?,
        );
    }
    if let Ok(v) = env::var("API_HASH") {
        settings.api_hash = Some(v);
    }
    if let Ok(v) = env::var("PHONE_NUMBER") {
        settings.phone_number = Some(v);
    }
    if let Ok(v) = env::var("SESSION_NAME") {
        settings.session_name = v;
    }

    settings.session = SessionConfig {
        idle_ttl: duration_env("SESSION_IDLE_TTL_SECS", settings.session.idle_ttl)?,
        cleanup_interval: duration_env(
            "SESSION_CLEANUP_INTERVAL_SECS",
            settings.session.cleanup_interval,
        )?,
        connect_timeout: duration_env(
            "SESSION_CONNECT_TIMEOUT_SECS",
            settings.session.connect_timeout,
        )?,
    };

    Ok(settings)
}

fn duration_env(name: &str, default: Duration) -> anyhow::Result<Duration> {
    match env::var(name) {
        Ok(v) => {
            let secs: u64 = v
                .parse()
                .map_err(|_| anyhow::anyhow!("{name} must be a non-negative integer, got {v:?}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
