// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Duration;

/// Selects which tool-calling transport binds the process to the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Single-connection local mode, framed over stdin/stdout. No auth headers.
    Stdio,
    /// HTTP-based transport. Stateless per request; bearer auth enforced
    /// unless `--test-mode` disabled it.
    Http,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Stdio
    }
}

impl std::str::FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => anyhow::bail!("unknown MCP_TRANSPORT value: {other:?} (expected stdio|http)"),
        }
    }
}

/// Tunables for the session manager's idle eviction and connect bounds.
///
/// Defaults match spec.md §4.1: 30 minute idle TTL, 60 second sweep, 30
/// second connect timeout.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub idle_ttl: Duration,
    pub cleanup_interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(1800),
            cleanup_interval: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Fully resolved process configuration, assembled from environment
/// variables (and, in the binary, CLI flags layered on top).
#[derive(Debug, Clone)]
pub struct Settings {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    /// `API_ID` — numeric application id issued by the platform.
    pub api_id: Option<i32>,
    /// `API_HASH` — matching application secret.
    pub api_hash: Option<String>,
    /// `PHONE_NUMBER` — used only by the interactive credential-setup flow.
    pub phone_number: Option<String>,
    /// `SESSION_NAME` — file basename for the default session's persistent state.
    pub session_name: String,
    /// Forces network mode bound to localhost with auth disabled.
    pub test_mode: bool,
    pub session: SessionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_id: None,
            api_hash: None,
            phone_number: None,
            session_name: "tgmcp".to_string(),
            test_mode: false,
            session: SessionConfig::default(),
        }
    }
}

impl Settings {
    /// Whether bearer-token auth should be enforced for the HTTP transport.
    ///
    /// `--test-mode` forces network mode to localhost with auth disabled, per
    /// spec.md §6.
    pub fn auth_required(&self) -> bool {
        self.transport == Transport::Http && !self.test_mode
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
