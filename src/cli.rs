// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Command-line surface for the `tgmcp` binary (spec.md §6, SPEC_FULL.md
//! §6's "[ADDED] Ambient configuration"). Grounded on `sven`'s `cli.rs`:
//! `clap`'s derive API with `env =` attributes so every flag doubles as an
//! environment variable, matching spec.md's config table.
use clap::Parser;

use tgmcp_config::Transport;

/// MCP server exposing Telegram search, messaging and contact-resolution
/// tools over a per-bearer-token session pool.
#[derive(Parser, Debug)]
#[command(name = "tgmcp", version, about)]
pub struct Cli {
    /// Transport to serve on: `stdio` (default, single local connection) or
    /// `http` (network mode, stateless per request).
    #[arg(long, env = "MCP_TRANSPORT", value_enum)]
    pub transport: Option<TransportArg>,

    /// Bind host for network mode.
    #[arg(long, env = "MCP_HOST")]
    pub host: Option<String>,

    /// Bind port for network mode.
    #[arg(long, env = "MCP_PORT")]
    pub port: Option<u16>,

    /// Numeric application id for the default (process) session.
    #[arg(long, env = "API_ID")]
    pub api_id: Option<i32>,

    /// Application secret matching `--api-id`.
    #[arg(long, env = "API_HASH")]
    pub api_hash: Option<String>,

    /// Phone number used only by the interactive credential-setup flow.
    #[arg(long, env = "PHONE_NUMBER")]
    pub phone_number: Option<String>,

    /// File basename for the default session's persistent state.
    #[arg(long, env = "SESSION_NAME")]
    pub session_name: Option<String>,

    /// Forces network mode bound to localhost with auth disabled.
    #[arg(long)]
    pub test_mode: bool,

    /// Raises log verbosity when `RUST_LOG` is unset (warn → info → debug → trace).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransportArg {
    Stdio,
    Http,
}

impl From<TransportArg> for Transport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Transport::Stdio,
            TransportArg::Http => Transport::Http,
        }
    }
}

/// Applies CLI flag overrides on top of environment-sourced `settings`
/// (flags take precedence, per SPEC_FULL.md §6).
pub fn apply_overrides(cli: &Cli, settings: &mut tgmcp_config::Settings) {
    if let Some(t) = cli.transport {
        settings.transport = t.into();
    }
    if let Some(host) = &cli.host {
        settings.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(api_id) = cli.api_id {
        settings.api_id = Some(api_id);
    }
    if let Some(api_hash) = &cli.api_hash {
        settings.api_hash = Some(api_hash.clone());
    }
    if let Some(phone) = &cli.phone_number {
        settings.phone_number = Some(phone.clone());
    }
    if let Some(name) = &cli.session_name {
        settings.session_name = name.clone();
    }
    if cli.test_mode {
        settings.transport = Transport::Http;
        settings.host = "127.0.0.1".to_string();
        settings.test_mode = true;
    }
}
