// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `tgmcp` process entry point: loads configuration, builds the session
//! manager and tool registry, and serves one of the two transports spec.md
//! §6 names. Grounded on `sven`'s `main.rs` for the overall
//! parse-flags → init-logging → load-config → run shape and its
//! `init_logging` function.
mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::Cli;
use tgmcp_config::Transport;
use tgmcp_core::SessionManager;
use tgmcp_platform_teloxide::TeloxideClientFactory;
use tgmcp_tools::{
    GenerateLinksTool, GetContactDetailsTool, InvokeMtprotoTool, ReadMessagesTool, SearchContactsTool,
    SearchMessagesTool, SendOrEditMessageTool, ToolRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = tgmcp_config::load().context("loading configuration")?;
    cli::apply_overrides(&cli, &mut settings);

    let factory = Arc::new(TeloxideClientFactory::new(settings.api_hash.clone()));
    let sessions = Arc::new(SessionManager::new(factory, settings.session));
    let cleaner = sessions.spawn_cleaner();

    let mut registry = ToolRegistry::new(sessions.clone(), settings.auth_required());
    registry.register(SearchMessagesTool);
    registry.register(SendOrEditMessageTool);
    registry.register(ReadMessagesTool);
    registry.register(GenerateLinksTool);
    registry.register(SearchContactsTool);
    registry.register(GetContactDetailsTool);
    registry.register(InvokeMtprotoTool);
    let registry = Arc::new(registry);

    info!(
        transport = ?settings.transport,
        auth_required = settings.auth_required(),
        tools = ?registry.names(),
        "tgmcp starting"
    );

    let serve = async {
        match settings.transport {
            Transport::Stdio => tgmcp_mcp::serve_stdio(registry.clone()).await,
            Transport::Http => {
                tgmcp_mcp::serve_http(registry.clone(), &settings.host, settings.port, settings.auth_required()).await
            }
        }
    };

    tokio::select! {
        result = serve => result.context("serving tool-calling transport")?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    // Graceful shutdown (spec.md §9): stop the cleaner, tear down every
    // session. Exit code 0 — this is a normal shutdown path, not a startup
    // failure.
    cleaner.abort();
    sessions.cleanup().await;
    Ok(())
}

/// Structured logging via `tracing` + `tracing-subscriber`, writing to
/// stderr so stdout stays clean for the stdio transport's line-delimited
/// framing (SPEC_FULL.md §6 "[ADDED] Logging").
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_err()
    {
        warn!("tracing subscriber already initialized; skipping");
    }
}
