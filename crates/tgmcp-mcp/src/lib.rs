// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The two tool-calling transports spec.md §6 specifies:
//!
//! - [`serve_stdio`]: single-connection local mode, line-delimited MCP over
//!   stdin/stdout (no auth headers).
//! - [`serve_http`]: network mode, an HTTP transport with bearer-token auth
//!   enforced unless `--test-mode` disabled it.
//!
//! Both transports dispatch into the same [`tgmcp_tools::ToolRegistry`], so
//! the interceptor chain (error-handling → auth-context → tool-body) and
//! the session pool behind it are shared regardless of which one is active.
pub mod bridge;
pub mod http;
pub mod server;

pub use server::TgmcpMcpServer;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tgmcp_tools::ToolRegistry;
use tracing::info;

/// Starts an MCP stdio server, serving `registry`'s tools on stdin/stdout.
/// Blocks until the client disconnects (stdin EOF) or the process is
/// terminated.
pub async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    let server = TgmcpMcpServer::new(registry);
    let running = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| anyhow::anyhow!("MCP stdio transport init error: {e}"))?;
    running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP stdio transport error: {e}"))?;
    Ok(())
}

/// Starts the HTTP tool-calling transport, binding `host:port` (spec.md §6
/// `MCP_HOST`/`MCP_PORT`). Blocks until the listener is closed.
pub async fn serve_http(registry: Arc<ToolRegistry>, host: &str, port: u16, auth_required: bool) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;
    let router = http::router(registry, auth_required);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, auth_required, "HTTP tool-calling transport listening");
    axum::serve(listener, router.into_make_service())
        .await
        .context("HTTP transport error")?;
    Ok(())
}
