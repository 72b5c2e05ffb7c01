//! Daemon entry point for the CodeAlive MCP server.
//!
//! Resolves configuration from CLI flags and environment, builds the single
//! API client for the process, and serves the MCP protocol over the selected
//! transport. Logs go to stderr so stdio transport framing stays clean.

mod config;

use std::sync::Arc;

use codealive_client::{ClientConfig, CodeAliveClient};
use codealive_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServerConfig::from_args()?;
    init_tracing(config.debug);

    tracing::info!(
        transport = ?config.transport,
        base_url = %config.base_url,
        ssl_verification = config.verify_ssl,
        api_key = %config.api_key_hint(),
        "starting CodeAlive MCP server"
    );
    if !config.verify_ssl {
        tracing::warn!("SSL certificate validation is disabled");
    }

    let client = CodeAliveClient::new(
        ClientConfig::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_verify_ssl(config.verify_ssl),
    )?;
    let client = Arc::new(client);

    match config.transport {
        Transport::Stdio => serve_stdio(client).await?,
        Transport::Http => {
            serve_streamable_http(client, McpHttpServerConfig::new(config.http_addr)).await?;
        }
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
