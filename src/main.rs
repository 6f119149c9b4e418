//! MCP HTTP Bridge Entry Point
//!
//! Reads configuration from the environment (see `core::config`), sets up
//! logging, builds the tool registry once and starts the selected transport.

use std::sync::Arc;

use mcp_http_bridge::core::config::{LogFormat, ServerConfig, TransportMode};
use mcp_http_bridge::core::server::{self, ServerContext};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    // Logs go to stderr so STDIO mode keeps stdout for JSON-RPC
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let (config, warnings) = match ServerConfig::from_env() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let ctx = Arc::new(ServerContext::new(&config, server::initialize_tools()));

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(ctx).await,
        TransportMode::Http => server::run_server_http(ctx, &config).await,
        TransportMode::Both => {
            // STDIO runs in the background while HTTP owns the foreground
            let stdio_ctx = ctx.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_ctx).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(ctx, &config).await;
            stdio_handle.abort();
            http_result
        }
    }
}
