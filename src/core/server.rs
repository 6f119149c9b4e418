//! MCP Server Implementation
//!
//! This module wires the dispatchers into transports:
//! - the shared [`ServerContext`] built once at startup
//! - HTTP routes and server setup with Actix Web
//! - a line-based STDIO transport reusing the JSON-RPC dispatcher

use actix_web::{
    App, HttpResponse, HttpServer, Result,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::config::ServerConfig;
use super::jsonrpc::{self, JsonRpcResponse, PARSE_ERROR};
use super::registry::ToolRegistry;
use super::rest;
use crate::tools;

/// Routes advertised by `GET /`.
pub const ENDPOINTS: [&str; 4] = ["/tools", "/execute", "/mcp/tools", "/mcp/execute"];

/// State shared by every request handler.
pub struct ServerContext {
    /// Server name as reported in `initialize` and `GET /`
    pub server_name: String,
    /// Server version as reported in `initialize`
    pub server_version: String,
    pub registry: Arc<ToolRegistry>,
    /// Cancelled once when the server shuts down
    pub shutdown: CancellationToken,
}

impl ServerContext {
    pub fn new(config: &ServerConfig, registry: Arc<ToolRegistry>) -> Self {
        Self {
            server_name: config.server_name.clone(),
            server_version: config.server_version.clone(),
            registry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token for one request; cancelled with the server shutdown token.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

/// Create a registry holding every built-in tool.
pub fn initialize_tools() -> Arc<ToolRegistry> {
    let registry = ToolRegistry::new(tools::all());
    for definition in registry.list() {
        tracing::debug!(
            tool = definition.name(),
            description = definition.description(),
            "registered tool"
        );
    }
    Arc::new(registry)
}

/// Server description endpoint.
async fn server_info(ctx: web::Data<ServerContext>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": ctx.server_name,
        "status": "ok",
        "endpoints": ENDPOINTS,
        "capabilities": { "jsonrpc": true }
    })))
}

/// Liveness check for load balancers.
async fn health(ctx: web::Data<ServerContext>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": ctx.server_name
    })))
}

/// JSON-RPC endpoint. Protocol errors are reported in the envelope, so the
/// HTTP status is always 200.
async fn json_rpc(ctx: web::Data<ServerContext>, body: web::Bytes) -> Result<HttpResponse> {
    let cancel = ctx.request_token();
    let _guard = cancel.clone().drop_guard();

    let response = jsonrpc::dispatch(&ctx, &body, &cancel).await;
    Ok(HttpResponse::Ok().json(response))
}

/// Register every HTTP route. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(rest::json_error_handler))
        .service(
            web::resource("/")
                .route(web::get().to(server_info))
                .route(web::post().to(json_rpc)),
        )
        .route("/health", web::get().to(health));

    for path in ["/tools", "/mcp/tools"] {
        cfg.route(path, web::get().to(rest::list_tools));
    }
    for path in ["/execute", "/mcp/execute"] {
        cfg.route(path, web::post().to(rest::execute_tool));
    }
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
///
/// Ctrl-C cancels the context's shutdown token, which cancels every
/// in-flight tool execution, then stops the server gracefully.
pub async fn run_server_http(ctx: Arc<ServerContext>, config: &ServerConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let workers = config.workers;

    tracing::info!(
        name = %ctx.server_name,
        version = %ctx.server_version,
        bind = %bind_addr,
        workers,
        tools = ctx.registry.len(),
        "MCP server starting (HTTP mode)"
    );

    let data = web::Data::from(ctx.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            // Enable compression for JSON responses (gzip/brotli)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .workers(workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .disable_signals()
    .bind(&bind_addr)?
    .run();

    let handle = server.handle();
    let shutdown = ctx.shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "failed to listen for shutdown signal");
                    return;
                }
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
            _ = shutdown.cancelled() => {}
        }
        handle.stop(true).await;
    });

    server.await
}

/// Run the MCP server in STDIO mode.
///
/// Reads one JSON-RPC request per line from stdin and writes one response
/// per line to stdout. Logging goes to stderr so it never interleaves with
/// the protocol stream. Notifications get no response.
pub async fn run_server_stdio(ctx: Arc<ServerContext>) -> std::io::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

    tracing::info!(
        name = %ctx.server_name,
        version = %ctx.server_version,
        tools = ctx.registry.len(),
        "MCP server starting (STDIO mode)"
    );

    let mut lines = BufReader::with_capacity(8192, tokio::io::stdin()).lines();
    let mut stdout = BufWriter::with_capacity(8192, tokio::io::stdout());

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = ctx.shutdown.cancelled() => break,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(payload) if jsonrpc::is_notification(&payload) => continue,
            Ok(payload) => {
                let cancel = ctx.request_token();
                let _guard = cancel.clone().drop_guard();
                jsonrpc::dispatch_value(&ctx, payload, &cancel).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "unparseable line on stdin");
                JsonRpcResponse::error(serde_json::Value::Null, PARSE_ERROR, "Parse error")
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        // Flush per response so clients never wait on a full buffer
        stdout.flush().await?;
    }

    Ok(())
}
