//! MCP transport layer for stdio and streamable HTTP.

use std::sync::Arc;

use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::server::BingSearchMcpServer;

/// Path the HTTP service is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Starts the MCP server with stdio transport.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn serve_stdio(server: BingSearchMcpServer) -> anyhow::Result<()> {
    info!("serving MCP over stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Starts the MCP server with streamable HTTP transport.
///
/// Listens on `host:port` and serves MCP sessions at `/mcp`. Every session
/// gets a clone of `server`, so the agent client is built once per process.
/// Ctrl-C shuts the listener down gracefully.
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn serve_http(server: BingSearchMcpServer, host: &str, port: u16) -> anyhow::Result<()> {
    let ct = CancellationToken::new();

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: ct.child_token(),
            ..Default::default()
        },
    );

    let router = axum::Router::new().nest_service(MCP_PATH, service);
    let addr = format!("{host}:{port}");
    let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("bing-search-mcp listening on http://{addr}{MCP_PATH}");

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            ct.cancel();
        })
        .await?;

    Ok(())
}
