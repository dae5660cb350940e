//! CLI command implementations.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::config::{AGENT_ID_ENV, AgentConfig, PROJECT_ENDPOINT_ENV};
use crate::cli::parser::{Cli, Commands, Transport};
use crate::error::{CommandError, Result};
use crate::mcp::{BingSearchMcpServer, serve_http, serve_stdio};

/// Executes the CLI command.
///
/// Serves MCP on the selected transport, or runs a one-off search when the
/// `search` subcommand is given.
///
/// # Returns
///
/// Output to print on stdout; empty after the server shuts down.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created or the server fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let config = AgentConfig::from_env();
    warn_if_unconfigured(&config);

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    match &cli.command {
        Some(Commands::Search { query }) => rt.block_on(cmd_search(config, query)),
        None => rt.block_on(cmd_serve(config, cli)),
    }
}

/// Logs one warning per missing required variable. The server still starts.
fn warn_if_unconfigured(config: &AgentConfig) {
    if config.project_endpoint.is_none() {
        warn!("{PROJECT_ENDPOINT_ENV} is not set; bing_search will return an error");
    }
    if config.agent_id.is_none() {
        warn!("{AGENT_ID_ENV} is not set; bing_search will return an error");
    }
}

async fn cmd_serve(config: AgentConfig, cli: &Cli) -> Result<String> {
    let server = BingSearchMcpServer::new(config);

    match cli.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::StreamableHttp => serve_http(server, &cli.host, cli.port).await,
    }
    .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    info!("server stopped");
    Ok(String::new())
}

async fn cmd_search(config: AgentConfig, query: &str) -> Result<String> {
    let server = BingSearchMcpServer::new(config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let payload = server.search(query, cancel).await;
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|e| CommandError::ExecutionFailed(format!("Serialization error: {e}")))?;

    Ok(json)
}
