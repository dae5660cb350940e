//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};

/// Default bind address for the HTTP transport.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 8000;

/// bing-search-mcp: web search for MCP clients via a Bing-grounded agent.
///
/// Without a subcommand the MCP server is started on the selected transport.
/// Configuration comes from the environment, optionally loaded from `.env`.
#[derive(Parser, Debug)]
#[command(name = "bing-search-mcp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Environment:
  AZURE_AI_FOUNDRY_PROJECT_ENDPOINT   Foundry project endpoint (required)
  AZURE_AI_FOUNDRY_AGENT_ID           Bing-grounded agent ID (required)
  AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET
                                      Service principal credentials

Examples:
  bing-search-mcp                              # Streamable HTTP on 0.0.0.0:8000/mcp
  bing-search-mcp --transport stdio            # stdio for local MCP clients
  bing-search-mcp --port 9000                  # Custom port
  bing-search-mcp search "latest rust release" # One-off query, JSON on stdout
"#)]
pub struct Cli {
    /// MCP transport to serve.
    #[arg(short, long, value_enum, default_value_t = Transport::StreamableHttp)]
    pub transport: Transport,

    /// Bind address for the HTTP transport.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for the HTTP transport.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Optional subcommand; serves MCP when absent.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// MCP transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP at `/mcp`.
    #[value(name = "streamable-http", alias = "http", alias = "sse")]
    StreamableHttp,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single search and print the tool payload as JSON.
    #[command(after_help = r#"Examples:
  bing-search-mcp search "rust 2024 edition"
  bing-search-mcp search "weather in Lisbon" | jq -r .result
"#)]
    Search {
        /// Search query text.
        query: String,
    },
}
