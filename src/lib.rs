//! # bing-search-mcp
//!
//! An MCP server exposing a single `bing_search` tool. Each query is handed
//! to an Azure AI Foundry agent with Bing grounding; the agent's answer is
//! returned with a deduplicated list of cited sources.
//!
//! ## Modules
//!
//! - [`agent`]: platform client, run orchestration, and answer extraction
//! - [`mcp`]: the MCP tool and its stdio / streamable HTTP transports
//! - [`cli`]: command-line entry point
//! - [`logging`]: stderr diagnostics
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```no_run
//! use bing_search_mcp::agent::AgentConfig;
//! use bing_search_mcp::mcp::BingSearchMcpServer;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let server = BingSearchMcpServer::new(AgentConfig::from_env());
//! let payload = server.search("latest rust release", CancellationToken::new()).await;
//! # let _ = payload;
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod error;
pub mod logging;
pub mod mcp;

pub use agent::{AgentConfig, SearchOutcome, ToolPayload};
pub use error::{Error, Result, SearchError};
pub use mcp::BingSearchMcpServer;
