//! MCP (Model Context Protocol) server for bing-search-mcp.
//!
//! Exposes a single `bing_search` tool that delegates the query to a
//! Bing-grounded agent and returns the synthesized answer as JSON.
//!
//! # Architecture
//!
//! ```text
//! MCP Client
//!   ↓ bing_search(query)
//! BingSearchMcpServer
//!   ↓ lazily built AgentClient (OnceCell)
//! RunOrchestrator::query()
//!   ↓
//! SearchOutcome | {"error": ...} JSON → MCP Client
//! ```

pub mod params;
pub mod server;
pub mod transport;

pub use params::SearchParams;
pub use server::BingSearchMcpServer;
pub use transport::{serve_http, serve_stdio};
