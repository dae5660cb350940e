//! CLI layer for bing-search-mcp.
//!
//! Parses transport options and dispatches to the MCP server or a one-off
//! search.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands, Transport};
