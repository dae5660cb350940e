//! MCP tool parameter types.
//!
//! Input schemas are derived with `schemars` for the MCP tool listing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `bing_search` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// The search query. Forwarded to the agent unchanged.
    pub query: String,
}
