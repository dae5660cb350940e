//! MCP server for bing-search-mcp.
//!
//! Exposes the `bing_search` tool. The agent client is created lazily on the
//! first call and shared by every clone of the server.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::agent::client::{AgentClient, create_client};
use crate::agent::config::{AGENT_ID_ENV, AgentConfig, PROJECT_ENDPOINT_ENV};
use crate::agent::orchestrator::RunOrchestrator;
use crate::agent::outcome::ToolPayload;
use crate::error::SearchError;

use super::params::SearchParams;

/// Error payload returned when the client could not be constructed.
pub const INIT_FAILED_MESSAGE: &str = "Failed to initialize Bing Search client.";

/// Builds the agent client on first use.
pub type ClientFactory =
    dyn Fn(&AgentConfig) -> Result<Arc<dyn AgentClient>, SearchError> + Send + Sync;

/// Bing search MCP server.
#[derive(Clone)]
pub struct BingSearchMcpServer {
    tool_router: ToolRouter<Self>,
    config: Arc<AgentConfig>,
    client: Arc<OnceCell<Arc<dyn AgentClient>>>,
    factory: Arc<ClientFactory>,
}

#[tool_router]
impl BingSearchMcpServer {
    /// Search the web through the Bing-grounded agent.
    #[tool(
        name = "bing_search",
        description = "Search the web using Bing Search via an Azure AI Foundry agent. Returns JSON with the synthesized answer (including a Sources section), the thread and run IDs, and the list of cited sources as markdown links."
    )]
    async fn bing_search(
        &self,
        Parameters(params): Parameters<SearchParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.search(&params.query, context.ct.child_token()).await;

        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for BingSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bing-search-mcp".to_string(),
                title: Some("Bing Search MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Web search grounded by Bing. Call `bing_search` with a natural-language \
                 query; the answer text ends with a Sources section and the `citations` \
                 field lists each source once."
                    .to_string(),
            ),
        }
    }
}

impl BingSearchMcpServer {
    /// Creates a server that builds its client with [`create_client`].
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        Self::with_client_factory(config, Arc::new(create_client))
    }

    /// Creates a server with a custom client factory.
    #[must_use]
    pub fn with_client_factory(config: AgentConfig, factory: Arc<ClientFactory>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            client: Arc::new(OnceCell::new()),
            factory,
        }
    }

    /// Returns the agent configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs one search and returns the tool payload.
    ///
    /// Never fails: configuration, initialization, and platform errors are
    /// reported as `{"error": ...}` payloads.
    pub async fn search(&self, query: &str, cancel: CancellationToken) -> ToolPayload {
        let Some(agent_id) = self
            .config
            .agent_id
            .as_deref()
            .filter(|_| self.config.is_configured())
        else {
            warn!("bing_search called without {PROJECT_ENDPOINT_ENV} / {AGENT_ID_ENV}");
            return ToolPayload::error(SearchError::NotConfigured.to_string());
        };

        let client = match self.client().await {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "failed to initialize agent client");
                return ToolPayload::error(INIT_FAILED_MESSAGE);
            }
        };

        info!(agent_id, "running bing search");
        let orchestrator = RunOrchestrator::new(client, self.config.poll);
        match orchestrator.query(agent_id, query, &cancel).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                error!(agent_id, error = %e, kind = ?e.kind(), "bing search failed");
                ToolPayload::error(format!("Error performing Bing search: {e}"))
            }
        }
    }

    /// Returns the shared client, building it on first use.
    ///
    /// A failed build leaves the cell empty so the next call retries.
    async fn client(&self) -> Result<Arc<dyn AgentClient>, SearchError> {
        self.client
            .get_or_try_init(|| async { (self.factory)(&self.config) })
            .await
            .cloned()
    }
}

impl std::fmt::Debug for BingSearchMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BingSearchMcpServer")
            .field("config", &self.config)
            .field("client_initialized", &self.client.initialized())
            .finish_non_exhaustive()
    }
}
