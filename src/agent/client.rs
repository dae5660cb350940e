//! Agent platform client trait and factory.
//!
//! The orchestrator only talks to the platform through [`AgentClient`], so it
//! can be driven by a scripted stub in tests and by
//! [`FoundryClient`](super::providers::FoundryClient) in production.

use std::sync::Arc;

use async_trait::async_trait;

use super::config::AgentConfig;
use super::credential::ClientSecretCredential;
use super::message::{Agent, MessageRole, Run, Thread, ThreadMessage};
use super::providers::FoundryClient;
use crate::error::SearchError;

/// Narrow view of the agent platform's thread, message, and run resources.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Fetches an agent definition; unknown IDs fail with HTTP 404.
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, SearchError>;

    /// Creates an empty thread.
    async fn create_thread(&self) -> Result<Thread, SearchError>;

    /// Appends a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, SearchError>;

    /// Starts a run of `agent_id` against a thread.
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run, SearchError>;

    /// Fetches the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, SearchError>;

    /// Lists all messages of a thread, oldest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, SearchError>;
}

/// Creates the production [`AgentClient`] for `config`.
///
/// Credentials are read from the environment here, not at startup.
///
/// # Errors
///
/// Returns [`SearchError::NotConfigured`] if the endpoint is missing and
/// [`SearchError::ClientInit`] if credentials or the HTTP client cannot be
/// set up.
pub fn create_client(config: &AgentConfig) -> Result<Arc<dyn AgentClient>, SearchError> {
    let endpoint = config
        .project_endpoint
        .as_deref()
        .ok_or(SearchError::NotConfigured)?;

    let credential = ClientSecretCredential::from_env(config.request_timeout)?;
    let client = FoundryClient::new(
        endpoint,
        &config.api_version,
        config.request_timeout,
        Arc::new(credential),
    )?;

    Ok(Arc::new(client))
}
