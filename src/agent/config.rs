//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! Unlike a hard failure on missing values, an unconfigured endpoint or agent
//! leaves the server running; the tool reports the problem on every call.

use std::time::Duration;

use super::poll::PollPolicy;

/// Environment variable holding the Foundry project endpoint.
pub const PROJECT_ENDPOINT_ENV: &str = "AZURE_AI_FOUNDRY_PROJECT_ENDPOINT";
/// Environment variable holding the agent ID.
pub const AGENT_ID_ENV: &str = "AZURE_AI_FOUNDRY_AGENT_ID";
/// Environment variable overriding the REST API version.
pub const API_VERSION_ENV: &str = "AZURE_AI_FOUNDRY_API_VERSION";
/// Environment variable holding the poll interval in milliseconds.
pub const POLL_INTERVAL_MS_ENV: &str = "BING_SEARCH_POLL_INTERVAL_MS";
/// Environment variable capping the number of status fetches.
pub const MAX_POLLS_ENV: &str = "BING_SEARCH_MAX_POLLS";
/// Environment variable capping the polling time in seconds.
pub const POLL_TIMEOUT_SECS_ENV: &str = "BING_SEARCH_POLL_TIMEOUT_SECS";
/// Environment variable holding the per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "BING_SEARCH_REQUEST_TIMEOUT_SECS";

/// Default agents REST API version.
pub const DEFAULT_API_VERSION: &str = "2025-05-01";
/// Default delay between run status checks.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Shorter intervals are raised to this floor.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default per-request HTTP timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// User agent sent with every platform request.
pub const USER_AGENT: &str = "bing-search-mcp";

/// Configuration for the search agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Foundry project endpoint, e.g.
    /// `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    pub project_endpoint: Option<String>,
    /// ID of the agent with Bing grounding enabled.
    pub agent_id: Option<String>,
    /// Agents REST API version.
    pub api_version: String,
    /// Run polling behavior.
    pub poll: PollPolicy,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }

    /// Returns `true` when both the endpoint and the agent ID are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.project_endpoint.is_some() && self.agent_id.is_some()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    project_endpoint: Option<String>,
    agent_id: Option<String>,
    api_version: Option<String>,
    poll_interval: Option<Duration>,
    max_polls: Option<u32>,
    poll_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| std::env::var(key).ok())
    }

    /// Populates unset fields using `lookup` to resolve variable names.
    ///
    /// Empty values count as unset; unparsable numbers fall back to defaults.
    #[must_use]
    pub fn from_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());

        if self.project_endpoint.is_none() {
            self.project_endpoint = get(PROJECT_ENDPOINT_ENV);
        }
        if self.agent_id.is_none() {
            self.agent_id = get(AGENT_ID_ENV);
        }
        if self.api_version.is_none() {
            self.api_version = get(API_VERSION_ENV);
        }
        if self.poll_interval.is_none() {
            self.poll_interval = number(POLL_INTERVAL_MS_ENV).map(Duration::from_millis);
        }
        if self.max_polls.is_none() {
            self.max_polls = number(MAX_POLLS_ENV).and_then(|n| u32::try_from(n).ok());
        }
        if self.poll_timeout.is_none() {
            self.poll_timeout = number(POLL_TIMEOUT_SECS_ENV).map(Duration::from_secs);
        }
        if self.request_timeout.is_none() {
            self.request_timeout = number(REQUEST_TIMEOUT_SECS_ENV).map(Duration::from_secs);
        }
        self
    }

    /// Sets the project endpoint.
    #[must_use]
    pub fn project_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.project_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the agent ID.
    #[must_use]
    pub fn agent_id(mut self, id: impl Into<String>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    /// Sets the REST API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the delay between run status checks; raised to
    /// [`MIN_POLL_INTERVAL`] if shorter.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Caps the number of run status fetches.
    #[must_use]
    pub const fn max_polls(mut self, n: u32) -> Self {
        self.max_polls = Some(n);
        self
    }

    /// Caps the wall-clock time spent polling a run.
    #[must_use]
    pub const fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    /// Sets the per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the [`AgentConfig`].
    #[must_use]
    pub fn build(self) -> AgentConfig {
        AgentConfig {
            project_endpoint: self
                .project_endpoint
                .map(|e| e.trim_end_matches('/').to_string()),
            agent_id: self.agent_id,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            poll: PollPolicy {
                interval: self
                    .poll_interval
                    .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
                    .max(MIN_POLL_INTERVAL),
                max_polls: self.max_polls,
                timeout: self.poll_timeout,
            },
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}
