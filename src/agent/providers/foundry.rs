//! Azure AI Foundry Agent Service client over its REST API.
//!
//! Talks to the project endpoint's `threads`, `messages`, and `runs`
//! resources with a bearer token from a [`TokenCredential`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::agent::client::AgentClient;
use crate::agent::config::USER_AGENT as USER_AGENT_VALUE;
use crate::agent::credential::TokenCredential;
use crate::agent::message::{Agent, MessageRole, Run, Thread, ThreadMessage};
use crate::error::SearchError;

/// Page size used when listing thread messages.
const MESSAGE_PAGE_SIZE: u32 = 100;

/// Error body returned by the platform.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// One page of a list response.
#[derive(Deserialize)]
struct MessagePage {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

/// REST client for the Foundry agents API.
pub struct FoundryClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
}

impl FoundryClient {
    /// Creates a client for the project at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ClientInit`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_version: &str,
        timeout: Duration,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::ClientInit {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            credential,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Sends a request with auth and API version attached and decodes the
    /// JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SearchError> {
        let token = self.credential.token().await?;
        let response = request
            .query(&[("api-version", self.api_version.as_str())])
            .header(AUTHORIZATION, format!("Bearer {}", token.token))
            .send()
            .await
            .map_err(|e| SearchError::Remote {
                operation,
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::extract_error(operation, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::ResponseParse {
                operation,
                message: e.to_string(),
            })
    }

    /// Maps a non-success response to [`SearchError::Remote`].
    async fn extract_error(operation: &'static str, response: reqwest::Response) -> SearchError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(ErrorEnvelope { error }) => match (error.code, error.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (_, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => format!("HTTP {status}"),
            },
            Err(_) => format!("HTTP {status}"),
        };

        SearchError::Remote {
            operation,
            status: Some(status),
            message,
        }
    }
}

impl std::fmt::Debug for FoundryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundryClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AgentClient for FoundryClient {
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, SearchError> {
        let request = self.http.get(self.url(&format!("assistants/{agent_id}")));
        self.send("get agent", request).await
    }

    async fn create_thread(&self) -> Result<Thread, SearchError> {
        let request = self.http.post(self.url("threads")).json(&json!({}));
        self.send("create thread", request).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, SearchError> {
        let request = self
            .http
            .post(self.url(&format!("threads/{thread_id}/messages")))
            .json(&json!({ "role": role, "content": content }));
        self.send("create message", request).await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run, SearchError> {
        let request = self
            .http
            .post(self.url(&format!("threads/{thread_id}/runs")))
            .json(&json!({ "assistant_id": agent_id }));
        self.send("create run", request).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, SearchError> {
        let request = self
            .http
            .get(self.url(&format!("threads/{thread_id}/runs/{run_id}")));
        self.send("get run", request).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, SearchError> {
        let url = self.url(&format!("threads/{thread_id}/messages"));
        let limit = MESSAGE_PAGE_SIZE.to_string();
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("order", "asc"), ("limit", limit.as_str())];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let request = self.http.get(&url).query(&query);
            let page: MessagePage = self.send("list messages", request).await?;

            let fetched = page.data.len();
            messages.extend(page.data);
            debug!(thread_id, fetched, has_more = page.has_more, "listed message page");

            match (page.has_more, page.last_id) {
                (true, Some(last_id)) if fetched > 0 => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }
}
