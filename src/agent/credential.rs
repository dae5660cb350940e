//! Bearer token acquisition for the agent platform.
//!
//! [`ClientSecretCredential`] performs the OAuth2 client-credentials grant
//! against the Microsoft identity platform and caches the token until it is
//! close to expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SearchError;

/// Environment variable holding the Entra tenant ID.
pub const TENANT_ID_ENV: &str = "AZURE_TENANT_ID";
/// Environment variable holding the application (client) ID.
pub const CLIENT_ID_ENV: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_ENV: &str = "AZURE_CLIENT_SECRET";
/// Environment variable overriding the identity authority host.
pub const AUTHORITY_HOST_ENV: &str = "AZURE_AUTHORITY_HOST";

/// Default identity authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Token scope for the Foundry agents API.
pub const AGENTS_SCOPE: &str = "https://ai.azure.com/.default";
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// A bearer token and the instant it stops being usable.
#[derive(Clone)]
pub struct AccessToken {
    /// Raw token value.
    pub token: String,
    /// Expiry instant.
    pub expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a token valid for at least the next request.
    async fn token(&self) -> Result<AccessToken, SearchError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Client-secret credential for a service principal.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<AccessToken>>,
}

impl ClientSecretCredential {
    /// Creates a credential from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ClientInit`] if the HTTP client cannot be built.
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::ClientInit {
                message: format!("failed to build token HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            token_url: format!(
                "{}/{tenant_id}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/')
            ),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Creates a credential from the `AZURE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ClientInit`] if any of tenant ID, client ID or
    /// client secret is missing.
    pub fn from_env(timeout: Duration) -> Result<Self, SearchError> {
        Self::from_lookup(|key| std::env::var(key).ok(), timeout)
    }

    /// Creates a credential using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ClientInit`] if a required value is missing.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SearchError::ClientInit {
                    message: format!("{key} is not set"),
                })
        };

        let tenant_id = required(TENANT_ID_ENV)?;
        let client_id = required(CLIENT_ID_ENV)?;
        let client_secret = required(CLIENT_SECRET_ENV)?;
        let authority =
            lookup(AUTHORITY_HOST_ENV).unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());

        Self::new(&authority, &tenant_id, &client_id, &client_secret, timeout)
    }

    async fn request_token(&self) -> Result<AccessToken, SearchError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", AGENTS_SCOPE),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SearchError::Credential {
                message: format!("token request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<TokenErrorResponse>()
                .await
                .map(|e| format!("{}: {}", e.error, e.error_description))
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(SearchError::Credential {
                message: format!("token request rejected: {detail}"),
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| SearchError::Credential {
            message: format!("malformed token response: {e}"),
        })?;

        debug!(expires_in = body.expires_in, "acquired access token");

        Ok(AccessToken {
            token: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self) -> Result<AccessToken, SearchError> {
        // Held across the request so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Instant::now())
        {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}
