//! Error types for bing-search-mcp.
//!
//! [`SearchError`] covers everything that can go wrong between the tool
//! façade and the remote agent platform. A run the platform reports as
//! failed is *not* an error: it is a [`SearchOutcome`] with
//! `success = false`.
//!
//! [`SearchOutcome`]: crate::agent::SearchOutcome

use thiserror::Error;

/// Result type alias for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Search pipeline error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// CLI command error.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised while executing CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be executed.
    #[error("command failed: {0}")]
    ExecutionFailed(String),
}

/// Coarse classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required endpoint or agent identifier is missing.
    Configuration,
    /// Credential or client construction failed.
    Initialization,
    /// A call to the agent platform failed or returned something unreadable.
    Remote,
    /// The caller cancelled the request while the run was being polled.
    Cancelled,
    /// The run did not reach a terminal status within the poll bounds.
    Timeout,
}

/// Errors from the agent search pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Project endpoint or agent ID is not configured.
    #[error(
        "Bing Search service is not initialized. Check AZURE_AI_FOUNDRY_PROJECT_ENDPOINT and AZURE_AI_FOUNDRY_AGENT_ID environment variables."
    )]
    NotConfigured,

    /// The agent client could not be constructed.
    #[error("client initialization failed: {message}")]
    ClientInit {
        /// What went wrong.
        message: String,
    },

    /// Token acquisition failed.
    #[error("credential error: {message}")]
    Credential {
        /// What went wrong.
        message: String,
    },

    /// A request to the agent platform failed.
    #[error("{operation} failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        /// Platform operation, e.g. `"create thread"`.
        operation: &'static str,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Error message from the platform or transport.
        message: String,
    },

    /// The platform returned a body that could not be decoded.
    #[error("failed to parse {operation} response: {message}")]
    ResponseParse {
        /// Platform operation whose response was malformed.
        operation: &'static str,
        /// Decoder message.
        message: String,
    },

    /// Polling stopped because the request was cancelled.
    #[error("polling of run {run_id} on thread {thread_id} was cancelled")]
    Cancelled {
        /// Thread the run belongs to.
        thread_id: String,
        /// Run that was being polled.
        run_id: String,
    },

    /// Polling stopped because the run exceeded the configured bounds.
    #[error("run {run_id} on thread {thread_id} still pending after {polls} status checks")]
    PollLimitExceeded {
        /// Thread the run belongs to.
        thread_id: String,
        /// Run that was being polled.
        run_id: String,
        /// Number of status fetches performed.
        polls: u32,
    },
}

impl SearchError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::Configuration,
            Self::ClientInit { .. } | Self::Credential { .. } => ErrorKind::Initialization,
            Self::Remote { .. } | Self::ResponseParse { .. } => ErrorKind::Remote,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::PollLimitExceeded { .. } => ErrorKind::Timeout,
        }
    }

    /// Returns `true` if the platform answered with HTTP 404, e.g. for an
    /// unknown agent ID.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                status: Some(404),
                ..
            }
        )
    }
}
