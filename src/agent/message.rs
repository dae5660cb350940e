//! Typed shapes of the agent platform's thread, run, and message resources.
//!
//! Only the fields the orchestrator and extractor read are modeled; unknown
//! fields are ignored and unknown content or annotation kinds deserialize to
//! catch-all variants so new platform features never break extraction.

use serde::{Deserialize, Serialize};

/// An agent definition on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent ID.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread ID.
    pub id: String,
}

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The caller.
    User,
    /// The agent.
    #[serde(alias = "agent")]
    Assistant,
}

/// Execution status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting to start.
    Queued,
    /// The agent is working.
    InProgress,
    /// The run is waiting on tool outputs.
    RequiresAction,
    /// Cancellation was requested.
    Cancelling,
    /// The run was cancelled.
    Cancelled,
    /// The run failed; see [`Run::last_error`].
    Failed,
    /// The run finished successfully.
    Completed,
    /// The run hit its expiry before completing.
    Expired,
    /// The run ended before producing a full answer.
    Incomplete,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns `true` while the run has not reached a terminal status.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Queued | Self::InProgress | Self::RequiresAction)
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by the platform for a failed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => f.write_str(code),
            (None, None) => f.write_str("no error details reported"),
        }
    }
}

/// An execution of an agent against a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Run ID.
    pub id: String,
    /// Thread the run executes against.
    pub thread_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Failure details, populated when `status` is `failed`.
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// A message in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Message ID.
    pub id: String,
    /// Author role.
    pub role: MessageRole,
    /// Ordered content segments.
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// One content segment of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// A text segment.
    Text {
        /// Text payload.
        text: MessageText,
    },
    /// Images, files, and anything else.
    #[serde(other)]
    Other,
}

/// Text payload of a [`MessageContent::Text`] segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    /// The generated text.
    pub value: String,
    /// Annotations attached to spans of the text.
    #[serde(default)]
    pub annotations: Vec<TextAnnotation>,
}

/// Annotation on a span of message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextAnnotation {
    /// A web source the agent grounded on.
    UrlCitation {
        /// Citation target.
        url_citation: UrlCitation,
    },
    /// File citations, file paths, and anything else.
    #[serde(other)]
    Other,
}

/// Target of a URL citation annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCitation {
    /// Source URL.
    pub url: String,
    /// Source title, when the platform supplies one.
    #[serde(default)]
    pub title: Option<String>,
}

impl ThreadMessage {
    /// Iterates over the values of the text segments, in order.
    pub fn text_segments(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|c| match c {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        })
    }

    /// Iterates over the URL citations of all text segments, in order.
    pub fn url_citations(&self) -> impl Iterator<Item = &UrlCitation> {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.annotations.iter()),
                MessageContent::Other => None,
            })
            .flatten()
            .filter_map(|a| match a {
                TextAnnotation::UrlCitation { url_citation } => Some(url_citation),
                TextAnnotation::Other => None,
            })
    }
}
