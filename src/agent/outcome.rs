//! Result payloads returned by the search tool.

use serde::Serialize;

/// Normalized result of one agent search.
///
/// Serializes to the tool's public JSON shape:
/// `{success, result, thread_id, run_id, citations}` for a completed run, or
/// `{success: false, error, thread_id, run_id, result}` for a failed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Whether the run produced an answer.
    pub success: bool,
    /// Synthesized answer text, including the generated Sources section.
    pub result: String,
    /// Thread the query was posted to.
    pub thread_id: String,
    /// Run that produced the answer.
    pub run_id: String,
    /// Deduplicated `[title](url)` citations in first-seen order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
    /// Platform-reported failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    /// Builds the outcome of a run that reached a non-failure terminal status.
    #[must_use]
    pub const fn completed(
        thread_id: String,
        run_id: String,
        result: String,
        citations: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            result,
            thread_id,
            run_id,
            citations: Some(citations),
            error: None,
        }
    }

    /// Builds the outcome of a run the platform reported as failed.
    ///
    /// `reason` is the platform's last-error text; the error message is never
    /// empty even if the reason is.
    #[must_use]
    pub fn failed(thread_id: String, run_id: String, reason: &str) -> Self {
        let error = format!("Agent run failed: {reason}");
        Self {
            success: false,
            result: format!("Error: {error}"),
            thread_id,
            run_id,
            citations: None,
            error: Some(error),
        }
    }

    /// Citations of a successful outcome; empty for failures.
    #[must_use]
    pub fn citations(&self) -> &[String] {
        self.citations.as_deref().unwrap_or_default()
    }
}

/// Payload returned by the `bing_search` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolPayload {
    /// The run reached a terminal status.
    Outcome(SearchOutcome),
    /// Configuration, initialization, or remote-call failure.
    Error {
        /// What went wrong.
        error: String,
    },
}

impl ToolPayload {
    /// Builds an error payload.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Returns the error message, if any.
    ///
    /// Covers both error payloads and failed runs.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Outcome(outcome) => outcome.error.as_deref(),
            Self::Error { error } => Some(error),
        }
    }
}

impl From<SearchOutcome> for ToolPayload {
    fn from(outcome: SearchOutcome) -> Self {
        Self::Outcome(outcome)
    }
}
