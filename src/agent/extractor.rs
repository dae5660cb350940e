//! Result extraction from a finished run's thread.
//!
//! Selects the agent's final message, joins its text segments, deduplicates
//! its URL citations and appends a generated "Sources" section. Extraction is
//! a pure function of the message list, so re-running it over the same thread
//! state yields byte-identical output.

use std::fmt::Write as _;

use super::message::{MessageRole, ThreadMessage, UrlCitation};
use super::outcome::SearchOutcome;

/// Header line of the generated sources section.
pub const SOURCES_HEADER: &str = "## Sources";

/// Builds a [`SearchOutcome`] from the messages of a terminal run.
///
/// `messages` must be in platform order (oldest first); the last message
/// authored by the agent is used and earlier agent messages are ignored.
/// A run without any agent message still succeeds with an empty answer.
#[must_use]
pub fn extract(thread_id: &str, run_id: &str, messages: &[ThreadMessage]) -> SearchOutcome {
    let Some(answer) = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
    else {
        return SearchOutcome::completed(
            thread_id.to_string(),
            run_id.to_string(),
            String::new(),
            Vec::new(),
        );
    };

    let mut result = String::new();
    for segment in answer.text_segments() {
        result.push_str(segment);
        result.push('\n');
    }

    // The section follows the untrimmed text; trailing whitespace is trimmed
    // once over the whole result.
    let citations = dedup_citations(answer.url_citations());
    if !citations.is_empty() {
        if result.trim().is_empty() {
            result.clear();
        } else {
            result.push_str("\n\n");
        }
        result.push_str(&sources_section(&citations));
    }
    result.truncate(result.trim_end().len());

    SearchOutcome::completed(thread_id.to_string(), run_id.to_string(), result, citations)
}

/// Renders a citation as a markdown link. Falls back to the URL when the
/// platform omitted the title.
#[must_use]
pub fn render_citation(citation: &UrlCitation) -> String {
    let title = citation.title.as_deref().unwrap_or(&citation.url);
    format!("[{title}]({})", citation.url)
}

/// Renders citations, dropping repeats of an already rendered string.
pub fn dedup_citations<'a>(citations: impl IntoIterator<Item = &'a UrlCitation>) -> Vec<String> {
    let mut rendered: Vec<String> = Vec::new();
    for citation in citations {
        let link = render_citation(citation);
        if !rendered.contains(&link) {
            rendered.push(link);
        }
    }
    rendered
}

/// Renders the sources section: the header line followed by one bullet per
/// citation. No trailing newline.
#[must_use]
pub fn sources_section(citations: &[String]) -> String {
    let mut section = String::from(SOURCES_HEADER);
    for citation in citations {
        let _ = write!(section, "\n- {citation}");
    }
    section
}
