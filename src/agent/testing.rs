//! Test doubles for the agent platform.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::client::AgentClient;
use super::message::{
    Agent, MessageContent, MessageRole, MessageText, Run, RunError, RunStatus, TextAnnotation,
    Thread, ThreadMessage, UrlCitation,
};
use super::poll::Sleeper;
use crate::error::SearchError;

/// Creates an agent message; citations are attached to the first segment.
pub fn agent_message(id: &str, segments: &[&str], citations: &[(&str, &str)]) -> ThreadMessage {
    let annotations: Vec<TextAnnotation> = citations
        .iter()
        .map(|(title, url)| TextAnnotation::UrlCitation {
            url_citation: UrlCitation {
                url: (*url).to_string(),
                title: Some((*title).to_string()),
            },
        })
        .collect();

    let content = segments
        .iter()
        .enumerate()
        .map(|(i, value)| MessageContent::Text {
            text: MessageText {
                value: (*value).to_string(),
                annotations: if i == 0 {
                    annotations.clone()
                } else {
                    Vec::new()
                },
            },
        })
        .collect();

    ThreadMessage {
        id: id.to_string(),
        role: MessageRole::Assistant,
        content,
    }
}

/// Creates a user message with a single text segment.
pub fn user_message(id: &str, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        role: MessageRole::User,
        content: vec![MessageContent::Text {
            text: MessageText {
                value: text.to_string(),
                annotations: Vec::new(),
            },
        }],
    }
}

/// A run template; ids are filled in by [`ScriptedClient`].
pub fn run_with(status: RunStatus, last_error: Option<RunError>) -> Run {
    Run {
        id: String::new(),
        thread_id: String::new(),
        status,
        last_error,
    }
}

/// Snapshot of the calls a [`ScriptedClient`] received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_agent: usize,
    pub create_thread: usize,
    pub create_message: usize,
    pub create_run: usize,
    pub get_run: usize,
    pub list_messages: usize,
}

impl CallCounts {
    /// Run statuses seen: one from create-run plus each fetch.
    pub const fn status_observations(&self) -> usize {
        self.create_run + self.get_run
    }

    pub const fn total(&self) -> usize {
        self.get_agent
            + self.create_thread
            + self.create_message
            + self.create_run
            + self.get_run
            + self.list_messages
    }
}

/// Scripted [`AgentClient`].
///
/// Runs are handed out in order: the first from `create_run`, the rest from
/// `get_run`; the last one repeats once the script is exhausted.
#[derive(Default)]
pub struct ScriptedClient {
    runs: Mutex<VecDeque<Run>>,
    messages: Vec<ThreadMessage>,
    fail_on: Option<&'static str>,
    get_run_delay: Duration,
    posted: Mutex<Vec<String>>,
    get_agent: AtomicUsize,
    create_thread: AtomicUsize,
    create_message: AtomicUsize,
    create_run: AtomicUsize,
    get_run: AtomicUsize,
    list_messages: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default().with_statuses(&[RunStatus::Completed])
    }

    pub fn with_statuses(self, statuses: &[RunStatus]) -> Self {
        self.with_runs(statuses.iter().map(|s| run_with(*s, None)).collect())
    }

    pub fn with_runs(self, runs: Vec<Run>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            ..self
        }
    }

    pub fn with_messages(self, messages: Vec<ThreadMessage>) -> Self {
        Self { messages, ..self }
    }

    /// Makes the named operation fail with an HTTP 500.
    pub fn failing_on(self, operation: &'static str) -> Self {
        Self {
            fail_on: Some(operation),
            ..self
        }
    }

    /// Makes every `get_run` take `delay` on the tokio clock.
    pub fn with_get_run_delay(self, delay: Duration) -> Self {
        Self {
            get_run_delay: delay,
            ..self
        }
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get_agent: self.get_agent.load(Ordering::SeqCst),
            create_thread: self.create_thread.load(Ordering::SeqCst),
            create_message: self.create_message.load(Ordering::SeqCst),
            create_run: self.create_run.load(Ordering::SeqCst),
            get_run: self.get_run.load(Ordering::SeqCst),
            list_messages: self.list_messages.load(Ordering::SeqCst),
        }
    }

    pub fn posted_messages(&self) -> Vec<String> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn check(&self, operation: &'static str) -> Result<(), SearchError> {
        if self.fail_on == Some(operation) {
            return Err(SearchError::Remote {
                operation,
                status: Some(500),
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn next_run(&self, thread_id: &str, run_number: usize) -> Run {
        let mut runs = self.runs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let template = if runs.len() > 1 {
            runs.pop_front()
        } else {
            runs.front().cloned()
        }
        .unwrap_or_else(|| run_with(RunStatus::Completed, None));

        Run {
            id: format!("run_{thread_id}_{run_number}"),
            thread_id: thread_id.to_string(),
            ..template
        }
    }
}

#[async_trait]
impl AgentClient for ScriptedClient {
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, SearchError> {
        self.get_agent.fetch_add(1, Ordering::SeqCst);
        self.check("get agent")?;
        Ok(Agent {
            id: agent_id.to_string(),
            name: None,
        })
    }

    async fn create_thread(&self) -> Result<Thread, SearchError> {
        let n = self.create_thread.fetch_add(1, Ordering::SeqCst);
        self.check("create thread")?;
        Ok(Thread {
            id: format!("thread_{n}"),
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, SearchError> {
        self.create_message.fetch_add(1, Ordering::SeqCst);
        self.check("create message")?;
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(content.to_string());
        }
        Ok(ThreadMessage {
            id: format!("msg_{thread_id}"),
            role,
            content: Vec::new(),
        })
    }

    async fn create_run(&self, thread_id: &str, _agent_id: &str) -> Result<Run, SearchError> {
        self.create_run.fetch_add(1, Ordering::SeqCst);
        self.check("create run")?;
        Ok(self.next_run(thread_id, 0))
    }

    async fn get_run(&self, thread_id: &str, _run_id: &str) -> Result<Run, SearchError> {
        self.get_run.fetch_add(1, Ordering::SeqCst);
        if !self.get_run_delay.is_zero() {
            tokio::time::sleep(self.get_run_delay).await;
        }
        self.check("get run")?;
        Ok(self.next_run(thread_id, 0))
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, SearchError> {
        self.list_messages.fetch_add(1, Ordering::SeqCst);
        self.check("list messages")?;
        Ok(self.messages.clone())
    }
}

/// [`Sleeper`] that records requested durations.
///
/// Waits on the tokio timer, so tests run with a paused clock to finish
/// instantly.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        tokio::time::sleep(duration).await;
    }
}
