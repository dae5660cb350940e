//! Web search delegated to a hosted agent.
//!
//! A query is posted to a fresh thread on the agent platform, a run of the
//! Bing-grounded agent is started and polled until it settles, and the
//! agent's reply is turned into a [`SearchOutcome`] with its citations.
//!
//! # Architecture
//!
//! ```text
//! query → RunOrchestrator
//!   ├── AgentClient::create_thread
//!   ├── AgentClient::create_message (user)
//!   ├── AgentClient::create_run
//!   ├── poll get_run while queued / in_progress / requires_action
//!   ├── AgentClient::list_messages
//!   └── extractor::extract → SearchOutcome
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod extractor;
pub mod message;
pub mod orchestrator;
pub mod outcome;
pub mod poll;
pub mod providers;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use client::{AgentClient, create_client};
pub use config::AgentConfig;
pub use credential::{ClientSecretCredential, TokenCredential};
pub use message::{Run, RunStatus, Thread, ThreadMessage};
pub use orchestrator::RunOrchestrator;
pub use outcome::{SearchOutcome, ToolPayload};
pub use poll::{PollPolicy, Sleeper, TokioSleeper};
pub use providers::FoundryClient;
