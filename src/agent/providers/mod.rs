//! Concrete [`AgentClient`](super::client::AgentClient) implementations.

pub mod foundry;

pub use foundry::FoundryClient;
