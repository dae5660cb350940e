//! Orchestrator for one agent search.
//!
//! Drives a query through the platform: look up agent → create thread →
//! post message → start run → poll until terminal → extract the answer.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::client::AgentClient;
use super::extractor::extract;
use super::message::{MessageRole, Run, RunStatus};
use super::outcome::SearchOutcome;
use super::poll::{PollPolicy, Sleeper, TokioSleeper};
use crate::error::SearchError;

/// Executes agent searches against an [`AgentClient`].
///
/// Each call creates its own thread and run; nothing is shared between
/// concurrent queries besides the client.
pub struct RunOrchestrator<S = TokioSleeper> {
    client: Arc<dyn AgentClient>,
    policy: PollPolicy,
    sleeper: S,
}

impl RunOrchestrator<TokioSleeper> {
    /// Creates an orchestrator that waits on the tokio timer.
    pub fn new(client: Arc<dyn AgentClient>, policy: PollPolicy) -> Self {
        Self::with_sleeper(client, policy, TokioSleeper)
    }
}

impl<S: Sleeper> RunOrchestrator<S> {
    /// Creates an orchestrator with a custom [`Sleeper`].
    pub fn with_sleeper(client: Arc<dyn AgentClient>, policy: PollPolicy, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// Runs `query` through the agent `agent_id`.
    ///
    /// # Steps
    ///
    /// 1. Fetch the agent, so an unknown ID fails before a thread exists
    /// 2. Create a thread
    /// 3. Post the query as a user message
    /// 4. Start a run of the agent
    /// 5. Poll while the run is queued, in progress, or requires action
    /// 6. Return a failure outcome if the run failed
    /// 7. Otherwise extract the answer from the thread's messages
    ///
    /// The query is forwarded as-is, empty or not.
    ///
    /// # Errors
    ///
    /// Platform call failures propagate unchanged and are not retried.
    /// Returns [`SearchError::Cancelled`] if `cancel` fires while polling and
    /// [`SearchError::PollLimitExceeded`] if the poll bounds are exhausted.
    /// A run the platform reports as failed is *not* an error.
    pub async fn query(
        &self,
        agent_id: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        let agent = self.client.get_agent(agent_id).await?;
        debug!(agent_id, name = agent.name.as_deref().unwrap_or_default(), "resolved agent");

        let thread = self.client.create_thread().await?;
        let thread_id = thread.id;
        debug!(%thread_id, "created thread");

        self.client
            .create_message(&thread_id, MessageRole::User, query)
            .await?;

        let run = self.client.create_run(&thread_id, agent_id).await?;
        let run_id = run.id.clone();
        info!(%thread_id, %run_id, agent_id, "started agent run");

        let run = self.wait_for_terminal(&thread_id, run, cancel).await?;

        if run.status == RunStatus::Failed {
            let reason = run.last_error.unwrap_or_default().to_string();
            error!(%thread_id, %run_id, %reason, "agent run failed");
            return Ok(SearchOutcome::failed(thread_id, run_id, &reason));
        }

        let messages = self.client.list_messages(&thread_id).await?;
        let outcome = extract(&thread_id, &run_id, &messages);
        debug!(
            %thread_id,
            %run_id,
            status = %run.status,
            citations = outcome.citations().len(),
            "extracted agent answer"
        );

        Ok(outcome)
    }

    /// Polls `run` until it leaves the pending statuses.
    ///
    /// Fetches are strictly sequential; the status returned when the run was
    /// created counts as the first observation. The time bound is measured on
    /// the tokio clock from the first check, so slow fetches count against it.
    async fn wait_for_terminal(
        &self,
        thread_id: &str,
        mut run: Run,
        cancel: &CancellationToken,
    ) -> Result<Run, SearchError> {
        let started = Instant::now();
        let mut polls: u32 = 0;

        while run.status.is_pending() {
            if !self.policy.allows(polls, started.elapsed()) {
                return Err(SearchError::PollLimitExceeded {
                    thread_id: thread_id.to_string(),
                    run_id: run.id,
                    polls,
                });
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(SearchError::Cancelled {
                        thread_id: thread_id.to_string(),
                        run_id: run.id,
                    });
                }
                () = self.sleeper.sleep(self.policy.interval) => {}
            }

            run = self.client.get_run(thread_id, &run.id).await?;
            polls += 1;
            debug!(thread_id, run_id = %run.id, status = %run.status, polls, "polled run");
        }

        Ok(run)
    }
}

impl<S> std::fmt::Debug for RunOrchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOrchestrator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::RunError;
    use crate::agent::poll::Sleeper;
    use crate::agent::testing::{RecordingSleeper, ScriptedClient, agent_message, run_with};
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Cancels `token` during the `cancel_on`-th sleep, then never wakes.
    struct CancellingSleeper {
        token: CancellationToken,
        cancel_on: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Sleeper for CancellingSleeper {
        async fn sleep(&self, duration: Duration) {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.cancel_on {
                self.token.cancel();
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(duration).await;
        }
    }

    fn orchestrator(
        client: &Arc<ScriptedClient>,
        policy: PollPolicy,
    ) -> RunOrchestrator<RecordingSleeper> {
        RunOrchestrator::with_sleeper(client.clone(), policy, RecordingSleeper::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_sequence_sleeps_between_fetches() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_statuses(&[RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
                .with_messages(vec![agent_message("m", &["done"], &[])]),
        );
        let orch = orchestrator(&client, PollPolicy::default());

        let outcome = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(outcome.success);
        assert_eq!(outcome.result, "done");
        assert_eq!(orch.sleeper.sleeps(), vec![Duration::from_secs(1); 2]);
        assert_eq!(client.calls().get_run, 2);
        // create-run status plus two fetched statuses
        assert_eq!(client.calls().status_observations(), 3);
        assert_eq!(client.calls().list_messages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requires_action_keeps_polling() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[
            RunStatus::RequiresAction,
            RunStatus::RequiresAction,
            RunStatus::Completed,
        ]));
        let orch = orchestrator(&client, PollPolicy::default());
        let outcome = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(outcome.success);
        assert_eq!(orch.sleeper.sleeps().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_completion_does_not_sleep() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::Completed]));
        let orch = orchestrator(&client, PollPolicy::default());
        let outcome = orch
            .query("asst_1", "", &CancellationToken::new())
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(outcome.success);
        assert_eq!(outcome.result, "");
        assert!(outcome.citations().is_empty());
        assert!(orch.sleeper.sleeps().is_empty());
        assert_eq!(client.calls().get_run, 0);
        // Empty query is forwarded untouched.
        assert_eq!(client.posted_messages(), vec![String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_returns_failure_outcome() {
        let client = Arc::new(ScriptedClient::new().with_runs(vec![
            run_with(RunStatus::Queued, None),
            run_with(
                RunStatus::Failed,
                Some(RunError {
                    code: Some("server_error".to_string()),
                    message: Some("Bing connection unavailable".to_string()),
                }),
            ),
        ]));
        let orch = orchestrator(&client, PollPolicy::default());

        let outcome = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(!outcome.success);
        let error = outcome.error.clone().unwrap_or_default();
        assert!(error.contains("Bing connection unavailable"));
        assert!(!outcome.thread_id.is_empty());
        assert!(!outcome.run_id.is_empty());
        assert!(outcome.citations.is_none());
        // No extraction after a failed run.
        assert_eq!(client.calls().list_messages, 0);
    }

    #[test_case::test_case(RunStatus::Cancelled ; "cancelled")]
    #[test_case::test_case(RunStatus::Expired ; "expired")]
    #[test_case::test_case(RunStatus::Incomplete ; "incomplete")]
    #[tokio::test(start_paused = true)]
    async fn test_other_terminal_statuses_extract(status: RunStatus) {
        let client = Arc::new(
            ScriptedClient::new()
                .with_statuses(&[status])
                .with_messages(vec![agent_message("m", &["partial"], &[])]),
        );
        let orch = orchestrator(&client, PollPolicy::default());
        let outcome = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(outcome.success);
        assert_eq!(outcome.result, "partial");
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_thread_error_propagates() {
        let client = Arc::new(ScriptedClient::new().failing_on("create thread"));
        let orch = orchestrator(&client, PollPolicy::default());
        let err = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .err()
            .unwrap_or_else(|| unreachable!());

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(client.calls().create_run, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_agent_fails_before_thread() {
        let client = Arc::new(ScriptedClient::new().failing_on("get agent"));
        let orch = orchestrator(&client, PollPolicy::default());
        let result = orch.query("asst_missing", "q", &CancellationToken::new()).await;

        assert!(matches!(result, Err(SearchError::Remote { operation: "get agent", .. })));
        assert_eq!(client.calls().get_agent, 1);
        assert_eq!(client.calls().create_thread, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_run_error_propagates_without_retry() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_statuses(&[RunStatus::Queued, RunStatus::Completed])
                .failing_on("get run"),
        );
        let orch = orchestrator(&client, PollPolicy::default());
        let result = orch.query("asst_1", "q", &CancellationToken::new()).await;

        assert!(matches!(result, Err(SearchError::Remote { operation: "get run", .. })));
        assert_eq!(client.calls().get_run, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_polls_bound() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::InProgress]));
        let policy = PollPolicy {
            max_polls: Some(3),
            ..PollPolicy::default()
        };
        let orch = orchestrator(&client, policy);
        let err = orch
            .query("asst_1", "q", &CancellationToken::new())
            .await
            .err()
            .unwrap_or_else(|| unreachable!());

        assert!(matches!(err, SearchError::PollLimitExceeded { polls: 3, .. }));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(client.calls().get_run, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bound_counts_slept_time() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::Queued]));
        let policy = PollPolicy {
            interval: Duration::from_millis(500),
            max_polls: None,
            timeout: Some(Duration::from_secs(2)),
        };
        let orch = orchestrator(&client, policy);
        let result = orch.query("asst_1", "q", &CancellationToken::new()).await;

        assert!(matches!(result, Err(SearchError::PollLimitExceeded { polls: 4, .. })));
        assert_eq!(orch.sleeper.sleeps().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::Queued]));
        let orch = orchestrator(&client, PollPolicy::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orch
            .query("asst_1", "q", &cancel)
            .await
            .err()
            .unwrap_or_else(|| unreachable!());

        assert!(matches!(err, SearchError::Cancelled { ref run_id, .. } if !run_id.is_empty()));
        assert_eq!(client.calls().get_run, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bound_counts_slow_fetches() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_statuses(&[RunStatus::InProgress])
                .with_get_run_delay(Duration::from_secs(10)),
        );
        let policy = PollPolicy {
            interval: Duration::from_secs(1),
            max_polls: None,
            timeout: Some(Duration::from_secs(15)),
        };
        let orch = orchestrator(&client, policy);
        let started = Instant::now();
        let result = orch.query("asst_1", "q", &CancellationToken::new()).await;

        // 0s check, fetch ends at 11s, fetch ends at 22s, then the bound trips.
        assert!(matches!(result, Err(SearchError::PollLimitExceeded { polls: 2, .. })));
        assert_eq!(client.calls().get_run, 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(22) && elapsed < Duration::from_secs(23));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_bounded_by_timeout() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_statuses(&[RunStatus::Queued])
                .with_get_run_delay(Duration::from_millis(300)),
        );
        let policy = PollPolicy {
            interval: Duration::ZERO,
            max_polls: None,
            timeout: Some(Duration::from_secs(1)),
        };
        let orch = orchestrator(&client, policy);
        let result = orch.query("asst_1", "q", &CancellationToken::new()).await;

        assert!(matches!(result, Err(SearchError::PollLimitExceeded { polls: 4, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_while_sleeping_after_fetches() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::InProgress]));
        let cancel = CancellationToken::new();
        let sleeper = CancellingSleeper {
            token: cancel.clone(),
            cancel_on: 3,
            calls: AtomicUsize::new(0),
        };
        let orch = RunOrchestrator::with_sleeper(client.clone(), PollPolicy::default(), sleeper);

        let err = orch
            .query("asst_1", "q", &cancel)
            .await
            .err()
            .unwrap_or_else(|| unreachable!());

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(client.calls().get_run, 2);
        assert_eq!(client.calls().list_messages, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_queries_use_separate_threads() {
        let client = Arc::new(ScriptedClient::new().with_statuses(&[RunStatus::Completed]));
        let orch = orchestrator(&client, PollPolicy::default());
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(
            orch.query("asst_1", "first", &cancel),
            orch.query("asst_1", "second", &cancel)
        );
        let a = a.unwrap_or_else(|_| unreachable!());
        let b = b.unwrap_or_else(|_| unreachable!());
        assert_ne!(a.thread_id, b.thread_id);
        assert_eq!(client.calls().create_thread, 2);
    }
}
