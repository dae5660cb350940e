//! Run polling policy and the sleep abstraction used between status checks.

use std::time::Duration;

use async_trait::async_trait;

/// How the orchestrator waits for a run to reach a terminal status.
///
/// Both bounds default to `None`, in which case polling continues until the
/// platform reports a terminal status or the caller cancels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status fetches.
    pub interval: Duration,
    /// Maximum number of status fetches after the run is created.
    pub max_polls: Option<u32>,
    /// Maximum wall-clock time spent polling, request time included.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: None,
            timeout: None,
        }
    }
}

impl PollPolicy {
    /// Returns `true` if another fetch is allowed after `polls` fetches and
    /// `elapsed` time since polling began.
    #[must_use]
    pub fn allows(&self, polls: u32, elapsed: Duration) -> bool {
        let under_count = self.max_polls.is_none_or(|max| polls < max);
        let under_time = self.timeout.is_none_or(|max| elapsed < max);
        under_count && under_time
    }
}

/// Suspends the current task between status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
