//! Bounded polling of long-running provider operations.
//!
//! Each attempt sleeps one interval and then checks the status once, so an
//! operation that reports pending N times and then done costs exactly N+1
//! status checks. An error reported by the operation, or a failed status
//! check, stops the loop at once.

use async_trait::async_trait;
use sellwise_core::config::PollSettings;
use sellwise_core::error::TaskError;
use sellwise_core::media::DataUri;
use sellwise_core::model::{Credential, GenerativeModel, OperationHandle, OperationStatus};
use std::time::Duration;

/// Suspends the poll loop between status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Interval and upper bound for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_polls: u32) -> Self {
        Self {
            interval,
            max_polls,
        }
    }

    /// Worst-case time spent sleeping before giving up. Saturates at
    /// `Duration::MAX`.
    pub fn ceiling(&self) -> Duration {
        self.interval
            .checked_mul(self.max_polls)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollSettings::default().into()
    }
}

impl From<PollSettings> for PollPolicy {
    fn from(settings: PollSettings) -> Self {
        Self::new(settings.interval(), settings.max_polls)
    }
}

/// Polls `handle` until it finishes, fails, or `policy.max_polls` is reached.
pub async fn poll_operation(
    model: &dyn GenerativeModel,
    credential: &Credential,
    handle: &OperationHandle,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<DataUri, TaskError> {
    tracing::debug!(
        "[Poller] Polling {} every {:?}, giving up after {:?}",
        handle.as_str(),
        policy.interval,
        policy.ceiling()
    );

    for attempt in 1..=policy.max_polls {
        sleeper.sleep(policy.interval).await;

        let status = model.poll_operation(credential, handle).await.map_err(|err| {
            tracing::warn!(
                "[Poller] Status check {} for {} failed: {}",
                attempt,
                handle.as_str(),
                err
            );
            TaskError::from(err)
        })?;

        match status {
            OperationStatus::Pending => {
                tracing::debug!(
                    "[Poller] {} still pending after check {}/{}",
                    handle.as_str(),
                    attempt,
                    policy.max_polls
                );
            }
            OperationStatus::Done(Some(media)) => {
                tracing::debug!(
                    "[Poller] {} finished after {} checks ({})",
                    handle.as_str(),
                    attempt,
                    media.mime_type()
                );
                return Ok(media);
            }
            OperationStatus::Done(None) => {
                return Err(TaskError::empty_result(
                    "the operation finished without producing any media",
                ));
            }
            OperationStatus::Failed(message) => {
                return Err(TaskError::upstream(format!(
                    "the operation reported an error: {message}"
                )));
            }
        }
    }

    Err(TaskError::upstream(format!(
        "operation did not complete after {} polls",
        policy.max_polls
    )))
}
