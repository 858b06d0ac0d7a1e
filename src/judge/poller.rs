use crate::judge::model::PollError;
use crate::sandbox::client::backoff_delay;
use crate::sandbox::{JobHandle, JobSnapshot, Sandbox, SandboxError};
use log::{info, warn};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Waits for a sandbox job to reach a terminal status.
///
/// Every poll, successful or not, spends one attempt from the budget. A failed
/// poll is retried after a backoff instead of ending the wait; only a malformed
/// response ends it early.
#[derive(Debug, Clone)]
pub struct JobPoller {
    interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Plain interval while the sandbox answers, backoff capped at 8x after failures.
    fn delay_before_poll(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            self.interval
        } else {
            backoff_delay(
                self.interval,
                consecutive_failures,
                self.interval.saturating_mul(8),
            )
        }
    }

    pub async fn await_completion(
        &self,
        sandbox: &dyn Sandbox,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<JobSnapshot, PollError> {
        let mut last_error: Option<String> = None;
        let mut consecutive_failures = 0u32;

        for attempt in 1..=self.max_attempts {
            let delay = self.delay_before_poll(consecutive_failures);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                _ = sleep(delay) => {}
            }

            match sandbox.fetch(handle).await {
                Ok(snapshot) if snapshot.status.is_terminal() => {
                    info!(
                        "✓ job finished [{}]: {:?} ({}) after {} polls",
                        handle, snapshot.status, snapshot.description, attempt
                    );
                    return Ok(snapshot);
                }
                Ok(snapshot) => {
                    consecutive_failures = 0;
                    if attempt % 5 == 0 {
                        info!(
                            "... job [{}] still {:?} (polled {} times)",
                            handle, snapshot.status, attempt
                        );
                    }
                }
                Err(SandboxError::Transport(msg)) => {
                    consecutive_failures += 1;
                    warn!(
                        "⚠ poll failed [{}] ({}/{}): {}",
                        handle, attempt, self.max_attempts, msg
                    );
                    last_error = Some(msg);
                }
                Err(e) => return Err(PollError::Protocol(e.to_string())),
            }
        }

        warn!(
            "✗ job [{}] not finished after {} polls",
            handle, self.max_attempts
        );
        Err(PollError::Timeout {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
