// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Status-wait primitive.
//!
//! The remote service offers no push notifications; completion of a
//! long-running action is observed by re-reading its status. This module
//! provides the one wait loop the rest of the SDK builds on: deadline
//! bounded, cancellable, with exponential backoff and jitter between reads.
//!
//! A failed status read is not the same thing as "still pending". Reads carry
//! a consecutive-failure budget; when it is exhausted the last read error is
//! surfaced instead of looping forever against a dead endpoint. Likewise a
//! terminal failure status that differs from the target aborts the wait
//! immediately rather than polling until the deadline.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Result, SdkError};
use crate::types::{ActivityStatus, WorkspaceStatus};

/// Polling behavior for status waits.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the second and later reads. The first read happens
    /// immediately.
    pub interval: Duration,
    /// Multiplier applied to the delay after every read, up to
    /// `max_interval`.
    pub backoff: f64,
    /// Upper bound on the delay between reads.
    pub max_interval: Duration,
    /// Fraction of the delay randomized away (0.1 = ±10%).
    pub jitter: f64,
    /// Overall deadline for one wait.
    pub deadline: Duration,
    /// Consecutive failed reads tolerated before the wait gives up and
    /// surfaces the read error. A successful read resets the count.
    pub read_error_budget: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            backoff: 1.5,
            max_interval: Duration::from_secs(30),
            jitter: 0.1,
            deadline: Duration::from_secs(600),
            read_error_budget: 3,
        }
    }
}

impl PollConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the backoff multiplier.
    pub fn with_backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the maximum delay between reads.
    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Set the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the overall wait deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the consecutive read-error budget.
    pub fn with_read_error_budget(mut self, budget: u32) -> Self {
        self.read_error_budget = budget;
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        let grown = current.mul_f64(self.backoff.max(1.0));
        grown.min(self.max_interval)
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let spread = self.jitter.min(1.0);
        let factor = rand::thread_rng().gen_range(1.0 - spread..=1.0 + spread);
        delay.mul_f64(factor)
    }
}

/// A status value the wait primitive can compare and classify.
pub trait PollState: Copy + PartialEq + fmt::Debug + Send {
    /// Wire label of the status, for error messages.
    fn label(&self) -> &'static str;

    /// Whether the status is a terminal failure that can never transition
    /// to anything else.
    fn is_failure_state(&self) -> bool;
}

impl PollState for WorkspaceStatus {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn is_failure_state(&self) -> bool {
        self.is_failure()
    }
}

impl PollState for ActivityStatus {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn is_failure_state(&self) -> bool {
        self.is_failure()
    }
}

/// Repeatedly invoke `read` until it returns `target`.
///
/// The first read happens immediately, so a reader that already reports the
/// target costs exactly one remote call. Returns the matching status, or:
///
/// - [`SdkError::WaitFailed`] when a terminal failure status other than the
///   target is observed,
/// - [`SdkError::WaitTimeout`] when `config.deadline` elapses,
/// - the last read error when `config.read_error_budget` consecutive reads
///   fail,
/// - [`SdkError::Cancelled`] when `cancel` fires during a sleep.
pub async fn wait_for_status<S, R, Fut>(
    entity: &str,
    mut read: R,
    target: S,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<S>
where
    S: PollState,
    R: FnMut() -> Fut,
    Fut: Future<Output = Result<S>>,
{
    let started = Instant::now();
    let deadline = started + config.deadline;
    let mut delay = config.interval;
    let mut consecutive_errors: u32 = 0;

    loop {
        match read().await {
            Ok(status) if status == target => {
                debug!(entity, status = status.label(), "target status reached");
                return Ok(status);
            }
            Ok(status) if status.is_failure_state() => {
                return Err(SdkError::WaitFailed {
                    entity: entity.to_string(),
                    status: status.label().to_string(),
                });
            }
            Ok(status) => {
                consecutive_errors = 0;
                debug!(entity, status = status.label(), target = target.label(), "still waiting");
            }
            Err(err) => {
                consecutive_errors += 1;
                if consecutive_errors >= config.read_error_budget {
                    return Err(err);
                }
                warn!(entity, %err, attempt = consecutive_errors, "status read failed, retrying");
            }
        }

        // Sleep no further than the deadline, so a wait never reports a
        // timeout before the deadline has actually elapsed and cancellation
        // can still preempt the final sleep.
        let wake = (Instant::now() + config.apply_jitter(delay)).min(deadline);
        tokio::select! {
            _ = cancel.cancelled() => return Err(SdkError::Cancelled),
            _ = tokio::time::sleep_until(wake) => {}
        }
        if Instant::now() >= deadline {
            return Err(SdkError::WaitTimeout {
                entity: entity.to_string(),
                target: target.label().to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }

        delay = config.next_delay(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_growth_and_cap() {
        let config = PollConfig::new()
            .with_interval(Duration::from_secs(2))
            .with_backoff(2.0)
            .with_max_interval(Duration::from_secs(5));

        let d1 = config.next_delay(Duration::from_secs(2));
        assert_eq!(d1, Duration::from_secs(4));
        let d2 = config.next_delay(d1);
        assert_eq!(d2, Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_below_one_does_not_shrink() {
        let config = PollConfig::new().with_backoff(0.5);
        let d = config.next_delay(Duration::from_secs(2));
        assert_eq!(d, Duration::from_secs(2));
    }

    #[test]
    fn test_jitter_bounds() {
        let config = PollConfig::new().with_jitter(0.1);
        let base = Duration::from_secs(10);
        for _ in 0..100 {
            let jittered = config.apply_jitter(base);
            assert!(jittered >= Duration::from_secs(9));
            assert!(jittered <= Duration::from_secs(11));
        }
    }

    #[test]
    fn test_zero_jitter_is_identity() {
        let config = PollConfig::new().with_jitter(0.0);
        let base = Duration::from_millis(1234);
        assert_eq!(config.apply_jitter(base), base);
    }
}
