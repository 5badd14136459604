// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline-bounded polling with cancellation.
//!
//! [`poll_until`] drives a check until it reports a terminal value, the
//! deadline passes, or the cancellation token fires. Check errors are treated
//! as transient and retried after a backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Timing policy for one polling session.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wait between checks while the job is still pending.
    pub interval: Duration,
    /// Wait after a failed check.
    pub retry_backoff: Duration,
    /// Absolute point after which no further check is issued.
    pub deadline: Instant,
}

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut,
    Cancelled,
}

/// Poll `check` until it yields `Some`, the deadline passes, or `cancel` fires.
///
/// The deadline is tested before every check, and a check still in flight at
/// the deadline is abandoned. Sleeps are clamped to the remaining budget.
pub async fn poll_until<T, E, F, Fut>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut check: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        if Instant::now() >= policy.deadline {
            return PollOutcome::TimedOut;
        }

        attempt += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = tokio::time::timeout_at(policy.deadline, check()) => result,
        };

        let wait = match result {
            Err(_elapsed) => return PollOutcome::TimedOut,
            Ok(Ok(Some(value))) => return PollOutcome::Ready(value),
            Ok(Ok(None)) => {
                debug!(attempt, "still pending");
                policy.interval
            }
            Ok(Err(e)) => {
                warn!(attempt, error = %e, "poll failed, backing off");
                policy.retry_backoff
            }
        };

        let now = Instant::now();
        if now >= policy.deadline {
            return PollOutcome::TimedOut;
        }
        let wait = wait.min(policy.deadline - now);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(wait) => {}
        }
    }
}
