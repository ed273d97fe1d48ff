//! Bounded status polling
//!
//! After a delete or update request the control plane converges in the
//! background. [`poll_until`] re-fetches the remote status on a fixed tick and
//! stops on the first terminal event:
//!
//! - the caller cancels ([`CloudError::Cancelled`])
//! - the overall timeout elapses ([`CloudError::Timeout`])
//! - the MFA confirmation timeout elapses while approval is still pending
//!   ([`CloudError::ConfirmationTimeout`])
//! - the fetch reports not-found ([`PollOutcome::Gone`])
//! - the status carries a fatal error ([`CloudError::RemoteFatal`])
//! - the status satisfies the check ([`PollOutcome::Satisfied`])

use crate::error::{CloudError, RemoteIssue, Result, WaitKind};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Decides what a fetched status means for the wait.
pub trait StatusCheck<S> {
    /// The target condition has been reached.
    fn is_satisfied(&self, status: &S) -> bool;

    /// Errors that end the wait. Empty means keep going.
    fn fatal_issues(&self, _status: &S) -> Vec<RemoteIssue> {
        Vec::new()
    }

    /// A manual approval (MFA) is still outstanding.
    fn awaiting_confirmation(&self, _status: &S) -> bool {
        false
    }
}

/// Timing and messaging for one poll.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub kind: WaitKind,

    /// Hard upper bound for the whole wait
    pub timeout: Duration,

    /// Upper bound while a manual confirmation is pending
    pub confirmation_timeout: Option<Duration>,

    /// Delay between status fetches
    pub interval: Duration,

    /// Confirmation flag reported by the mutating request
    pub pending_confirmation: bool,
}

impl PollOptions {
    pub fn deletion(timeout: Duration, interval: Duration) -> Self {
        Self {
            kind: WaitKind::Deletion,
            timeout,
            confirmation_timeout: None,
            interval,
            pending_confirmation: false,
        }
    }

    pub fn spec_revision(timeout: Duration, interval: Duration) -> Self {
        Self {
            kind: WaitKind::SpecRevision,
            timeout,
            confirmation_timeout: None,
            interval,
            pending_confirmation: false,
        }
    }

    /// Arm the confirmation timer. It only runs while `pending` holds.
    pub fn with_confirmation(mut self, timeout: Duration, pending: bool) -> Self {
        self.confirmation_timeout = Some(timeout);
        self.pending_confirmation = pending;
        self
    }
}

/// Successful end of a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<S> {
    /// The status satisfied the check
    Satisfied(S),
    /// The remote object no longer exists
    Gone,
}

impl<S> PollOutcome<S> {
    pub fn into_status(self) -> Option<S> {
        match self {
            PollOutcome::Satisfied(status) => Some(status),
            PollOutcome::Gone => None,
        }
    }
}

/// Poll `fetch` until `check` is satisfied or a terminal event fires.
///
/// The first fetch happens immediately. Fetches never overlap: the next tick
/// is only awaited once the previous fetch returned. A fetch already in
/// flight when `cancel` fires runs to completion and its result is dropped.
///
/// The confirmation timer starts with the poll when `pending_confirmation` is
/// set, and restarts whenever a status raises the pending flag again after it
/// had cleared. A zero `interval` is rejected with
/// [`CloudError::InvalidConfig`].
pub async fn poll_until<S, C, F, Fut>(
    cancel: &CancellationToken,
    options: &PollOptions,
    check: &C,
    mut fetch: F,
) -> Result<PollOutcome<S>>
where
    C: StatusCheck<S> + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S>>,
{
    if options.interval.is_zero() {
        return Err(CloudError::invalid_config("poll interval must be greater than zero"));
    }

    let started = Instant::now();
    let armed = options.confirmation_timeout.is_some();
    let mut pending = armed && options.pending_confirmation;

    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let deadline = tokio::time::sleep(options.timeout);
    tokio::pin!(deadline);

    let confirmation_deadline =
        tokio::time::sleep(options.confirmation_timeout.unwrap_or(options.timeout));
    tokio::pin!(confirmation_deadline);

    let mut attempt = 0u32;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(kind = %options.kind, attempt, "Poll cancelled");
                return Err(CloudError::Cancelled);
            }

            _ = &mut deadline => {
                tracing::warn!(
                    kind = %options.kind,
                    attempt,
                    timeout_secs = options.timeout.as_secs(),
                    "Poll timed out"
                );
                return Err(CloudError::Timeout(options.kind));
            }

            _ = &mut confirmation_deadline, if pending => {
                tracing::warn!(kind = %options.kind, attempt, "MFA confirmation timed out");
                return Err(CloudError::ConfirmationTimeout);
            }

            _ = ticker.tick() => {
                attempt += 1;
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                tracing::debug!(kind = %options.kind, attempt, elapsed_ms, "Polling remote status");

                let status = match fetch().await {
                    Ok(status) => status,
                    Err(e) if e.is_not_found() => {
                        tracing::info!(kind = %options.kind, attempt, "Remote object is gone");
                        return Ok(PollOutcome::Gone);
                    }
                    Err(CloudError::FetchFailed(message)) => {
                        return Err(CloudError::FetchFailed(message));
                    }
                    Err(e) => return Err(CloudError::FetchFailed(e.to_string())),
                };

                let issues = check.fatal_issues(&status);
                if !issues.is_empty() {
                    return Err(CloudError::RemoteFatal(issues));
                }

                if check.is_satisfied(&status) {
                    tracing::info!(kind = %options.kind, attempt, "Wait condition satisfied");
                    return Ok(PollOutcome::Satisfied(status));
                }

                let still_pending = armed && check.awaiting_confirmation(&status);
                if pending && !still_pending {
                    tracing::info!(kind = %options.kind, "MFA confirmation received");
                }
                if !pending && still_pending {
                    if let Some(timeout) = options.confirmation_timeout {
                        tracing::info!(kind = %options.kind, attempt, "MFA confirmation requested");
                        confirmation_deadline.as_mut().reset(Instant::now() + timeout);
                    }
                }
                pending = still_pending;
            }
        }
    }
}
