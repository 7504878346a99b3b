//! Convergence polling for asynchronous remote mutations.
//!
//! A just-issued create or delete leaves the remote object in a pending
//! state; [`wait`] polls a caller-supplied closure until the object reaches
//! a target label, reaches a label outside both sets (terminal failure), or
//! the timeout elapses. The closure owns the response shape: each resource
//! handler adapts its own status field into a bare label, so the poller
//! never needs to understand per-type payloads.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::sleep;

use crate::api::ApiError;
use crate::classify::{RetryDecision, classify};

/// Label substituted when a poll observes a not-found error. Deletion waits
/// include it in their target set.
pub const DELETED_LABEL: &str = "DELETED";

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Immutable configuration for one convergence wait.
///
/// One spec instance describes one lifecycle transition; create and delete
/// waits carry different target sets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollSpec {
    /// Labels considered in-flight; observing one keeps the wait polling.
    pub pending: BTreeSet<String>,
    /// Labels considered converged success.
    pub target: BTreeSet<String>,
    /// Upper bound on the whole wait.
    pub timeout: Duration,
    /// Sleep applied once before the first poll.
    pub initial_delay: Duration,
    /// Smallest pause between consecutive polls.
    pub min_poll_interval: Duration,
}

impl PollSpec {
    /// Starts a builder for a [`PollSpec`].
    #[must_use]
    pub fn builder() -> PollSpecBuilder {
        PollSpecBuilder::default()
    }

    /// Validates the spec.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidSpec`] when the target set is empty or
    /// the timeout is zero.
    pub fn validate(&self) -> Result<(), WaitError> {
        if self.target.is_empty() {
            return Err(WaitError::InvalidSpec("empty target label set"));
        }
        if self.timeout.is_zero() {
            return Err(WaitError::InvalidSpec("zero timeout"));
        }
        Ok(())
    }
}

/// Builder for [`PollSpec`] accepting free-form label lists.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PollSpecBuilder {
    pending: BTreeSet<String>,
    target: BTreeSet<String>,
    timeout: Duration,
    initial_delay: Duration,
    min_poll_interval: Duration,
}

impl PollSpecBuilder {
    /// Sets the pending label set.
    #[must_use]
    pub fn pending<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the target label set.
    #[must_use]
    pub fn target<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the overall timeout.
    #[must_use]
    pub const fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Sets the delay applied before the first poll.
    #[must_use]
    pub const fn initial_delay(mut self, value: Duration) -> Self {
        self.initial_delay = value;
        self
    }

    /// Sets the minimum pause between polls.
    #[must_use]
    pub const fn min_poll_interval(mut self, value: Duration) -> Self {
        self.min_poll_interval = value;
        self
    }

    /// Builds and validates the [`PollSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidSpec`] when the target set is empty or
    /// the timeout is zero.
    pub fn build(self) -> Result<PollSpec, WaitError> {
        let spec = PollSpec {
            pending: self.pending,
            target: self.target,
            timeout: self.timeout,
            initial_delay: self.initial_delay,
            min_poll_interval: self.min_poll_interval,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Errors surfaced by [`wait`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    /// Raised when the poll spec is unusable.
    #[error("invalid poll spec: {0}")]
    InvalidSpec(&'static str),
    /// Raised when a poll fails with a non-NotFound remote error. The wait
    /// aborts on the first such error; transient retry is the remote
    /// client's or allocation loop's concern, not the poller's.
    #[error("polling failed: {0}")]
    Poll(#[source] ApiError),
    /// Raised on the first observation of a label outside both the pending
    /// and target sets.
    #[error("resource reached unexpected terminal state {label:?}")]
    UnexpectedState {
        /// The offending status label.
        label: String,
    },
    /// Raised when the timeout elapses before a target label is observed.
    /// Distinct from [`WaitError::UnexpectedState`]: the object may still
    /// be converging, or actively resisting convergence (still in use).
    #[error("{}", timeout_message(.last, .detail))]
    Timeout {
        /// Last label observed before the deadline, if any.
        last: Option<String>,
        /// Caller-supplied context, such as a conflict reason accumulated
        /// during a failed deletion.
        detail: Option<String>,
    },
}

impl WaitError {
    /// Attaches caller context to a [`WaitError::Timeout`]; other variants
    /// pass through unchanged.
    #[must_use]
    pub fn with_detail(self, context: impl Into<String>) -> Self {
        match self {
            Self::Timeout { last, .. } => Self::Timeout {
                last,
                detail: Some(context.into()),
            },
            other => other,
        }
    }
}

fn timeout_message(last: &Option<String>, detail: &Option<String>) -> String {
    let mut message = String::from("timed out waiting for a target state");
    if let Some(label) = last.as_deref() {
        message.push_str(&format!(" (last observed: {label})"));
    }
    if let Some(context) = detail.as_deref() {
        message.push_str(&format!(": {context}"));
    }
    message
}

/// Polls `poll_once` until the returned label lands in `spec.target`.
///
/// A not-found error from `poll_once` is reported as [`DELETED_LABEL`];
/// deletion waits list it as a target. The wait is abandoned promptly when
/// the returned future is dropped (for example inside `tokio::select!`),
/// without issuing further polls.
///
/// # Errors
///
/// Returns [`WaitError::Poll`] on the first non-NotFound poll error,
/// [`WaitError::UnexpectedState`] on the first label outside both sets, and
/// [`WaitError::Timeout`] when `spec.timeout` elapses first.
pub async fn wait<F, Fut>(spec: &PollSpec, mut poll_once: F) -> Result<String, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    spec.validate()?;
    let deadline = Instant::now() + spec.timeout;
    sleep(spec.initial_delay).await;

    let mut last: Option<String> = None;
    let mut previous_pause = spec.initial_delay;

    loop {
        if Instant::now() > deadline {
            return Err(WaitError::Timeout { last, detail: None });
        }

        let label = match poll_once().await {
            Ok(label) => label,
            Err(err) if classify(&err) == RetryDecision::NotFound => DELETED_LABEL.to_owned(),
            Err(err) => return Err(WaitError::Poll(err)),
        };

        if spec.target.contains(&label) {
            return Ok(label);
        }
        if !spec.pending.contains(&label) {
            return Err(WaitError::UnexpectedState { label });
        }

        last = Some(label);
        let pause = next_pause(previous_pause, spec.min_poll_interval);
        previous_pause = pause;
        sleep(pause).await;
    }
}

/// Doubles the previous pause, floored at the spec minimum and capped so a
/// long wait does not back off past [`MAX_POLL_INTERVAL`].
fn next_pause(previous: Duration, floor: Duration) -> Duration {
    previous
        .saturating_mul(2)
        .max(floor)
        .min(MAX_POLL_INTERVAL)
}
