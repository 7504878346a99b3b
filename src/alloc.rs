//! Ordered-candidate allocation with classify-driven retry.
//!
//! Some allocations can be satisfied by any of several parameter values
//! (for example candidate subnets for a floating IP). Each attempt is an
//! atomic remote create; a retryable failure moves on to the next
//! candidate, anything else aborts the loop immediately.

use std::future::Future;

use thiserror::Error;

use crate::api::ApiError;
use crate::classify::{RetryDecision, classify};

/// Errors surfaced by [`try_candidates`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AllocError {
    /// Raised when the candidate sequence is empty.
    #[error("no candidates to try")]
    NoCandidates,
    /// Raised when an attempt fails with a fatal or not-found error; no
    /// further candidates are tried.
    #[error("allocation aborted after {attempts} attempt(s): {source}")]
    Aborted {
        /// Number of candidates attempted, including the failing one.
        attempts: usize,
        /// The error that aborted the loop.
        #[source]
        source: ApiError,
    },
    /// Raised when every candidate failed with a retryable error.
    #[error("all {attempts} candidate(s) exhausted; last error: {source}")]
    Exhausted {
        /// Number of candidates attempted.
        attempts: usize,
        /// The final attempt's error.
        #[source]
        source: ApiError,
    },
}

/// Attempts `attempt` against each candidate in order, returning the first
/// success.
///
/// Retryable errors (per [`classify`]) advance to the next candidate while
/// remembering the most recent failure; fatal and not-found errors abort
/// immediately. A single-element sequence still gets exactly one attempt.
///
/// # Errors
///
/// Returns [`AllocError::NoCandidates`] for an empty sequence,
/// [`AllocError::Aborted`] on the first fatal/not-found failure, and
/// [`AllocError::Exhausted`] when every candidate failed retryably.
pub async fn try_candidates<T, R, F, Fut>(
    candidates: &[T],
    mut attempt: F,
) -> Result<R, AllocError>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<R, ApiError>>,
{
    let mut last_error: Option<ApiError> = None;
    let mut attempts = 0_usize;

    for candidate in candidates {
        attempts += 1;
        match attempt(candidate).await {
            Ok(result) => return Ok(result),
            Err(err) => match classify(&err) {
                RetryDecision::Retryable => last_error = Some(err),
                RetryDecision::Fatal | RetryDecision::NotFound => {
                    return Err(AllocError::Aborted {
                        attempts,
                        source: err,
                    });
                }
            },
        }
    }

    last_error.map_or(Err(AllocError::NoCandidates), |source| {
        Err(AllocError::Exhausted { attempts, source })
    })
}
