//! Retry classification of remote API errors.
//!
//! Retry eligibility is decided in exactly one place so the convergence
//! poller's callers and the candidate allocation loop cannot drift apart.
//! Classification matches only the structured error kind, never message
//! text, so it stays stable across API wording changes.

use crate::api::ApiError;

/// Outcome of classifying a remote error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
    /// The operation may be retried (conflict or transient server failure).
    Retryable,
    /// The operation must not be retried; surface the error immediately.
    Fatal,
    /// The remote object does not exist.
    NotFound,
}

/// Maps a typed remote error to a [`RetryDecision`].
///
/// 404 is [`RetryDecision::NotFound`]; 409, 500, and 503 are retryable, as
/// are unexpected-status responses wrapping 502 or 504. Every other shape,
/// including rate limiting and other 4xx codes, is fatal.
#[must_use]
pub fn classify(err: &ApiError) -> RetryDecision {
    match err {
        ApiError::NotFound { .. } => RetryDecision::NotFound,
        ApiError::Conflict { .. } | ApiError::ServerError { .. } | ApiError::Unavailable { .. } => {
            RetryDecision::Retryable
        }
        ApiError::UnexpectedStatus {
            code: 502 | 504, ..
        } => RetryDecision::Retryable,
        ApiError::RateLimited { .. }
        | ApiError::UnexpectedStatus { .. }
        | ApiError::Transport { .. }
        | ApiError::Payload { .. } => RetryDecision::Fatal,
    }
}
