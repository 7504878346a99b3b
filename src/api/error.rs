//! Typed errors for the remote client boundary.
//!
//! Every failure carries a structured kind so retry classification can
//! pattern-match without inspecting message text.

use thiserror::Error;

/// Errors returned by a [`RemoteClient`](crate::api::RemoteClient).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised when the remote object does not exist (HTTP 404).
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource collection that was queried (for example `networks`).
        resource: String,
        /// Identifier that was not found.
        id: String,
    },
    /// Raised when the remote API reports a conflict (HTTP 409), typically
    /// because the object is still in use.
    #[error("conflict: {message}")]
    Conflict {
        /// Conflict reason reported by the API.
        message: String,
    },
    /// Raised when the remote API throttles the caller (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimited {
        /// Throttling detail reported by the API.
        message: String,
    },
    /// Raised on an internal server error (HTTP 500).
    #[error("server error: {message}")]
    ServerError {
        /// Failure detail reported by the API.
        message: String,
    },
    /// Raised when the service is temporarily unavailable (HTTP 503).
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Availability detail reported by the API.
        message: String,
    },
    /// Raised for any other non-success HTTP status.
    #[error("unexpected status {code}: {message}")]
    UnexpectedStatus {
        /// HTTP status code returned by the API.
        code: u16,
        /// Response body, if any.
        message: String,
    },
    /// Raised when the request never produced an HTTP response.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying transport failure description.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("malformed response payload: {message}")]
    Payload {
        /// Decoder error description.
        message: String,
    },
}

impl ApiError {
    /// Builds a [`ApiError::NotFound`] for the given collection and id.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Maps a non-success HTTP status and body to the matching error kind.
    #[must_use]
    pub fn from_status(code: u16, resource: &str, id: &str, message: String) -> Self {
        match code {
            404 => Self::not_found(resource, id),
            409 => Self::Conflict { message },
            429 => Self::RateLimited { message },
            500 => Self::ServerError { message },
            503 => Self::Unavailable { message },
            other => Self::UnexpectedStatus {
                code: other,
                message,
            },
        }
    }
}
