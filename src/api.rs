//! Remote client boundary for the cloud networking API.
//!
//! The core never talks HTTP directly; it consumes the minimal
//! [`RemoteClient`] contract so resource handlers and tests can substitute
//! scripted fakes for the real transport.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

mod error;
mod http;

pub use error::ApiError;
pub use http::HttpRemoteClient;

/// Future returned by remote client operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Snapshot of a remote object: an opaque identifier, the status label the
/// API reported for it, and the raw field bag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteObject {
    /// Opaque server-side identifier.
    pub id: String,
    /// Status label (for example `ACTIVE`, `BUILD`, `DOWN`). Empty when the
    /// resource type does not report one.
    pub status: String,
    /// Full field bag returned by the API.
    pub fields: Value,
}

impl RemoteObject {
    /// Builds a snapshot from a decoded response body, pulling `id` and
    /// `status` out of the field bag when present.
    #[must_use]
    pub fn from_fields(fields: Value) -> Self {
        let id = string_field(&fields, "id");
        let status = string_field(&fields, "status");
        Self { id, status, fields }
    }
}

fn string_field(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Minimal interface implemented by remote API clients.
///
/// `resource` names the collection path segment (for example `networks`,
/// `ports`, `routers`, `floatingips`). Mutations are full-document writes;
/// the API offers no element-level patch for list attributes.
pub trait RemoteClient: Send + Sync {
    /// Fetches a single object by identifier.
    fn get<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, RemoteObject>;

    /// Creates an object from the payload and returns the stored snapshot.
    fn create<'a>(&'a self, resource: &'a str, payload: Value) -> ApiFuture<'a, RemoteObject>;

    /// Replaces fields on an existing object and returns the stored snapshot.
    fn update<'a>(
        &'a self,
        resource: &'a str,
        id: &'a str,
        payload: Value,
    ) -> ApiFuture<'a, RemoteObject>;

    /// Deletes an object by identifier.
    fn delete<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, ()>;
}
