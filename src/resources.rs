//! Resource handlers that drive the core primitives.
//!
//! One file per resource type, each an `impl` block on [`Provisioner`]:
//! networks (lifecycle convergence and tag reconciliation), ports
//! (security-group membership), routers (route-list read-modify-write
//! under the keyed mutex), and floating IPs (candidate-subnet allocation).

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use thiserror::Error;

use crate::alloc::AllocError;
use crate::api::{ApiError, RemoteClient, RemoteObject};
use crate::attrs::{reconcile_for_read, reconcile_for_write};
use crate::classify::{RetryDecision, classify};
use crate::config::PollTuning;
use crate::keyed::KeyedMutex;
use crate::waiter::{DELETED_LABEL, PollSpec, WaitError, wait};

mod floatingip;
mod network;
mod port;
mod router;

pub use floatingip::FloatingIpRequest;
pub use network::NetworkRequest;
pub use router::Route;

const LABEL_ACTIVE: &str = "ACTIVE";
const LABEL_BUILD: &str = "BUILD";
const LABEL_DOWN: &str = "DOWN";

/// Errors surfaced by resource handlers.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResourceError {
    /// Raised when a remote call fails fatally.
    #[error("remote API error: {0}")]
    Api(#[from] ApiError),
    /// Raised when a convergence wait fails or times out.
    #[error("convergence failed: {0}")]
    Wait(#[from] WaitError),
    /// Raised when candidate allocation fails.
    #[error("allocation failed: {0}")]
    Alloc(#[from] AllocError),
    /// Raised when a request is missing a required field.
    #[error("invalid request: {0}")]
    Validation(String),
}

/// Drives resource lifecycles against a remote client.
///
/// Holds the keyed mutex shared by every operation issued through this
/// value, so concurrent local mutations of the same remote object
/// serialise correctly. Clone-shared via `Arc` by callers running
/// operations concurrently.
#[derive(Debug)]
pub struct Provisioner<C> {
    client: C,
    keyed: KeyedMutex,
    tuning: PollTuning,
}

impl<C: RemoteClient> Provisioner<C> {
    /// Constructs a provisioner over the given client and poll tuning.
    #[must_use]
    pub fn new(client: C, tuning: PollTuning) -> Self {
        Self {
            client,
            keyed: KeyedMutex::new(),
            tuning,
        }
    }

    /// Spec for creation waits: `BUILD` is in-flight; `ACTIVE` and `DOWN`
    /// both count as success ("created but administratively down").
    fn create_spec(&self) -> Result<PollSpec, WaitError> {
        PollSpec::builder()
            .pending([LABEL_BUILD])
            .target([LABEL_ACTIVE, LABEL_DOWN])
            .timeout(self.tuning.timeout())
            .initial_delay(self.tuning.initial_delay())
            .min_poll_interval(self.tuning.min_poll_interval())
            .build()
    }

    /// Spec for deletion waits: any live label is in-flight and the
    /// not-found sentinel is the sole target.
    fn delete_spec(&self) -> Result<PollSpec, WaitError> {
        PollSpec::builder()
            .pending([LABEL_ACTIVE, LABEL_BUILD, LABEL_DOWN])
            .target([DELETED_LABEL])
            .timeout(self.tuning.timeout())
            .initial_delay(self.tuning.initial_delay())
            .min_poll_interval(self.tuning.min_poll_interval())
            .build()
    }

    /// One fresh remote read reduced to a status label.
    async fn poll_status(&self, resource: &str, id: &str) -> Result<String, ApiError> {
        let object = self.client.get(resource, id).await?;
        Ok(object.status)
    }

    async fn fetch(&self, resource: &str, id: &str) -> Result<RemoteObject, ApiError> {
        self.client.get(resource, id).await
    }

    /// Issues a delete and waits until the object disappears.
    ///
    /// A conflict on the initial delete (object still in use) is remembered
    /// and the delete is re-attempted on every poll; if the wait times out
    /// the most recent conflict reason is attached to the timeout error.
    async fn delete_with_convergence(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<(), ResourceError> {
        let conflict: Mutex<Option<String>> = Mutex::new(None);

        match self.client.delete(resource, id).await {
            Ok(()) => {}
            Err(err) => match classify(&err) {
                RetryDecision::NotFound => return Ok(()),
                RetryDecision::Retryable => record_conflict(&conflict, &err),
                RetryDecision::Fatal => return Err(err.into()),
            },
        }

        let spec = self.delete_spec()?;
        match wait(&spec, || self.poll_delete(resource, id, &conflict)).await {
            Ok(_) => Ok(()),
            Err(err @ WaitError::Timeout { .. }) => {
                let detail = conflict
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                match detail {
                    Some(reason) => Err(err.with_detail(reason).into()),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Poll step for deletion: observe the object, and while it is still
    /// present re-attempt the delete, keeping the newest conflict reason.
    async fn poll_delete(
        &self,
        resource: &str,
        id: &str,
        conflict: &Mutex<Option<String>>,
    ) -> Result<String, ApiError> {
        let object = self.client.get(resource, id).await?;
        if let Err(err) = self.client.delete(resource, id).await {
            record_conflict(conflict, &err);
            if classify(&err) == RetryDecision::Fatal {
                return Err(err);
            }
        }
        Ok(object.status)
    }

    /// Full-replacement write of a set-valued attribute under the keyed
    /// mutex, preserving elements contributed by other actors.
    ///
    /// The observed set is read fresh inside the critical section; caching
    /// it across operations would break the reconciliation subtraction.
    async fn sync_membership(
        &self,
        resource: &str,
        id: &str,
        field: &str,
        desired_previous: &BTreeSet<String>,
        desired_new: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        let _token = self.keyed.lock(id).await;
        let object = self.fetch(resource, id).await?;
        let observed = string_set(&object.fields, field);
        let next = reconcile_for_write(&observed, desired_previous, desired_new);
        self.client
            .update(resource, id, set_payload(field, &next))
            .await?;
        Ok(next)
    }

    /// Reads back the subset of `desired` currently present remotely so the
    /// caller can narrow its stored desired set when elements were removed
    /// out-of-band.
    async fn read_membership(
        &self,
        resource: &str,
        id: &str,
        field: &str,
        desired: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        let object = self.fetch(resource, id).await?;
        let observed = string_set(&object.fields, field);
        Ok(reconcile_for_read(&observed, desired))
    }
}

fn record_conflict(slot: &Mutex<Option<String>>, err: &ApiError) {
    if let ApiError::Conflict { message } = err {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.clone());
    }
}

/// Builds a one-field full-replacement payload for a set-valued attribute.
fn set_payload(field: &str, values: &BTreeSet<String>) -> Value {
    let items: Vec<Value> = values
        .iter()
        .map(|value| Value::String(value.clone()))
        .collect();
    let mut body = serde_json::Map::new();
    body.insert(field.to_owned(), Value::Array(items));
    Value::Object(body)
}

/// Extracts a string array field as a set, treating absent or non-array
/// values as empty.
fn string_set(fields: &Value, key: &str) -> BTreeSet<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
