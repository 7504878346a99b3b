//! Core reconciliation primitives for provisioning cloud networking
//! resources against an eventually-consistent REST API.
//!
//! The crate centres on four cross-cutting pieces that make per-resource
//! glue correct in the presence of asynchronous infrastructure and
//! concurrent external mutation: a convergence poller ([`waiter`]), a
//! non-destructive attribute reconciler ([`attrs`]), a single retry
//! classifier ([`classify`]) shared by the candidate allocation loop
//! ([`alloc`]), and a per-key mutex ([`keyed`]) serialising
//! read-modify-write sequences. [`resources`] carries the handlers that
//! drive these primitives through the [`api`] client boundary.

pub mod alloc;
pub mod api;
pub mod attrs;
pub mod classify;
pub mod config;
pub mod keyed;
pub mod resources;
pub mod test_support;
pub mod waiter;

pub use alloc::{AllocError, try_candidates};
pub use api::{ApiError, ApiFuture, HttpRemoteClient, RemoteClient, RemoteObject};
pub use attrs::{reconcile_for_read, reconcile_for_write};
pub use classify::{RetryDecision, classify};
pub use config::{ApiConfig, ConfigError, PollTuning};
pub use keyed::{KeyedMutex, LockToken};
pub use resources::{
    FloatingIpRequest, NetworkRequest, Provisioner, ResourceError, Route,
};
pub use waiter::{DELETED_LABEL, PollSpec, PollSpecBuilder, WaitError, wait};
