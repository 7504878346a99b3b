//! Per-key mutual exclusion for read-modify-write sequences.
//!
//! Writes to list-valued remote attributes (router routes, port security
//! groups) are full replacements, so two local operations that both
//! GET-compute-PUT against the same object can drop each other's change.
//! A [`KeyedMutex`] serialises such sequences per remote object identifier
//! while leaving distinct objects fully concurrent. It offers no protection
//! against external actors mutating the same object; the remote API exposes
//! no optimistic-concurrency primitive that could close that gap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

/// Registry of lazily-created locks keyed by remote object identifier.
///
/// Clones share the same registry. Entries are never removed: the key space
/// is bounded by the distinct remote objects touched in a process lifetime,
/// not by request volume.
#[derive(Clone, Debug, Default)]
pub struct KeyedMutex {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Scoped ownership of one key's lock; released on drop on every exit path.
#[derive(Debug)]
pub struct LockToken {
    _guard: OwnedMutexGuard<()>,
}

impl KeyedMutex {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting until the current holder (if
    /// any) releases it.
    ///
    /// Re-entrant acquisition of the same key from the same logical
    /// operation deadlocks and is a caller bug; hold the token across the
    /// whole GET-compute-PUT sequence instead of re-locking.
    pub async fn lock(&self, key: &str) -> LockToken {
        let entry = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_owned()).or_default())
        };
        LockToken {
            _guard: entry.lock_owned().await,
        }
    }
}
