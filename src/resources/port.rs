//! Port security-group membership reconciliation.
//!
//! One port's security groups may be managed by more than one local unit,
//! and other tooling can attach groups of its own. Updates therefore go
//! through the keyed mutex and the non-destructive reconciler.

use std::collections::BTreeSet;

use crate::api::RemoteClient;

use super::{Provisioner, ResourceError};

const RESOURCE: &str = "ports";
const GROUPS_FIELD: &str = "security_groups";

impl<C: RemoteClient> Provisioner<C> {
    /// Replaces this tool's security-group contribution on a port,
    /// preserving memberships attached by other actors. Returns the full
    /// set that was written.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the fresh read or the replacement
    /// write fails.
    pub async fn sync_port_security_groups(
        &self,
        port_id: &str,
        desired_previous: &BTreeSet<String>,
        desired_new: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        self.sync_membership(RESOURCE, port_id, GROUPS_FIELD, desired_previous, desired_new)
            .await
    }

    /// Returns the subset of `desired` groups currently attached to the
    /// port. A result smaller than `desired` means a membership was removed
    /// out-of-band; callers narrow their stored desired set accordingly.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the read fails.
    pub async fn read_port_security_groups(
        &self,
        port_id: &str,
        desired: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        self.read_membership(RESOURCE, port_id, GROUPS_FIELD, desired)
            .await
    }

    /// Deletes a port and waits until it disappears.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on a fatal delete failure or when the
    /// object never disappears.
    pub async fn delete_port(&self, port_id: &str) -> Result<(), ResourceError> {
        self.delete_with_convergence(RESOURCE, port_id).await
    }
}
