//! Network lifecycle and tag reconciliation.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::api::{RemoteClient, RemoteObject};
use crate::waiter::wait;

use super::{Provisioner, ResourceError};

const RESOURCE: &str = "networks";
const TAGS_FIELD: &str = "tags";

/// Parameters for creating a network.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkRequest {
    /// Optional display name; a unique one is generated when absent.
    pub name: Option<String>,
    /// Whether the network starts administratively up.
    pub admin_state_up: bool,
    /// Tags applied at creation.
    pub tags: BTreeSet<String>,
}

impl NetworkRequest {
    /// Creates a request with administrative state up and no tags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            admin_state_up: true,
            tags: BTreeSet::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    /// Sets the administrative state.
    #[must_use]
    pub const fn admin_state_up(mut self, value: bool) -> Self {
        self.admin_state_up = value;
        self
    }

    /// Sets the creation tags.
    #[must_use]
    pub fn tags<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = values.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Serialize)]
struct CreateNetworkPayload {
    name: String,
    admin_state_up: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    tags: BTreeSet<String>,
}

impl<C: RemoteClient> Provisioner<C> {
    /// Creates a network and waits for it to converge.
    ///
    /// `ACTIVE` and `DOWN` both count as converged: a network created
    /// administratively down is still successfully created. Returns a fresh
    /// read-back of the converged object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the create call fails, the wait
    /// observes an unexpected terminal state, or the timeout elapses.
    pub async fn create_network(
        &self,
        request: &NetworkRequest,
    ) -> Result<RemoteObject, ResourceError> {
        let payload = CreateNetworkPayload {
            name: request
                .name
                .clone()
                .unwrap_or_else(|| format!("net-{}", Uuid::new_v4().simple())),
            admin_state_up: request.admin_state_up,
            tags: request.tags.clone(),
        };
        let body = serde_json::to_value(&payload)
            .map_err(|err| ResourceError::Validation(err.to_string()))?;
        let created = self.client.create(RESOURCE, body).await?;

        let spec = self.create_spec()?;
        wait(&spec, || self.poll_status(RESOURCE, &created.id)).await?;
        Ok(self.fetch(RESOURCE, &created.id).await?)
    }

    /// Deletes a network and waits until it disappears.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on a fatal delete failure or when the
    /// object never disappears; a timeout carries the last observed
    /// conflict reason when the network was still in use.
    pub async fn delete_network(&self, id: &str) -> Result<(), ResourceError> {
        self.delete_with_convergence(RESOURCE, id).await
    }

    /// Replaces this tool's tag contribution on a network, preserving tags
    /// added by other actors. Returns the full set that was written.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the fresh read or the replacement
    /// write fails.
    pub async fn set_network_tags(
        &self,
        id: &str,
        desired_previous: &BTreeSet<String>,
        desired_new: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        self.sync_membership(RESOURCE, id, TAGS_FIELD, desired_previous, desired_new)
            .await
    }

    /// Returns the subset of `desired` tags currently present on the
    /// network, for out-of-band drift detection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the read fails.
    pub async fn read_network_tags(
        &self,
        id: &str,
        desired: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ResourceError> {
        self.read_membership(RESOURCE, id, TAGS_FIELD, desired).await
    }
}
