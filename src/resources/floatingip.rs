//! Floating IP allocation over candidate subnets.
//!
//! A pool network may span several subnets and any one of them can be out
//! of addresses; allocation walks the caller's ordered candidate list and
//! lets the retry classifier decide whether a failure is worth moving past.

use serde::Serialize;

use crate::alloc::try_candidates;
use crate::api::{RemoteClient, RemoteObject};
use crate::waiter::{PollSpec, wait};

use super::{LABEL_ACTIVE, LABEL_DOWN, Provisioner, ResourceError};

const RESOURCE: &str = "floatingips";

/// Parameters for allocating a floating IP.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FloatingIpRequest {
    /// Pool network to allocate from.
    pub floating_network_id: String,
    /// Ordered subnets to try; empty lets the API choose.
    pub candidate_subnets: Vec<String>,
    /// Optional description stored on the allocation.
    pub description: Option<String>,
}

impl FloatingIpRequest {
    /// Creates a request for the given pool network.
    #[must_use]
    pub fn new(floating_network_id: impl Into<String>) -> Self {
        Self {
            floating_network_id: floating_network_id.into(),
            candidate_subnets: Vec::new(),
            description: None,
        }
    }

    /// Sets the ordered candidate subnets.
    #[must_use]
    pub fn candidate_subnets<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_subnets = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    fn validate(&self) -> Result<(), ResourceError> {
        if self.floating_network_id.trim().is_empty() {
            return Err(ResourceError::Validation(String::from(
                "missing or empty field: floating_network_id",
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CreateFloatingIpPayload<'a> {
    floating_network_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subnet_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<C: RemoteClient> Provisioner<C> {
    /// Allocates a floating IP, trying each candidate subnet in order.
    ///
    /// With no candidates the API picks a subnet itself. Floating IPs
    /// surface `ACTIVE` or `DOWN` as soon as they exist, so the
    /// post-allocation wait degenerates to a single status check.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when validation fails, every candidate is
    /// exhausted, an attempt fails fatally, or the allocation surfaces an
    /// unexpected status.
    pub async fn allocate_floating_ip(
        &self,
        request: &FloatingIpRequest,
    ) -> Result<RemoteObject, ResourceError> {
        request.validate()?;

        let created = if request.candidate_subnets.is_empty() {
            let body = floating_ip_body(request, None)?;
            self.client.create(RESOURCE, body).await?
        } else {
            try_candidates(&request.candidate_subnets, |subnet| {
                let payload = floating_ip_body(request, Some(subnet.as_str()));
                async move {
                    match payload {
                        Ok(body) => self.client.create(RESOURCE, body).await,
                        Err(err) => Err(err),
                    }
                }
            })
            .await?
        };

        let spec = PollSpec::builder()
            .target([LABEL_ACTIVE, LABEL_DOWN])
            .timeout(self.tuning.timeout())
            .min_poll_interval(self.tuning.min_poll_interval())
            .build()?;
        wait(&spec, || self.poll_status(RESOURCE, &created.id)).await?;
        Ok(self.fetch(RESOURCE, &created.id).await?)
    }

    /// Releases a floating IP and waits until it disappears.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on a fatal delete failure or when the
    /// allocation never disappears.
    pub async fn release_floating_ip(&self, id: &str) -> Result<(), ResourceError> {
        self.delete_with_convergence(RESOURCE, id).await
    }
}

fn floating_ip_body(
    request: &FloatingIpRequest,
    subnet: Option<&str>,
) -> Result<serde_json::Value, crate::api::ApiError> {
    serde_json::to_value(CreateFloatingIpPayload {
        floating_network_id: &request.floating_network_id,
        subnet_id: subnet,
        description: request.description.as_deref(),
    })
    .map_err(|err| crate::api::ApiError::Payload {
        message: err.to_string(),
    })
}
