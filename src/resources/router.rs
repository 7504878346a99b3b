//! Router route-table mutation under the keyed mutex.
//!
//! The API stores routes as a single list replaced wholesale on write.
//! Appending or removing one route is therefore GET-compute-PUT, and two
//! concurrent local mutations of the same router would drop each other's
//! change without the per-router lock.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, RemoteClient};

use super::{Provisioner, ResourceError};

const RESOURCE: &str = "routers";
const ROUTES_FIELD: &str = "routes";

/// One static route entry on a router.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Route {
    /// Destination CIDR.
    pub destination: String,
    /// Next-hop address.
    pub nexthop: String,
}

impl Route {
    /// Creates a route entry.
    #[must_use]
    pub fn new(destination: impl Into<String>, nexthop: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            nexthop: nexthop.into(),
        }
    }
}

impl<C: RemoteClient> Provisioner<C> {
    /// Appends one route to a router's route table. Idempotent: an entry
    /// already present is not duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the read, decode, or replacement
    /// write fails.
    pub async fn add_router_route(
        &self,
        router_id: &str,
        route: &Route,
    ) -> Result<(), ResourceError> {
        let _token = self.keyed.lock(router_id).await;
        let mut routes = self.current_routes(router_id).await?;
        if !routes.contains(route) {
            routes.push(route.clone());
        }
        self.put_routes(router_id, &routes).await
    }

    /// Removes one route from a router's route table. Removing an entry
    /// that is already absent is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the read, decode, or replacement
    /// write fails.
    pub async fn remove_router_route(
        &self,
        router_id: &str,
        route: &Route,
    ) -> Result<(), ResourceError> {
        let _token = self.keyed.lock(router_id).await;
        let mut routes = self.current_routes(router_id).await?;
        routes.retain(|existing| existing != route);
        self.put_routes(router_id, &routes).await
    }

    async fn current_routes(&self, router_id: &str) -> Result<Vec<Route>, ResourceError> {
        let object = self.fetch(RESOURCE, router_id).await?;
        let routes = match object.fields.get(ROUTES_FIELD) {
            Some(value @ Value::Array(_)) => serde_json::from_value(value.clone())
                .map_err(|err| {
                    ResourceError::Api(ApiError::Payload {
                        message: err.to_string(),
                    })
                })?,
            _ => Vec::new(),
        };
        Ok(routes)
    }

    async fn put_routes(&self, router_id: &str, routes: &[Route]) -> Result<(), ResourceError> {
        let entries = serde_json::to_value(routes)
            .map_err(|err| ResourceError::Validation(err.to_string()))?;
        let mut body = serde_json::Map::new();
        body.insert(ROUTES_FIELD.to_owned(), entries);
        self.client
            .update(RESOURCE, router_id, Value::Object(body))
            .await?;
        Ok(())
    }
}
