//! `reqwest` implementation of the remote client contract.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::config::{ApiConfig, ConfigError};

use super::{ApiError, ApiFuture, RemoteClient, RemoteObject};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote client backed by an HTTP connection to the networking API.
#[derive(Clone, Debug)]
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl HttpRemoteClient {
    /// Constructs a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the configuration fails
    /// validation.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Ok(Self {
            http,
            base: config.base_url(),
            token: config.token.clone(),
        })
    }

    fn url(&self, resource: &str, id: Option<&str>) -> String {
        id.map_or_else(
            || format!("{}/{resource}", self.base),
            |value| format!("{}/{resource}/{value}", self.base),
        )
    }

    async fn dispatch(
        &self,
        method: Method,
        resource: &str,
        id: Option<&str>,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(resource, id);
        let mut request = self
            .http
            .request(method, &url)
            .header("X-Auth-Token", &self.token);
        if let Some(body) = payload {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|err| ApiError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| ApiError::Transport {
            message: err.to_string(),
        })?;

        if status.is_success() {
            if status == StatusCode::NO_CONTENT || body.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&body).map_err(|err| ApiError::Payload {
                message: err.to_string(),
            });
        }

        let message = String::from_utf8_lossy(&body).into_owned();
        Err(ApiError::from_status(
            status.as_u16(),
            resource,
            id.unwrap_or_default(),
            message,
        ))
    }
}

impl RemoteClient for HttpRemoteClient {
    fn get<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let fields = self.dispatch(Method::GET, resource, Some(id), None).await?;
            Ok(RemoteObject::from_fields(fields))
        })
    }

    fn create<'a>(&'a self, resource: &'a str, payload: Value) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let fields = self
                .dispatch(Method::POST, resource, None, Some(payload))
                .await?;
            Ok(RemoteObject::from_fields(fields))
        })
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        id: &'a str,
        payload: Value,
    ) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let fields = self
                .dispatch(Method::PUT, resource, Some(id), Some(payload))
                .await?;
            Ok(RemoteObject::from_fields(fields))
        })
    }

    fn delete<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.dispatch(Method::DELETE, resource, Some(id), None)
                .await?;
            Ok(())
        })
    }
}
