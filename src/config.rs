//! Configuration for the remote networking API and poll tuning.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_INITIAL_DELAY_SECS: u64 = 1;
const DEFAULT_MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Connection settings for the remote networking API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the networking API (for example
    /// `https://network.example.com/v2.0`).
    pub endpoint: String,
    /// Bearer token presented on every request.
    pub token: String,
    /// Optional region segment appended to the endpoint path.
    pub region: Option<String>,
    /// Convergence poll tuning applied to lifecycle waits.
    #[serde(default)]
    pub poll: PollTuning,
}

impl ApiConfig {
    /// Validates the configuration, returning a descriptive error when a
    /// required field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `endpoint` or `token` is
    /// empty after trimming, or when a supplied `region` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(&self.endpoint, "endpoint")?;
        Self::require_field(&self.token, "token")?;
        if let Some(region) = self.region.as_deref() {
            Self::require_field(region, "region")?;
        }
        Ok(())
    }

    /// Returns the endpoint with the optional region segment applied.
    #[must_use]
    pub fn base_url(&self) -> String {
        let trimmed = self.endpoint.trim_end_matches('/');
        self.region.as_deref().map_or_else(
            || trimmed.to_owned(),
            |region| format!("{trimmed}/{region}"),
        )
    }

    fn require_field(value: &str, name: &'static str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(name));
        }
        Ok(())
    }
}

/// Timing knobs for convergence polling.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct PollTuning {
    /// Upper bound on a single convergence wait, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sleep before the first poll, in seconds.
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    /// Smallest pause between consecutive polls, in seconds.
    #[serde(default = "default_min_poll_interval_secs")]
    pub min_poll_interval_secs: u64,
}

impl PollTuning {
    /// Convergence wait timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial pre-poll delay as a [`Duration`].
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// Minimum poll interval as a [`Duration`].
    #[must_use]
    pub const fn min_poll_interval(&self) -> Duration {
        Duration::from_secs(self.min_poll_interval_secs)
    }
}

impl Default for PollTuning {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            min_poll_interval_secs: DEFAULT_MIN_POLL_INTERVAL_SECS,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_initial_delay_secs() -> u64 {
    DEFAULT_INITIAL_DELAY_SECS
}

const fn default_min_poll_interval_secs() -> u64 {
    DEFAULT_MIN_POLL_INTERVAL_SECS
}

/// Errors raised while validating configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Raised when a required field is missing or blank.
    #[error("missing or empty configuration field: {0}")]
    MissingField(&'static str),
}
