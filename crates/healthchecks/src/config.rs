//! Configuration for the healthchecks client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Hosted management API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://healthchecks.io/api/v1/";

/// Environment variable holding the project API key.
pub const API_KEY_ENV: &str = "HEALTHCHECKSIO_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "HEALTHCHECKSIO_BASE_URL";
/// Environment variable overriding the request timeout (e.g. `30s`).
pub const TIMEOUT_ENV: &str = "HEALTHCHECKSIO_TIMEOUT";

/// Configuration for the `HealthchecksClient`.
#[derive(Clone, Serialize, Deserialize)]
pub struct HealthchecksConfig {
    /// Base URL of the management API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Project API key, sent as `X-Api-Key`.
    #[serde(default)]
    pub api_key: String,

    /// Timeout applied to every request.
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
}

impl std::fmt::Debug for HealthchecksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthchecksConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for HealthchecksConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl HealthchecksConfig {
    /// Create a new config with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse the base URL, adding a trailing slash so endpoint paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a present value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(API_KEY_ENV) {
            config.api_key = key;
        }

        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            Url::parse(&url).map_err(|e| {
                Error::config_error(format!("failed parsing {BASE_URL_ENV} '{url}': {e}"))
            })?;
            config.base_url = url;
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            config.timeout = humantime::parse_duration(&timeout).map_err(|e| {
                Error::config_error(format!("failed parsing {TIMEOUT_ENV} '{timeout}': {e}"))
            })?;
        }

        Ok(config)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
