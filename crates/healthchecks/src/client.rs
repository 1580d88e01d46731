//! Client for the healthchecks management API.
//!
//! This module provides the `HealthchecksClient` used to list notification
//! channels and to create, update, list and delete checks.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::config::HealthchecksConfig;
use crate::error::{Error, Result};
use crate::types::{ChannelList, CheckList, Healthcheck, HealthcheckChannel, HealthcheckResponse};

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the healthchecks management API.
#[derive(Debug, Clone)]
pub struct HealthchecksClient {
    /// Configuration for the client.
    config: Arc<HealthchecksConfig>,
    /// Parsed base URL, always ending in `/`.
    base_url: Url,
    /// HTTP client shared by every request.
    http_client: reqwest::Client,
}

impl HealthchecksClient {
    /// Create a new client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client cannot be built.
    pub fn with_config(config: HealthchecksConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
        })
    }

    /// Create a client for `api_key` against the given base URL.
    ///
    /// # Errors
    ///
    /// See [`HealthchecksClient::with_config`].
    pub fn with_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(HealthchecksConfig::with_api_key(api_key).base_url(base_url))
    }

    /// The client configuration.
    pub fn config(&self) -> &HealthchecksConfig {
        &self.config
    }

    /// List every notification channel in the project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn list_channels(&self) -> Result<Vec<HealthcheckChannel>> {
        let list: ChannelList = self.send_json(self.request(Method::GET, "channels/")?).await?;
        debug!(count = list.channels.len(), "fetched channels");
        Ok(list.channels)
    }

    /// List every check in the project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn list_checks(&self) -> Result<Vec<HealthcheckResponse>> {
        let list: CheckList = self.send_json(self.request(Method::GET, "checks/")?).await?;
        debug!(count = list.checks.len(), "fetched checks");
        Ok(list.checks)
    }

    /// Create a check, or update the existing one matched by `check.unique`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn create(&self, check: &Healthcheck) -> Result<HealthcheckResponse> {
        trace!(payload = ?check, "creating/updating check");
        let response: HealthcheckResponse = self
            .send_json(self.request(Method::POST, "checks/")?.json(check))
            .await?;
        debug!(id = %response.id(), name = %response.name, "created/updated check");
        Ok(response)
    }

    /// Delete the check with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with status 404 if no such check exists, and an error on
    /// any other failure.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::config_error("a check id is required for deletion"));
        }
        self.send(self.request(Method::DELETE, &format!("checks/{id}"))?)
            .await?;
        debug!(id, "deleted check");
        Ok(())
    }

    /// Build a request for `path` relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        trace!(%method, %url, "healthchecks request");
        Ok(self
            .http_client
            .request(method, url)
            .header(API_KEY_HEADER, &self.config.api_key))
    }

    /// Send a request and map non-success statuses to [`Error::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), %body, "healthchecks API error");
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(response)
    }

    /// Send a request and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
