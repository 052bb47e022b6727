//! Hubitat Maker API client.
//!
//! Fetches full details for every device the Maker API app exposes via the
//! `all` endpoint:
//!
//! ```text
//! GET <maker_api>/all?access_token=<token>
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use hubwatch::hub::{DeviceSource, HubClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HubClient::builder()
//!         .endpoint("http://192.168.1.10/apps/api/7/devices")
//!         .access_token("0e4a...")
//!         .build()?;
//!
//!     for device in client.fetch_devices().await? {
//!         println!("{} ({} attributes)", device.label, device.attributes.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{Device, DeviceSource};
use crate::config::HubConfig;
use crate::error::{ConfigError, HubError};

/// HTTP client for the Maker API.
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    endpoint: String,
    access_token: String,
    /// Request URL with the token redacted, for logs.
    description: String,
}

impl HubClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HubClientBuilder {
        HubClientBuilder::default()
    }

    /// Build a client from the process configuration.
    pub fn from_config(config: &HubConfig) -> Result<Self, ConfigError> {
        let mut builder = Self::builder()
            .endpoint(&config.maker_api)
            .access_token(&config.access_token);
        if let Some(timeout) = config.timeout()? {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// The `all` endpoint, without the query string.
    pub fn all_url(&self) -> String {
        format!("{}/all", self.endpoint)
    }
}

impl fmt::Debug for HubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubClient")
            .field("url", &self.description)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DeviceSource for HubClient {
    async fn fetch_devices(&self) -> Result<Vec<Device>, HubError> {
        debug!("Scraping {}", self.description);

        let response = self
            .client
            .get(self.all_url())
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(HubError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HubError::Body(e.without_url().to_string()))?;
        debug!(bytes = body.len(), "JSON bytes returned");

        let devices: Vec<Device> =
            serde_json::from_slice(&body).map_err(|e| HubError::Parse(e.to_string()))?;
        debug!(devices = devices.len(), "Parsed device info");

        Ok(devices)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HubClient.
#[derive(Debug, Default)]
pub struct HubClientBuilder {
    endpoint: Option<String>,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

impl HubClientBuilder {
    /// Set the Maker API device endpoint (e.g., "http://hub.local/apps/api/7/devices").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the Maker API access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the request timeout (default: none).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HubClient, ConfigError> {
        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost/apps/api/1/devices".to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("{}/all?access_token=<redacted>", endpoint);

        Ok(HubClient {
            client,
            endpoint,
            access_token: self.access_token.unwrap_or_default(),
            description,
        })
    }
}
