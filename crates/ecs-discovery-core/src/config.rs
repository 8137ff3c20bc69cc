//! Configuration for the ECS inventory client.
//!
//! One configuration describes one provider client: endpoint, region,
//! credentials, and the paging/timeout knobs used by discovery attempts.

use crate::ids::RegionId;
use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of instances requested per inventory page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Configuration for one ECS inventory client.
///
/// A client is constructed once per (credentials, region) pair and shared by
/// all discovery attempts through a [`ClientHandle`](https://docs.rs/ecs-discovery)
/// until the owning process releases it.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EcsClientConfig {
    /// Inventory gateway base URL
    #[validate(url)]
    pub endpoint: String,

    /// Region whose inventory is queried
    pub region_id: RegionId,

    /// Access key identifier
    pub access_key_id: String,

    /// Access key secret. Never serialized.
    #[serde(skip_serializing)]
    pub access_key_secret: SecretString,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Instances requested per inventory page
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl EcsClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or validation
    /// fails.
    pub fn new(
        endpoint: impl Into<String>,
        region_id: impl Into<RegionId>,
        access_key_id: impl Into<String>,
        access_key_secret: SecretString,
    ) -> Result<Self, Error> {
        let config = Self {
            endpoint: endpoint.into(),
            region_id: region_id.into(),
            access_key_id: access_key_id.into(),
            access_key_secret,
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the number of instances requested per page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be parsed.
    pub fn parse_endpoint(&self) -> Result<Url, Error> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::ConfigError(format!("Invalid endpoint URL: {e}")))
    }
}
