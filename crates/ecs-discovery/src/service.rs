//! Process-level ownership of the inventory client.
//!
//! One [`EcsService`] lives for the lifetime of the consuming process. The
//! expensive provider client is constructed lazily, on the first discovery
//! attempt, once per (credentials, region) configuration, and released at
//! process teardown through [`release_resources`](EcsService::release_resources).

use crate::client::EcsClient;
use crate::filter::FilterCriteria;
use crate::handle::ClientHandle;
use crate::seeds::SeedDiscovery;
use ecs_discovery_core::config::EcsClientConfig;
use ecs_discovery_core::Result;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Owner of the lazily-constructed inventory client handle.
pub struct EcsService {
    config: EcsClientConfig,
    handle: OnceLock<ClientHandle>,
}

impl EcsService {
    /// Create a service over a validated configuration.
    ///
    /// No provider client is constructed until the first call to
    /// [`handle`](EcsService::handle) or
    /// [`discovery`](EcsService::discovery).
    #[must_use]
    pub const fn new(config: EcsClientConfig) -> Self {
        Self {
            config,
            handle: OnceLock::new(),
        }
    }

    /// Return the shared client handle, constructing the client on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed from the
    /// configuration.
    pub fn handle(&self) -> Result<ClientHandle> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle.clone());
        }

        // Two first-time callers may race here; the loser's client is
        // dropped without ever having been shared.
        let client = EcsClient::from_config(&self.config)?;
        let handle = self.handle.get_or_init(|| {
            debug!(region_id = %self.config.region_id, "constructed inventory client");
            ClientHandle::new(Arc::new(client))
        });
        Ok(handle.clone())
    }

    /// Create a discovery engine bound to this service's client handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed from the
    /// configuration.
    pub fn discovery(&self, criteria: FilterCriteria) -> Result<SeedDiscovery> {
        Ok(SeedDiscovery::new(self.handle()?, criteria).with_page_size(self.config.page_size))
    }

    /// Release the inventory client at process teardown.
    ///
    /// In-flight discovery attempts finish normally; the client shuts down
    /// when the last of them releases its borrow. Does nothing if no
    /// discovery attempt ever ran.
    pub fn release_resources(&self) {
        if let Some(handle) = self.handle.get() {
            handle.request_shutdown();
        }
    }
}
