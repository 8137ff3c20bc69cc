//! Seed-host discovery engine.
//!
//! One discovery attempt walks the paginated instance inventory through a
//! borrowed [`ClientHandle`], applies the filter criteria page by page, and
//! returns the matching instances' addresses in provider order. An attempt
//! is all-or-nothing: any page-fetch failure abandons accumulated results so
//! the caller never sees a silently truncated membership list.

use crate::filter::FilterCriteria;
use crate::handle::ClientHandle;
use crate::models::{DescribeInstancesRequest, Instance, InstancePage};
use ecs_discovery_core::config::DEFAULT_PAGE_SIZE;
use ecs_discovery_core::ids::InstanceId;
use ecs_discovery_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// One candidate cluster member produced by a discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSeed {
    /// Instance the address belongs to.
    pub instance_id: InstanceId,
    /// Peer address handed to the membership layer.
    pub address: String,
}

/// Discovery engine bound to one client handle and one set of criteria.
///
/// Multiple engines (or concurrent calls on clones of one engine) may run
/// against the same handle; each attempt borrows the client independently.
#[derive(Clone)]
pub struct SeedDiscovery {
    handle: ClientHandle,
    criteria: FilterCriteria,
    page_size: u32,
}

impl SeedDiscovery {
    /// Create an engine over a client handle.
    #[must_use]
    pub fn new(handle: ClientHandle, criteria: FilterCriteria) -> Self {
        Self {
            handle,
            criteria,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the inventory page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run one discovery attempt.
    ///
    /// # Errors
    ///
    /// - [`ClientClosed`](ecs_discovery_core::Error::ClientClosed) when the
    ///   handle has already shut down.
    /// - [`ProviderUnavailable`](ecs_discovery_core::Error::ProviderUnavailable)
    ///   when any page fetch fails; partial results are discarded.
    /// - [`MalformedResponse`](ecs_discovery_core::Error::MalformedResponse)
    ///   when an instance violates the one-value-per-tag-key invariant.
    pub async fn discover(&self) -> Result<Vec<DiscoveredSeed>> {
        let borrow = self.handle.acquire()?;
        let attempt_id = Uuid::new_v4();
        let tag_filters = self.criteria.tag_filters();

        debug!(%attempt_id, page_size = self.page_size, "starting discovery attempt");

        let mut seeds = Vec::new();
        let mut page_number = 1u32;
        loop {
            let request = DescribeInstancesRequest::page(page_number, self.page_size)
                .with_tag_filters(tag_filters.clone());
            let page = borrow.inventory().describe_instances(request).await?;

            debug!(
                %attempt_id,
                page_number,
                instances = page.instances.len(),
                has_more = page.has_more,
                "fetched inventory page"
            );

            if page.instances.is_empty() {
                break;
            }
            self.collect_page(attempt_id, &page, &mut seeds)?;
            if !page.has_more {
                break;
            }
            page_number += 1;
        }

        debug!(%attempt_id, seeds = seeds.len(), "discovery attempt complete");
        Ok(seeds)
    }

    /// Release the underlying client at process teardown.
    ///
    /// Delegates to [`ClientHandle::request_shutdown`]; in-flight attempts
    /// finish normally and the client shuts down after the last of them
    /// releases its borrow.
    pub fn release_resources(&self) {
        self.handle.request_shutdown();
    }

    fn collect_page(
        &self,
        attempt_id: Uuid,
        page: &InstancePage,
        seeds: &mut Vec<DiscoveredSeed>,
    ) -> Result<()> {
        for instance in &page.instances {
            if !instance.status.is_running() {
                debug!(
                    %attempt_id,
                    instance_id = %instance.instance_id,
                    status = ?instance.status,
                    "instance skipped: not running"
                );
                continue;
            }

            let tag_map = instance.tag_map()?;
            if !self.criteria.matches(instance, &tag_map) {
                debug!(%attempt_id, instance_id = %instance.instance_id, "instance filtered");
                continue;
            }

            match seed_address(instance) {
                Some(address) => {
                    debug!(%attempt_id, instance_id = %instance.instance_id, %address, "instance added");
                    seeds.push(DiscoveredSeed {
                        instance_id: instance.instance_id.clone(),
                        address,
                    });
                }
                None => {
                    warn!(
                        %attempt_id,
                        instance_id = %instance.instance_id,
                        "instance matched filters but exposes no usable address"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Address preference: first private IP, then public IP, then elastic IP.
fn seed_address(instance: &Instance) -> Option<String> {
    instance
        .private_ip_addresses
        .first()
        .cloned()
        .or_else(|| instance.public_ip_address.clone())
        .or_else(|| instance.eip_address.clone())
}
