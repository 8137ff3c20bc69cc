//! Inventory provider abstraction.
//!
//! The discovery engine depends on this trait, not on a concrete provider
//! SDK type, so a deterministic test double can stand in for the real API.

use crate::models::{DescribeInstancesRequest, InstancePage};
use ecs_discovery_core::Result;

/// Capability to enumerate compute instances, one page at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InstanceInventory: Send + Sync {
    /// Fetch one page of the instance inventory.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderUnavailable`](ecs_discovery_core::Error::ProviderUnavailable)
    /// on transport, authentication, or rate-limit failure, and
    /// [`MalformedResponse`](ecs_discovery_core::Error::MalformedResponse)
    /// when the response cannot be decoded.
    async fn describe_instances(&self, request: DescribeInstancesRequest) -> Result<InstancePage>;

    /// Release resources held by the underlying client.
    ///
    /// Called exactly once, by the last borrower of the owning
    /// [`ClientHandle`](crate::handle::ClientHandle).
    fn shutdown(&self);
}
