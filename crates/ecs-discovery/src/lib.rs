//! # ecs-discovery
//!
//! ECS inventory client and seed-host discovery for cluster membership.
//!
//! Queries a cloud provider's compute-instance inventory, filters instances
//! by tags, zone, and security groups, and hands the matching instances'
//! addresses to a membership layer. The provider client is shared across
//! concurrent discovery attempts through a reference-counted handle and is
//! shut down exactly once, after the last borrower releases it.
//!
//! ## Modules
//!
//! - [`models`] - Inventory wire model (instances, tags, pages)
//! - [`provider`] - Injectable inventory capability trait
//! - [`client`] - Concrete HTTP inventory client
//! - [`handle`] - Reference-counted client lifecycle
//! - [`filter`] - Tag/zone/security-group matching criteria
//! - [`seeds`] - The discovery engine
//! - [`service`] - Lazy process-level client ownership

#![deny(missing_docs)]

pub mod client;
pub mod filter;
pub mod handle;
pub mod models;
pub mod provider;
pub mod seeds;
pub mod service;

pub use client::{EcsClient, EcsClientBuilder};
pub use filter::FilterCriteria;
pub use handle::{ClientBorrow, ClientHandle};
pub use models::{
    DescribeInstancesRequest, Instance, InstancePage, InstanceStatus, InstanceTag, TagFilter,
};
pub use provider::InstanceInventory;
pub use seeds::{DiscoveredSeed, SeedDiscovery};
pub use service::EcsService;

/// Convenient result alias that reuses the shared discovery error type.
pub type Result<T> = ecs_discovery_core::Result<T>;
