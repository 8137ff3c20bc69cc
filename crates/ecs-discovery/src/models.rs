//! Inventory data models shared by the client and the discovery engine.

use chrono::{DateTime, Utc};
use ecs_discovery_core::ids::{InstanceId, SecurityGroupId, ZoneId};
use ecs_discovery_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a compute instance.
///
/// Only [`Running`](InstanceStatus::Running) instances are eligible for
/// discovery. Statuses introduced by the provider after this crate was
/// written deserialize as [`Unknown`](InstanceStatus::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceStatus {
    /// Instance is running and reachable.
    Running,
    /// Instance is booting.
    Starting,
    /// Instance is shutting down.
    Stopping,
    /// Instance is stopped.
    Stopped,
    /// Any status this crate does not model.
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Returns true if the instance is eligible for discovery.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// One tag entry on an instance.
///
/// Tags arrive as a list; within one instance a key maps to at most one
/// value. A duplicate key is a contract violation of the inventory source,
/// surfaced by [`Instance::tag_map`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl InstanceTag {
    /// Create a tag entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Representation of a compute instance as returned by the inventory API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance identifier, unique within a region.
    pub instance_id: InstanceId,

    /// Lifecycle status.
    pub status: InstanceStatus,

    /// Private (VPC) IP addresses.
    #[serde(default)]
    pub private_ip_addresses: Vec<String>,

    /// Public IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,

    /// Elastic IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip_address: Option<String>,

    /// Availability zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ZoneId>,

    /// Security groups the instance belongs to.
    #[serde(default)]
    pub security_group_ids: Vec<SecurityGroupId>,

    /// Tag entries.
    #[serde(default)]
    pub tags: Vec<InstanceTag>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

impl Instance {
    /// Build the key → value map from the instance's tag list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the instance exposes two
    /// entries for the same key.
    pub fn tag_map(&self) -> Result<HashMap<String, String>> {
        let mut map = HashMap::with_capacity(self.tags.len());
        for tag in &self.tags {
            if map.insert(tag.key.clone(), tag.value.clone()).is_some() {
                return Err(Error::duplicate_tag(self.instance_id.as_str(), &tag.key));
            }
        }
        Ok(map)
    }
}

/// Server-side tag filter carried on a describe-instances request.
///
/// A `None` value requires key presence only; a concrete value narrows to
/// instances carrying that exact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// Tag key to filter on.
    pub key: String,
    /// Acceptable value, or `None` for presence-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One describe-instances request, addressing a single inventory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeInstancesRequest {
    /// 1-based page number.
    pub page_number: u32,
    /// Instances requested per page.
    pub page_size: u32,
    /// Server-side narrowing tag filters.
    pub tag_filters: Vec<TagFilter>,
}

impl DescribeInstancesRequest {
    /// Request for the given page with no tag filters.
    #[must_use]
    pub const fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            tag_filters: Vec::new(),
        }
    }

    /// Attach server-side tag filters.
    #[must_use]
    pub fn with_tag_filters(mut self, tag_filters: Vec<TagFilter>) -> Self {
        self.tag_filters = tag_filters;
        self
    }
}

/// One page of the instance inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePage {
    /// Provider request identifier, when returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Instance records, in provider order.
    #[serde(default)]
    pub instances: Vec<Instance>,

    /// True when further pages remain.
    #[serde(default)]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(id: &str, tags: Vec<InstanceTag>) -> Instance {
        Instance {
            instance_id: InstanceId::new(id),
            status: InstanceStatus::Running,
            private_ip_addresses: vec!["10.0.0.1".to_string()],
            public_ip_address: None,
            eip_address: None,
            zone_id: None,
            security_group_ids: Vec::new(),
            tags,
            creation_time: None,
        }
    }

    #[test]
    fn instance_deserialize_basic() {
        let parsed: Instance = serde_json::from_value(json!({
            "instance_id": "i-bp1a",
            "status": "Running",
            "private_ip_addresses": ["10.0.0.1"],
            "zone_id": "cn-hangzhou-b",
            "security_group_ids": ["sg-1"],
            "tags": [{"key": "role", "value": "master"}]
        }))
        .unwrap();

        assert_eq!(parsed.instance_id.as_str(), "i-bp1a");
        assert!(parsed.status.is_running());
        assert_eq!(parsed.private_ip_addresses, vec!["10.0.0.1"]);
        assert_eq!(parsed.tags.len(), 1);
    }

    #[test]
    fn instance_status_unknown_catch_all() {
        let parsed: InstanceStatus = serde_json::from_value(json!("Migrating")).unwrap();
        assert_eq!(parsed, InstanceStatus::Unknown);
        assert!(!parsed.is_running());
    }

    #[test]
    fn tag_map_collects_entries() {
        let inst = instance(
            "i-1",
            vec![
                InstanceTag::new("role", "master"),
                InstanceTag::new("env", "prod"),
            ],
        );

        let map = inst.tag_map().unwrap();
        assert_eq!(map.get("role").map(String::as_str), Some("master"));
        assert_eq!(map.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn tag_map_rejects_duplicate_key() {
        let inst = instance(
            "i-dup",
            vec![
                InstanceTag::new("role", "master"),
                InstanceTag::new("role", "data"),
            ],
        );

        let err = inst.tag_map().unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
        assert!(err.to_string().contains("i-dup"));
    }

    #[test]
    fn page_deserialize_defaults() {
        let page: InstancePage = serde_json::from_value(json!({
            "instances": []
        }))
        .unwrap();

        assert!(page.instances.is_empty());
        assert!(!page.has_more);
        assert!(page.request_id.is_none());
    }

    #[test]
    fn request_builder() {
        let request = DescribeInstancesRequest::page(2, 50).with_tag_filters(vec![TagFilter {
            key: "role".to_string(),
            value: Some("master".to_string()),
        }]);

        assert_eq!(request.page_number, 2);
        assert_eq!(request.page_size, 50);
        assert_eq!(request.tag_filters.len(), 1);
    }
}
