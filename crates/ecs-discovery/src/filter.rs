//! Filter criteria deciding which instances count as cluster members.

use crate::models::{Instance, TagFilter};
use ecs_discovery_core::ids::{SecurityGroupId, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Criteria applied to every instance of one discovery attempt.
///
/// Tag constraints combine with AND semantics across keys and OR semantics
/// within a key's value set; an empty value set requires key presence only.
/// Zone and security-group constraints are additional AND-ed predicates.
/// Criteria are immutable for the duration of an attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Required tag keys, each with its set of acceptable values.
    #[serde(default)]
    pub tags: BTreeMap<String, BTreeSet<String>>,

    /// Exact-match availability zone constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ZoneId>,

    /// Security groups; an instance matches when it belongs to any of them.
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupId>,
}

impl FilterCriteria {
    /// Criteria matching every running instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a tag key to be present, with any value.
    #[must_use]
    pub fn require_tag(mut self, key: impl Into<String>) -> Self {
        self.tags.entry(key.into()).or_default();
        self
    }

    /// Require a tag key to carry one of the accumulated values.
    #[must_use]
    pub fn require_tag_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.entry(key.into()).or_default().insert(value.into());
        self
    }

    /// Restrict matches to one availability zone.
    #[must_use]
    pub fn with_zone(mut self, zone_id: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    /// Add a security group to the acceptable set.
    #[must_use]
    pub fn with_security_group(mut self, group: impl Into<SecurityGroupId>) -> Self {
        self.security_groups.push(group.into());
        self
    }

    /// Evaluate the criteria against one instance.
    ///
    /// `tag_map` is the instance's key → value map, prebuilt by the caller
    /// so that a malformed tag list is rejected before matching starts.
    /// Lifecycle status is not consulted here; non-running instances are
    /// excluded before tag matching is attempted.
    #[must_use]
    pub fn matches(&self, instance: &Instance, tag_map: &HashMap<String, String>) -> bool {
        for (key, accepted) in &self.tags {
            let Some(value) = tag_map.get(key) else {
                return false;
            };
            if !accepted.is_empty() && !accepted.contains(value) {
                return false;
            }
        }

        if let Some(zone_id) = &self.zone_id {
            if instance.zone_id.as_ref() != Some(zone_id) {
                return false;
            }
        }

        if !self.security_groups.is_empty()
            && !self
                .security_groups
                .iter()
                .any(|group| instance.security_group_ids.contains(group))
        {
            return false;
        }

        true
    }

    /// Render the tag constraints as server-side request filters.
    ///
    /// Presence-only keys become a key-only filter; value sets produce one
    /// filter per value.
    #[must_use]
    pub fn tag_filters(&self) -> Vec<TagFilter> {
        let mut filters = Vec::new();
        for (key, values) in &self.tags {
            if values.is_empty() {
                filters.push(TagFilter {
                    key: key.clone(),
                    value: None,
                });
            } else {
                for value in values {
                    filters.push(TagFilter {
                        key: key.clone(),
                        value: Some(value.clone()),
                    });
                }
            }
        }
        filters
    }

    /// Returns true when no constraint is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.zone_id.is_none() && self.security_groups.is_empty()
    }
}
