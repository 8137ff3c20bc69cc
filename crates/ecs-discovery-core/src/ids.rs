//! Strongly-typed identifier wrappers for ECS resources.
//!
//! ECS identifiers (`i-...`, `cn-hangzhou-b`, `sg-...`) are opaque strings.
//! Wrapping each kind in its own type prevents identifier mix-ups at compile
//! time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate strongly-typed string identifier wrapper types.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner [`String`].
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Generate all identifier types
string_id!(InstanceId, "Compute instance identifier");
string_id!(RegionId, "Region identifier");
string_id!(ZoneId, "Availability zone identifier");
string_id!(SecurityGroupId, "Security group identifier");
