//! Error types for ECS discovery operations.
//!
//! The three discovery-path errors (`ClientClosed`, `ProviderUnavailable`,
//! `MalformedResponse`) are deliberately distinct so callers can decide
//! between retrying an attempt, aborting, or provisioning a new client
//! handle. They are never collapsed into a generic failure.

use thiserror::Error;

/// Main error type for ECS discovery operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A borrow was attempted after client shutdown began. The handle is
    /// unusable; a new one must be constructed if discovery is still needed.
    #[error("Client handle is closed")]
    ClientClosed,

    /// Transport, authentication, or rate-limit failure surfaced from a page
    /// fetch. The whole discovery attempt may be retried with backoff.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider returned data violating the inventory data model.
    /// Fatal for the attempt, never silently coerced.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for ECS discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ClientClosed => "CLIENT_CLOSED",
            Self::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true if the failed discovery attempt may be retried as a
    /// whole. Only provider-side unavailability qualifies; a closed handle
    /// requires a new handle and malformed data requires operator attention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    /// Malformed-response error for an instance exposing two tag entries
    /// with the same key.
    #[must_use]
    pub fn duplicate_tag(instance_id: &str, key: &str) -> Self {
        Self::MalformedResponse(format!(
            "instance `{instance_id}` carries duplicate entries for tag key `{key}`"
        ))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderUnavailable(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::ProviderUnavailable(format!("connection failed: {err}"))
        } else {
            Self::ProviderUnavailable(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}
