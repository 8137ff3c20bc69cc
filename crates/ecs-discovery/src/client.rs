//! Asynchronous ECS inventory client implementation.
//!
//! Speaks to an inventory gateway over HTTP. Request signing is the
//! gateway's concern; credentials travel as basic auth and the secret is
//! exposed only while a request is being built.

use crate::models::{DescribeInstancesRequest, InstancePage};
use crate::provider::InstanceInventory;
use async_trait::async_trait;
use ecs_discovery_core::client::HttpConfig;
use ecs_discovery_core::config::EcsClientConfig;
use ecs_discovery_core::ids::RegionId;
use ecs_discovery_core::query::QueryParams;
use ecs_discovery_core::{Error, Result};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("ecs-discovery/", env!("CARGO_PKG_VERSION"));

/// Builder for [`EcsClient`].
#[derive(Debug)]
pub struct EcsClientBuilder {
    endpoint: String,
    region_id: RegionId,
    access_key_id: String,
    access_key_secret: SecretString,
    http: HttpConfig,
}

impl EcsClientBuilder {
    /// Create a builder for the specified gateway endpoint and region.
    pub fn new(endpoint: impl Into<String>, region_id: impl Into<RegionId>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region_id: region_id.into(),
            access_key_id: String::new(),
            access_key_secret: SecretString::from(String::new()),
            http: HttpConfig::new(),
        }
    }

    /// Configure access credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        access_key_secret: SecretString,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.access_key_secret = access_key_secret;
        self
    }

    /// Override the HTTP transport configuration.
    #[must_use]
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<EcsClient> {
        let base_url = Url::parse(&self.endpoint)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.http.timeout)
            .pool_idle_timeout(self.http.pool_idle_timeout)
            .pool_max_idle_per_host(self.http.pool_max_idle_per_host)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to construct HTTP client: {e}")))?;

        Ok(EcsClient {
            http,
            base_url,
            region_id: self.region_id,
            access_key_id: self.access_key_id,
            access_key_secret: self.access_key_secret,
        })
    }
}

/// Asynchronous ECS inventory client.
#[derive(Clone)]
pub struct EcsClient {
    http: reqwest::Client,
    base_url: Url,
    region_id: RegionId,
    access_key_id: String,
    access_key_secret: SecretString,
}

impl EcsClient {
    /// Construct a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is invalid.
    pub fn from_config(config: &EcsClientConfig) -> Result<Self> {
        EcsClientBuilder::new(config.endpoint.clone(), config.region_id.clone())
            .with_credentials(
                config.access_key_id.clone(),
                config.access_key_secret.clone(),
            )
            .with_http_config(HttpConfig::new().with_timeout(config.timeout()))
            .build()
    }

    /// Return the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the region this client queries.
    #[must_use]
    pub fn region_id(&self) -> &RegionId {
        &self.region_id
    }

    async fn fetch_page(&self, request: &DescribeInstancesRequest) -> Result<InstancePage> {
        let url = self.base_url.join("instances")?;

        let mut params = QueryParams::new();
        params.push("region_id", &self.region_id);
        params.push("page_number", request.page_number);
        params.push("page_size", request.page_size);
        for (index, filter) in request.tag_filters.iter().enumerate() {
            params.push_indexed("tag", index + 1, "key", &filter.key);
            if let Some(value) = &filter.value {
                params.push_indexed("tag", index + 1, "value", value);
            }
        }

        let response = self
            .http
            .get(url)
            .query(&params.into_pairs())
            .basic_auth(
                &self.access_key_id,
                Some(self.access_key_secret.expose_secret()),
            )
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_to_error(status, &text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            Error::MalformedResponse(format!(
                "Failed to decode describe-instances page {}: {err}",
                request.page_number
            ))
        })
    }
}

#[async_trait]
impl InstanceInventory for EcsClient {
    async fn describe_instances(&self, request: DescribeInstancesRequest) -> Result<InstancePage> {
        self.fetch_page(&request).await
    }

    fn shutdown(&self) {
        // Connection pool is torn down when the last clone drops.
        debug!(region_id = %self.region_id, "inventory client shut down");
    }
}

fn map_status_to_error(status: StatusCode, text: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::ProviderUnavailable(format!("authentication rejected: {text}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            Error::ProviderUnavailable(format!("rate limited: {text}"))
        }
        status if status.is_server_error() => {
            Error::ProviderUnavailable(format!("server error {status}: {text}"))
        }
        _ => Error::ProviderUnavailable(format!("unexpected status {status}: {text}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> EcsClient {
        EcsClientBuilder::new(server.uri(), "cn-hangzhou")
            .with_credentials("test-key", SecretString::from("test-secret".to_string()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn describe_instances_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .and(query_param("region_id", "cn-hangzhou"))
            .and(query_param("page_number", "1"))
            .and(query_param("page_size", "100"))
            .and(basic_auth("test-key", "test-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "a1b2c3",
                "instances": [
                    {
                        "instance_id": "i-bp1a",
                        "status": "Running",
                        "private_ip_addresses": ["10.0.0.1"],
                        "tags": [{"key": "role", "value": "master"}]
                    }
                ],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page = client
            .describe_instances(DescribeInstancesRequest::page(1, 100))
            .await
            .unwrap();

        assert_eq!(page.instances.len(), 1);
        assert_eq!(page.instances[0].instance_id.as_str(), "i-bp1a");
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn describe_instances_sends_tag_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .and(query_param("tag.1.key", "role"))
            .and(query_param("tag.1.value", "master"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instances": [],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = DescribeInstancesRequest::page(1, 100).with_tag_filters(vec![
            crate::models::TagFilter {
                key: "role".to_string(),
                value: Some("master".to_string()),
            },
        ]);

        let page = client.describe_instances(request).await.unwrap();
        assert!(page.instances.is_empty());
    }

    #[tokio::test]
    async fn server_error_maps_to_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .describe_instances(DescribeInstancesRequest::page(1, 100))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ProviderUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn auth_failure_maps_to_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .describe_instances(DescribeInstancesRequest::page(1, 100))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ProviderUnavailable(_)));
        assert!(err.to_string().contains("authentication rejected"));
    }

    #[tokio::test]
    async fn undecodable_body_maps_to_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .describe_instances(DescribeInstancesRequest::page(1, 100))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn builder_rejects_invalid_endpoint() {
        let result = EcsClientBuilder::new("not a url", "cn-hangzhou").build();
        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
    }
}
