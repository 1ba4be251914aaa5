//! # triage-registry-client: Typed client for the patient registry
//!
//! Answers one question for the validator: is this patient temporary id
//! already in use?
//!
//! ## API Path Convention
//!
//! | Method | Path | Meaning |
//! |--------|------|---------|
//! | GET | `{base_url}/api/v1/patients/temporary-ids/{id}` | 200 → exists, 404 → free |
//!
//! Any other status is an upstream error. Transport failures are retried
//! with backoff while the lookup budget of the [`RetryPolicy`] allows.

pub mod config;
pub mod error;
pub mod retry;

pub use config::RegistryConfig;
pub use error::RegistryClientError;
pub use retry::RetryPolicy;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use triage_core::{RegistryError, TemporaryIdRegistry};
use url::Url;

/// Path segments under the base URL, before the id.
const TEMPORARY_ID_PATH: [&str; 4] = ["api", "v1", "patients", "temporary-ids"];

/// HTTP-backed [`TemporaryIdRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl RegistryClient {
    /// Create a new registry client from configuration.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryClientError> {
        if config.base_url.cannot_be_a_base() {
            return Err(config::ConfigError::InvalidUrl(
                "REGISTRY_URL".to_string(),
                format!("{} cannot be used as a base URL", config.base_url),
            )
            .into());
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| config::ConfigError::InvalidToken)?,
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RegistryClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            retry: config.retry,
        })
    }

    /// The lookup URL for `id`, with the id percent-encoded as one segment.
    fn temporary_id_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(TEMPORARY_ID_PATH).push(id);
        }
        url
    }

    /// Whether `id` is already registered.
    pub async fn temporary_id_exists(&self, id: &str) -> Result<bool, RegistryClientError> {
        let endpoint = "GET /api/v1/patients/temporary-ids/{id}";
        let url = self.temporary_id_url(id);

        let resp = self
            .retry
            .run(|| self.http.get(url.clone()).send())
            .await
            .map_err(|e| RegistryClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "registry lookup returned unexpected status");
                Err(RegistryClientError::ApiError {
                    endpoint: endpoint.into(),
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl TemporaryIdRegistry for RegistryClient {
    async fn exists(&self, id: &str) -> Result<bool, RegistryError> {
        self.temporary_id_exists(id).await.map_err(RegistryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RegistryClient {
        RegistryClient::new(RegistryConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn lookup_url_appends_segments() {
        let url = client("http://registry.local").temporary_id_url("ABC123");
        assert_eq!(
            url.as_str(),
            "http://registry.local/api/v1/patients/temporary-ids/ABC123"
        );
    }

    #[test]
    fn lookup_url_keeps_base_path() {
        let url = client("http://registry.local/intake/").temporary_id_url("T-1");
        assert_eq!(
            url.as_str(),
            "http://registry.local/intake/api/v1/patients/temporary-ids/T-1"
        );
    }

    #[test]
    fn lookup_url_encodes_id_as_single_segment() {
        let url = client("http://registry.local").temporary_id_url("a/b c?");
        assert_eq!(
            url.as_str(),
            "http://registry.local/api/v1/patients/temporary-ids/a%2Fb%20c%3F"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let err = RegistryClient::new(RegistryConfig::new(Url::parse("mailto:ops@example.com").unwrap()))
            .unwrap_err();
        assert!(matches!(err, RegistryClientError::Config(_)));
    }

    #[test]
    fn rejects_token_with_newline() {
        let mut cfg = RegistryConfig::new(Url::parse("http://registry.local").unwrap());
        cfg.api_token = Some("bad\ntoken".into());
        assert!(matches!(
            RegistryClient::new(cfg).unwrap_err(),
            RegistryClientError::Config(config::ConfigError::InvalidToken)
        ));
    }

    #[test]
    fn upstream_status_maps_to_registry_error() {
        let err = RegistryClientError::ApiError {
            endpoint: "GET".into(),
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(RegistryError::from(err), RegistryError::Upstream { status: 500 });
    }
}
