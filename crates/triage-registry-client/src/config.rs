//! Patient registry client configuration.
//!
//! There is no default registry: a deployment without `REGISTRY_URL` runs
//! without a uniqueness backend and the API refuses records that carry a
//! temporary id.

use std::time::Duration;

use url::Url;

use crate::retry::RetryPolicy;

/// Default transport timeout for registry requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for connecting to the patient registry.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry service.
    pub base_url: Url,
    /// Optional bearer token for API authentication.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Backoff for transport failures.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl RegistryConfig {
    /// Configuration for `base_url` with no token and the default timeout
    /// and retry policy.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// Bound each lookup, retries included, by `budget`.
    pub fn with_lookup_budget(mut self, budget: Duration) -> Self {
        self.retry.budget = budget;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `REGISTRY_URL` (required)
    /// - `REGISTRY_API_TOKEN` (optional)
    /// - `REGISTRY_HTTP_TIMEOUT_SECS` (default: 5)
    /// - `REGISTRY_MAX_RETRIES` (default: 3)
    /// - `REGISTRY_RETRY_BASE_MS` (default: 100)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup("REGISTRY_URL").ok_or(ConfigError::MissingUrl)?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("REGISTRY_URL".to_string(), e.to_string()))?;

        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(var)
                .map(|s| {
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidNumber(var, s.clone()))
                })
                .transpose()
        };

        let mut config = Self::new(base_url);
        config.api_token = lookup("REGISTRY_API_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(secs) = number("REGISTRY_HTTP_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(retries) = number("REGISTRY_MAX_RETRIES")? {
            config.retry.max_retries = u32::try_from(retries).map_err(|_| {
                ConfigError::InvalidNumber("REGISTRY_MAX_RETRIES", retries.to_string())
            })?;
        }
        if let Some(ms) = number("REGISTRY_RETRY_BASE_MS")? {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("REGISTRY_URL environment variable is not set")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid {0} value '{1}': expected a non-negative integer")]
    InvalidNumber(&'static str, String),
    #[error("registry API token contains characters not allowed in a header")]
    InvalidToken,
}
