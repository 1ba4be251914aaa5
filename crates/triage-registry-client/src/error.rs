//! Registry client error types.

use triage_core::RegistryError;

/// Errors from patient registry calls.
#[derive(Debug, thiserror::Error)]
pub enum RegistryClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Registry returned a status other than 200 or 404.
    #[error("registry {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Collapse client errors into the capability's error type.
///
/// Response bodies stay in the client's logs; only the status crosses over.
impl From<RegistryClientError> for RegistryError {
    fn from(err: RegistryClientError) -> Self {
        match err {
            RegistryClientError::Http { source, .. } => RegistryError::Unreachable(source.to_string()),
            RegistryClientError::ApiError { status, .. } => RegistryError::Upstream { status },
            RegistryClientError::Config(e) => RegistryError::Unreachable(e.to_string()),
        }
    }
}
