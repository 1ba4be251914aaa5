//! # Error Types
//!
//! Rule violations are not errors: they are data carried by
//! [`ValidationResult::Invalid`](crate::record::ValidationResult). The types
//! here cover the two ways validation itself can fail to produce a result:
//!
//! - the schema could not be built (bad pattern, caught at startup), and
//! - the temporary-id registry could not answer (infrastructure fault).

use thiserror::Error;

/// Error raised while building a [`Schema`](crate::schema::Schema).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A field's pattern did not compile.
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        /// Field the pattern belongs to.
        field: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Two rules share the same field name.
    #[error("duplicate rule for field '{0}'")]
    DuplicateField(String),
}

/// An unknown-field policy name that is neither `strip` nor `reject`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown field policy '{0}' (expected 'strip' or 'reject')")]
pub struct PolicyParseError(pub String);

/// Error reported by a [`TemporaryIdRegistry`](crate::registry::TemporaryIdRegistry)
/// implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No registry backend is configured for this deployment.
    #[error("temporary-id registry is not configured")]
    NotConfigured,

    /// The registry could not be reached (connection refused, DNS, transport timeout).
    #[error("temporary-id registry unreachable: {0}")]
    Unreachable(String),

    /// The registry answered with an unexpected status.
    #[error("temporary-id registry returned status {status}")]
    Upstream {
        /// HTTP status code returned by the registry.
        status: u16,
    },
}

/// Validation could not complete because the uniqueness capability failed.
///
/// Distinct from a failed validation: the record may be perfectly valid, but
/// whether its temporary id is unique cannot be determined. No partial result
/// accompanies this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityFailure {
    /// The registry returned an error.
    #[error("uniqueness check for '{field}' failed: {source}")]
    Registry {
        /// Field whose uniqueness was being checked.
        field: String,
        /// Error reported by the registry.
        #[source]
        source: RegistryError,
    },

    /// The registry did not answer within the configured bound.
    #[error("uniqueness check for '{field}' timed out after {after_ms}ms")]
    Timeout {
        /// Field whose uniqueness was being checked.
        field: String,
        /// The bound that elapsed, in milliseconds.
        after_ms: u64,
    },
}

impl CapabilityFailure {
    /// Whether this failure was caused by the timeout bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
