//! # Application State
//!
//! Shared state for the Axum application, passed to handlers via the
//! `State` extractor. Holds the configuration and the validator; the
//! validator in turn holds the schema and the registry capability.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use triage_core::validator::DEFAULT_REGISTRY_TIMEOUT;
use triage_core::{
    PatientRecordValidator, SchemaError, TemporaryIdRegistry, UnconfiguredRegistry,
    UnknownFieldPolicy, ValidatorOptions,
};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Handling of keys the schema does not declare.
    pub unknown_fields: UnknownFieldPolicy,
    /// Bound on a single registry lookup.
    pub registry_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            unknown_fields: UnknownFieldPolicy::Reject,
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }
}

/// Errors reading [`AppConfig`] from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 3000)
    /// - `UNKNOWN_FIELDS`: `reject` or `strip` (default: `reject`)
    /// - `REGISTRY_TIMEOUT_MS` (default: 2000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw.clone(),
                reason: "expected a port number".into(),
            })?,
            None => defaults.port,
        };

        let unknown_fields = match lookup("UNKNOWN_FIELDS") {
            Some(raw) => raw.parse::<UnknownFieldPolicy>().map_err(|err| ConfigError::Invalid {
                var: "UNKNOWN_FIELDS",
                value: raw.clone(),
                reason: err.to_string(),
            })?,
            None => defaults.unknown_fields,
        };

        let registry_timeout = match lookup("REGISTRY_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "REGISTRY_TIMEOUT_MS",
                        value: raw,
                        reason: "expected a positive number of milliseconds".into(),
                    })
                }
            },
            None => defaults.registry_timeout,
        };

        Ok(Self {
            port,
            unknown_fields,
            registry_timeout,
        })
    }

    /// Validator options derived from this configuration.
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            unknown_fields: self.unknown_fields,
            registry_timeout: self.registry_timeout,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub validator: PatientRecordValidator,
}

impl AppState {
    /// Default configuration and no registry backend.
    ///
    /// Records without a temporary id validate normally; records with one
    /// get a 503.
    pub fn new() -> Result<Self, SchemaError> {
        Self::with_registry(AppConfig::default(), Arc::new(UnconfiguredRegistry))
    }

    /// Build state with an explicit configuration and registry.
    pub fn with_registry(
        config: AppConfig,
        registry: Arc<dyn TemporaryIdRegistry>,
    ) -> Result<Self, SchemaError> {
        let validator =
            PatientRecordValidator::emergency_patient(registry, config.validator_options())?;
        Ok(Self {
            config: Arc::new(config),
            validator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(cfg.registry_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn reads_all_variables() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("UNKNOWN_FIELDS", "strip"),
            ("REGISTRY_TIMEOUT_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.unknown_fields, UnknownFieldPolicy::Strip);
        assert_eq!(cfg.validator_options().registry_timeout, Duration::from_millis(750));
    }

    #[test]
    fn rejects_bad_values() {
        for (var, value) in [
            ("PORT", "eighty"),
            ("UNKNOWN_FIELDS", "drop"),
            ("REGISTRY_TIMEOUT_MS", "0"),
            ("REGISTRY_TIMEOUT_MS", "-5"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert!(err.to_string().contains(var), "{err}");
        }
    }

    #[test]
    fn default_state_has_emergency_schema() {
        let state = AppState::new().unwrap();
        assert_eq!(state.validator.schema().rules().len(), 16);
        assert_eq!(state.config.port, DEFAULT_PORT);
    }
}
