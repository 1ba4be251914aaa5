//! # Patient Record Validator
//!
//! Applies a [`Schema`] to a candidate record. Every field is checked; the
//! violations of all fields are aggregated in declaration order so the
//! caller can report every problem in one response.
//!
//! Fields marked unique are additionally looked up in the injected
//! [`TemporaryIdRegistry`], but only when every other rule of the record has
//! passed. A record that is already invalid never reaches the registry, so a
//! registry outage cannot hide its violations. The lookup is bounded by
//! [`ValidatorOptions::registry_timeout`]. If it fails or times out,
//! validation aborts with a [`CapabilityFailure`] and no partial result.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{CapabilityFailure, PolicyParseError, SchemaError};
use crate::record::{CandidateRecord, NormalizedRecord, ValidationResult, Violation};
use crate::registry::TemporaryIdRegistry;
use crate::rule::{FieldOutcome, FieldRule, RuleCode};
use crate::schema::Schema;

/// Default bound on a single registry lookup.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_millis(2000);

/// What to do with keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Report each one as `"<key>" is not allowed`, after the field violations.
    #[default]
    Reject,
    /// Ignore them; they are left out of the normalized record.
    Strip,
}

impl FromStr for UnknownFieldPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strip" => Ok(Self::Strip),
            "reject" => Ok(Self::Reject),
            other => Err(PolicyParseError(other.to_string())),
        }
    }
}

/// Tunables for [`PatientRecordValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub unknown_fields: UnknownFieldPolicy,
    pub registry_timeout: Duration,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }
}

/// Validates emergency patient records.
///
/// Cheap to clone; the schema and registry are shared.
#[derive(Clone)]
pub struct PatientRecordValidator {
    schema: Arc<Schema>,
    registry: Arc<dyn TemporaryIdRegistry>,
    options: ValidatorOptions,
}

impl std::fmt::Debug for PatientRecordValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientRecordValidator")
            .field("fields", &self.schema.rules().len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PatientRecordValidator {
    /// Build a validator over an arbitrary schema.
    pub fn new(
        schema: Schema,
        registry: Arc<dyn TemporaryIdRegistry>,
        options: ValidatorOptions,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            registry,
            options,
        }
    }

    /// Build a validator over [`Schema::emergency_patient`].
    pub fn emergency_patient(
        registry: Arc<dyn TemporaryIdRegistry>,
        options: ValidatorOptions,
    ) -> Result<Self, SchemaError> {
        Ok(Self::new(Schema::emergency_patient()?, registry, options))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate an arbitrary JSON value.
    ///
    /// Anything other than an object is a single violation.
    pub async fn validate_value(&self, value: &Value) -> Result<ValidationResult, CapabilityFailure> {
        match value {
            Value::Object(record) => self.validate(record).await,
            _ => Ok(ValidationResult::from_parts(
                NormalizedRecord::new(),
                vec![Violation {
                    field: "value".to_string(),
                    code: RuleCode::Base,
                    message: "\"value\" must be of type object".to_string(),
                }],
            )),
        }
    }

    /// Validate a candidate record.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityFailure`] if a uniqueness lookup fails or times
    /// out. Lookups only run for records with no other violation. Rule
    /// violations are never errors; they come back as
    /// [`ValidationResult::Invalid`].
    pub async fn validate(
        &self,
        record: &CandidateRecord,
    ) -> Result<ValidationResult, CapabilityFailure> {
        let mut normalized = NormalizedRecord::new();
        let mut violations = Vec::new();
        let mut lookups = Vec::new();

        for rule in self.schema.rules() {
            match rule.check(record.get(rule.name())) {
                FieldOutcome::Absent => {}
                FieldOutcome::Rejected(failed) => violations.extend(failed),
                FieldOutcome::Accepted(value) => {
                    if let (true, Some(id)) = (rule.is_unique(), value.as_str()) {
                        lookups.push((rule, id.to_string()));
                    }
                    normalized.insert(rule.name().to_string(), value);
                }
            }
        }

        if self.options.unknown_fields == UnknownFieldPolicy::Reject {
            violations.extend(
                record
                    .keys()
                    .filter(|key| !self.schema.contains(key))
                    .map(|key| Violation {
                        field: key.clone(),
                        code: RuleCode::Unknown,
                        message: format!("\"{key}\" is not allowed"),
                    }),
            );
        }

        if violations.is_empty() {
            for (rule, id) in lookups {
                if self.already_registered(rule, &id).await? {
                    violations.push(rule.violation(RuleCode::Unique));
                }
            }
        } else if !lookups.is_empty() {
            tracing::debug!(
                violations = violations.len(),
                "uniqueness lookup skipped for invalid record"
            );
        }

        let result = ValidationResult::from_parts(normalized, violations);
        match &result {
            ValidationResult::Valid(data) => {
                tracing::debug!(fields = data.len(), "record valid");
            }
            ValidationResult::Invalid(v) => {
                tracing::debug!(violations = v.violations().len(), "record invalid");
            }
        }
        Ok(result)
    }

    async fn already_registered(
        &self,
        rule: &FieldRule,
        id: &str,
    ) -> Result<bool, CapabilityFailure> {
        let bound = self.options.registry_timeout;
        match tokio::time::timeout(bound, self.registry.exists(id)).await {
            Ok(Ok(exists)) => Ok(exists),
            Ok(Err(source)) => {
                tracing::warn!(field = rule.name(), error = %source, "registry lookup failed");
                Err(CapabilityFailure::Registry {
                    field: rule.name().to_string(),
                    source,
                })
            }
            Err(_) => {
                tracing::warn!(
                    field = rule.name(),
                    timeout_ms = bound.as_millis() as u64,
                    "registry lookup timed out"
                );
                Err(CapabilityFailure::Timeout {
                    field: rule.name().to_string(),
                    after_ms: bound.as_millis() as u64,
                })
            }
        }
    }
}
