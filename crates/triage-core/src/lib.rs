//! # triage-core: Emergency Patient Record Validation
//!
//! The rule engine behind the validation service. A fixed, declarative rule
//! table ([`Schema`]) is interpreted by a generic evaluator ([`FieldRule::check`])
//! and driven by [`PatientRecordValidator`], which aggregates every violation
//! across every field.
//!
//! ## Crate Policy
//!
//! - No HTTP types. The adapter lives in `triage-api`.
//! - The uniqueness lookup is an injected [`TemporaryIdRegistry`]; its
//!   failures surface as [`CapabilityFailure`], never as violations.
//! - Schema and rules are immutable once built and shared across requests.

pub mod error;
pub mod record;
pub mod registry;
pub mod rule;
pub mod schema;
pub mod validator;

pub use error::{CapabilityFailure, PolicyParseError, RegistryError, SchemaError};
pub use record::{CandidateRecord, NormalizedRecord, ValidationResult, Violation, Violations};
pub use registry::{InMemoryRegistry, TemporaryIdRegistry, UnconfiguredRegistry};
pub use rule::{FieldKind, FieldOutcome, FieldRule, RuleCode};
pub use schema::Schema;
pub use validator::{PatientRecordValidator, UnknownFieldPolicy, ValidatorOptions};
