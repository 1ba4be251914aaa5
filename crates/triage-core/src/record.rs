//! # Records and Results
//!
//! The per-request data shapes: the untyped candidate coming in from the
//! boundary, the normalized record going out, and the violations collected
//! in between.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rule::RuleCode;

/// Untyped field → value mapping as received from the boundary.
pub type CandidateRecord = Map<String, Value>;

/// Field → typed value mapping, in schema declaration order.
///
/// Only fields present in the candidate appear; accepted nulls stay null.
pub type NormalizedRecord = Map<String, Value>;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Field the rule belongs to.
    pub field: String,
    /// Which rule failed.
    pub code: RuleCode,
    /// Human-readable message returned to the caller verbatim.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.code, self.message)
    }
}

/// Ordered, non-empty collection of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Wrap a list of violations. Returns `None` when the list is empty.
    pub fn new(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The messages, in evaluation order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one candidate record. Exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every rule passed.
    Valid(NormalizedRecord),
    /// At least one rule failed.
    Invalid(Violations),
}

impl ValidationResult {
    /// Build a result from the collected pieces: any violation wins.
    pub(crate) fn from_parts(normalized: NormalizedRecord, violations: Vec<Violation>) -> Self {
        match Violations::new(violations) {
            Some(v) => Self::Invalid(v),
            None => Self::Valid(normalized),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The violations, if validation failed.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(v) => Some(v),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<NormalizedRecord, Violations> {
        match self {
            Self::Valid(record) => Ok(record),
            Self::Invalid(v) => Err(v),
        }
    }
}
