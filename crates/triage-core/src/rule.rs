//! # Field Rules
//!
//! A [`FieldRule`] is one row of the rule table: the field name, its kind,
//! whether it is required or nullable, its constraints, and the message text
//! for each check. [`FieldRule::check`] evaluates a single raw value against
//! the row and either accepts it (returning the normalized value) or lists
//! every check it failed.
//!
//! ## Evaluation Order
//!
//! 1. Presence: absent → `required` (if required), else skipped.
//! 2. Null: accepted as-is when the field is nullable.
//! 3. Kind: a value of the wrong JSON type fails `base` and nothing else.
//! 4. Constraints: evaluated independently, so one value may fail several.
//!
//! The uniqueness constraint is declared here but evaluated by the
//! [`validator`](crate::validator), which owns the registry capability.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

/// Which check a violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    /// Field absent but required.
    Required,
    /// Value has the wrong JSON type.
    Base,
    /// String value is empty.
    Empty,
    /// String value exceeds the maximum length.
    MaxLength,
    /// Number has a fractional part where an integer is required.
    Integer,
    /// Number is below the minimum.
    Min,
    /// Number is above the maximum.
    Max,
    /// String does not match the pattern.
    Pattern,
    /// Value is not one of the allowed values.
    Only,
    /// Value already exists in the registry.
    Unique,
    /// Field is not part of the schema.
    Unknown,
}

impl RuleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Base => "base",
            Self::Empty => "empty",
            Self::MaxLength => "max_length",
            Self::Integer => "integer",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pattern => "pattern",
            Self::Only => "only",
            Self::Unique => "unique",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON shape a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// A whole number; numeric strings are coerced.
    Integer,
    /// Any finite number; numeric strings are coerced.
    Decimal,
    /// A string drawn from a fixed set of values.
    Enum,
}

/// Result of checking one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Optional field not supplied. Contributes nothing to the output.
    Absent,
    /// Value passed every check; carries the normalized value.
    Accepted(Value),
    /// Value failed at least one check.
    Rejected(Vec<crate::record::Violation>),
}

/// One row of the rule table.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    nullable: bool,
    unique: bool,
    max_length: Option<usize>,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<Regex>,
    allowed: &'static [&'static str],
    messages: Vec<(RuleCode, &'static str)>,
}

impl FieldRule {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
            unique: false,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            allowed: &[],
            messages: Vec::new(),
        }
    }

    /// A string field.
    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// A whole-number field.
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// A decimal-number field.
    pub fn decimal(name: &'static str) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    /// A string field restricted to `allowed`.
    pub fn one_of(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            allowed,
            ..Self::new(name, FieldKind::Enum)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Optional field that also accepts an explicit null.
    pub fn optional_nullable(mut self) -> Self {
        self.required = false;
        self.nullable = true;
        self
    }

    /// Value must not already exist in the temporary-id registry.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn max_length(mut self, chars: usize) -> Self {
        self.max_length = Some(chars);
        self
    }

    /// Inclusive numeric range.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Anchored pattern the whole string must match.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Override the message for one check.
    pub fn message(mut self, code: RuleCode, text: &'static str) -> Self {
        self.messages.retain(|(c, _)| *c != code);
        self.messages.push((code, text));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Message text for `code`: the configured override, else a generic
    /// sentence naming the field.
    pub fn message_for(&self, code: RuleCode) -> String {
        if let Some((_, text)) = self.messages.iter().find(|(c, _)| *c == code) {
            return (*text).to_string();
        }
        let name = self.name;
        match code {
            RuleCode::Required => format!("\"{name}\" is required"),
            RuleCode::Base => match self.kind {
                FieldKind::String | FieldKind::Enum => format!("\"{name}\" must be a string"),
                FieldKind::Integer | FieldKind::Decimal => format!("\"{name}\" must be a number"),
            },
            RuleCode::Empty => format!("\"{name}\" is not allowed to be empty"),
            RuleCode::MaxLength => format!(
                "\"{name}\" length must be less than or equal to {} characters long",
                self.max_length.unwrap_or_default()
            ),
            RuleCode::Integer => format!("\"{name}\" must be an integer"),
            RuleCode::Min => format!(
                "\"{name}\" must be greater than or equal to {}",
                self.min.unwrap_or_default()
            ),
            RuleCode::Max => format!(
                "\"{name}\" must be less than or equal to {}",
                self.max.unwrap_or_default()
            ),
            RuleCode::Pattern => format!("\"{name}\" fails to match the required pattern"),
            RuleCode::Only => format!("\"{name}\" must be one of [{}]", self.allowed.join(", ")),
            RuleCode::Unique => format!("\"{name}\" must be unique"),
            RuleCode::Unknown => format!("\"{name}\" is not allowed"),
        }
    }

    pub(crate) fn violation(&self, code: RuleCode) -> crate::record::Violation {
        crate::record::Violation {
            field: self.name.to_string(),
            code,
            message: self.message_for(code),
        }
    }

    /// Check one raw value (`None` when the key is absent).
    pub fn check(&self, value: Option<&Value>) -> FieldOutcome {
        let value = match value {
            None if self.required => {
                return FieldOutcome::Rejected(vec![self.violation(RuleCode::Required)])
            }
            None => return FieldOutcome::Absent,
            Some(Value::Null) if self.nullable => return FieldOutcome::Accepted(Value::Null),
            Some(v) => v,
        };

        match self.kind {
            FieldKind::String => self.check_string(value),
            FieldKind::Integer | FieldKind::Decimal => self.check_number(value),
            FieldKind::Enum => self.check_enum(value),
        }
    }

    fn check_string(&self, value: &Value) -> FieldOutcome {
        let Some(s) = value.as_str() else {
            return FieldOutcome::Rejected(vec![self.violation(RuleCode::Base)]);
        };
        if s.is_empty() {
            return FieldOutcome::Rejected(vec![self.violation(RuleCode::Empty)]);
        }

        let mut violations = Vec::new();
        if let Some(max) = self.max_length {
            if s.chars().count() > max {
                violations.push(self.violation(RuleCode::MaxLength));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                violations.push(self.violation(RuleCode::Pattern));
            }
        }

        if violations.is_empty() {
            FieldOutcome::Accepted(Value::String(s.to_string()))
        } else {
            FieldOutcome::Rejected(violations)
        }
    }

    fn check_number(&self, value: &Value) -> FieldOutcome {
        let Some(number) = coerce_number(value) else {
            return FieldOutcome::Rejected(vec![self.violation(RuleCode::Base)]);
        };
        let Some(x) = number.as_f64() else {
            return FieldOutcome::Rejected(vec![self.violation(RuleCode::Base)]);
        };

        let mut violations = Vec::new();
        if self.kind == FieldKind::Integer && x.fract() != 0.0 {
            violations.push(self.violation(RuleCode::Integer));
        }
        if let Some(min) = self.min {
            if x < min {
                violations.push(self.violation(RuleCode::Min));
            }
        }
        if let Some(max) = self.max {
            if x > max {
                violations.push(self.violation(RuleCode::Max));
            }
        }

        if !violations.is_empty() {
            return FieldOutcome::Rejected(violations);
        }
        let normalized = match self.kind {
            FieldKind::Integer => integral(&number, x),
            _ => Value::Number(number),
        };
        FieldOutcome::Accepted(normalized)
    }

    fn check_enum(&self, value: &Value) -> FieldOutcome {
        match value.as_str() {
            Some(s) if self.allowed.contains(&s) => FieldOutcome::Accepted(Value::String(s.to_string())),
            _ => FieldOutcome::Rejected(vec![self.violation(RuleCode::Only)]),
        }
    }
}

/// Accept JSON numbers and strings holding a finite number.
///
/// Whole numbers written as strings come back as integers so that `"80"`
/// normalizes to `80`, not `80.0`.
fn coerce_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Number::from(i));
            }
            let x = trimmed.parse::<f64>().ok().filter(|x| x.is_finite())?;
            Number::from_f64(x)
        }
        _ => None,
    }
}

/// Normalize an integral number to its integer JSON form.
fn integral(number: &Number, x: f64) -> Value {
    if number.is_i64() || number.is_u64() {
        return Value::Number(number.clone());
    }
    if x >= i64::MIN as f64 && x <= i64::MAX as f64 {
        Value::from(x as i64)
    } else {
        Value::Number(number.clone())
    }
}
