//! # Emergency Patient Schema
//!
//! The rule table for an emergency patient intake record. Adding a field
//! means adding a row to [`Schema::emergency_patient`]; the evaluator in
//! [`rule`](crate::rule) does the rest.

use std::collections::HashSet;

use regex::Regex;

use crate::error::SchemaError;
use crate::rule::{FieldRule, RuleCode};

/// `hh:mm`, ASCII digits only.
pub const TIME_PATTERN: &str = r"^[0-9]{2}:[0-9]{2}$";

/// Systolic/diastolic reading, one to three ASCII digits each.
pub const BLOOD_PRESSURE_PATTERN: &str = r"^[0-9]{1,3}/[0-9]{1,3}$";

/// Accepted values for `emergency_sex`.
pub const SEX_VALUES: &[&str] = &["Male", "Female"];

/// Ordered, immutable set of field rules.
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    /// Build a schema from rules in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateField`] if two rules share a name.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(SchemaError::DuplicateField(rule.name().to_string()));
            }
        }
        Ok(Self { rules })
    }

    /// The emergency patient intake schema.
    pub fn emergency_patient() -> Result<Self, SchemaError> {
        let time = compile("emergency_time", TIME_PATTERN)?;
        let blood_pressure = compile("B_P", BLOOD_PRESSURE_PATTERN)?;

        Self::new(vec![
            FieldRule::string("patient_temporary_id")
                .optional_nullable()
                .max_length(255)
                .unique()
                .message(RuleCode::Base, "Temporary patient ID must be a string.")
                .message(RuleCode::MaxLength, "Temporary patient ID must not exceed 255 characters.")
                .message(RuleCode::Unique, "The patient temporary ID must be unique."),
            FieldRule::string("emergency_time")
                .required()
                .pattern(time)
                .message(RuleCode::Base, "Emergency time must be a string.")
                .message(RuleCode::Pattern, "Emergency time must be in the format hh:mm.")
                .message(RuleCode::Required, "Emergency time is required."),
            FieldRule::string("emergency_first_name")
                .required()
                .max_length(255)
                .message(RuleCode::Base, "First name must be a string.")
                .message(RuleCode::MaxLength, "First name must not exceed 255 characters.")
                .message(RuleCode::Required, "First name is required."),
            FieldRule::string("emergency_middle_name")
                .required()
                .max_length(255)
                .message(RuleCode::Base, "Middle name must be a string.")
                .message(RuleCode::MaxLength, "Middle name must not exceed 255 characters.")
                .message(RuleCode::Required, "Middle name is required."),
            FieldRule::string("emergency_last_name")
                .required()
                .max_length(255)
                .message(RuleCode::Base, "Last name must be a string.")
                .message(RuleCode::MaxLength, "Last name must not exceed 255 characters.")
                .message(RuleCode::Required, "Last name is required."),
            FieldRule::string("emergency_extension")
                .optional_nullable()
                .max_length(10)
                .message(RuleCode::Base, "Extension must be a string.")
                .message(RuleCode::MaxLength, "Extension must not exceed 10 characters."),
            FieldRule::one_of("emergency_sex", SEX_VALUES)
                .optional_nullable()
                .message(RuleCode::Only, "Sex must be either Male or Female."),
            FieldRule::integer("emergency_age")
                .optional_nullable()
                .range(0.0, 120.0)
                .message(RuleCode::Base, "Age must be a number.")
                .message(RuleCode::Min, "Age must be at least 0.")
                .message(RuleCode::Max, "Age must be at most 120."),
            FieldRule::string("priority_level")
                .required()
                .max_length(255)
                .message(RuleCode::Base, "Priority level must be a string.")
                .message(RuleCode::MaxLength, "Priority level must not exceed 255 characters.")
                .message(RuleCode::Required, "Priority level is required."),
            FieldRule::string("status")
                .optional_nullable()
                .max_length(255)
                .message(RuleCode::Base, "Status must be a string.")
                .message(RuleCode::MaxLength, "Status must not exceed 255 characters."),
            FieldRule::string("B_P")
                .required()
                .pattern(blood_pressure)
                .message(RuleCode::Base, "Blood pressure must be a string.")
                .message(RuleCode::Pattern, "Blood pressure must be in the format: xxx/xxx.")
                .message(RuleCode::Required, "Blood pressure is required."),
            FieldRule::decimal("temperature")
                .required()
                .range(30.0, 45.0)
                .message(RuleCode::Base, "Temperature must be a number.")
                .message(RuleCode::Min, "Temperature must be at least 30°C.")
                .message(RuleCode::Max, "Temperature must be at most 45°C.")
                .message(RuleCode::Required, "Temperature is required."),
            FieldRule::integer("heart_rate")
                .required()
                .range(30.0, 200.0)
                .message(RuleCode::Base, "Heart rate must be an integer.")
                .message(RuleCode::Min, "Heart rate must be at least 30 bpm.")
                .message(RuleCode::Max, "Heart rate must be at most 200 bpm.")
                .message(RuleCode::Required, "Heart rate is required."),
            FieldRule::integer("pulse_rate")
                .required()
                .range(30.0, 200.0)
                .message(RuleCode::Base, "Pulse rate must be an integer.")
                .message(RuleCode::Min, "Pulse rate must be at least 30 bpm.")
                .message(RuleCode::Max, "Pulse rate must be at most 200 bpm.")
                .message(RuleCode::Required, "Pulse rate is required."),
            FieldRule::integer("respiratory_rate")
                .required()
                .range(10.0, 60.0)
                .message(RuleCode::Base, "Respiratory rate must be an integer.")
                .message(RuleCode::Min, "Respiratory rate must be at least 10 breaths per minute.")
                .message(RuleCode::Max, "Respiratory rate must be at most 60 breaths per minute.")
                .message(RuleCode::Required, "Respiratory rate is required."),
            FieldRule::string("vitals_note")
                .required()
                .max_length(1000)
                .message(RuleCode::Base, "Vitals note must be a string.")
                .message(RuleCode::MaxLength, "Vitals note must not exceed 1000 characters.")
                .message(RuleCode::Required, "Vitals note is required."),
        ])
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Look up a rule by field name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{FieldKind, FieldOutcome};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::emergency_patient().unwrap()
    }

    #[test]
    fn declares_sixteen_fields_in_order() {
        let names: Vec<&str> = schema().rules().iter().map(FieldRule::name).collect();
        assert_eq!(
            names,
            vec![
                "patient_temporary_id",
                "emergency_time",
                "emergency_first_name",
                "emergency_middle_name",
                "emergency_last_name",
                "emergency_extension",
                "emergency_sex",
                "emergency_age",
                "priority_level",
                "status",
                "B_P",
                "temperature",
                "heart_rate",
                "pulse_rate",
                "respiratory_rate",
                "vitals_note",
            ]
        );
    }

    #[test]
    fn required_and_optional_split() {
        let s = schema();
        let optional: Vec<&str> = s
            .rules()
            .iter()
            .filter(|r| !r.is_required())
            .map(FieldRule::name)
            .collect();
        assert_eq!(
            optional,
            vec![
                "patient_temporary_id",
                "emergency_extension",
                "emergency_sex",
                "emergency_age",
                "status",
            ]
        );
        assert!(s.rules().iter().filter(|r| !r.is_required()).all(FieldRule::is_nullable));
    }

    #[test]
    fn only_temporary_id_is_unique() {
        let unique: Vec<&str> = schema()
            .rules()
            .iter()
            .filter(|r| r.is_unique())
            .map(FieldRule::name)
            .collect();
        assert_eq!(unique, vec!["patient_temporary_id"]);
    }

    #[test]
    fn field_kinds() {
        let s = schema();
        assert_eq!(s.field("temperature").map(FieldRule::kind), Some(FieldKind::Decimal));
        assert_eq!(s.field("emergency_age").map(FieldRule::kind), Some(FieldKind::Integer));
        assert_eq!(s.field("emergency_sex").map(FieldRule::kind), Some(FieldKind::Enum));
        assert!(!s.contains("patient_name"));
    }

    #[test]
    fn age_boundaries() {
        let s = schema();
        let age = s.field("emergency_age").unwrap();
        assert!(matches!(age.check(Some(&json!(0))), FieldOutcome::Accepted(_)));
        assert!(matches!(age.check(Some(&json!(120))), FieldOutcome::Accepted(_)));
        assert!(matches!(age.check(Some(&json!(121))), FieldOutcome::Rejected(_)));
        assert!(matches!(age.check(Some(&json!(-1))), FieldOutcome::Rejected(_)));
    }

    #[test]
    fn heart_rate_boundaries() {
        let s = schema();
        let hr = s.field("heart_rate").unwrap();
        assert!(matches!(hr.check(Some(&json!(30))), FieldOutcome::Accepted(_)));
        assert!(matches!(hr.check(Some(&json!(200))), FieldOutcome::Accepted(_)));
        match hr.check(Some(&json!(29))) {
            FieldOutcome::Rejected(v) => {
                assert_eq!(v[0].message, "Heart rate must be at least 30 bpm.")
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn blood_pressure_pattern() {
        let s = schema();
        let bp = s.field("B_P").unwrap();
        for ok in ["120/80", "9/6", "999/999"] {
            assert!(matches!(bp.check(Some(&json!(ok))), FieldOutcome::Accepted(_)), "{ok}");
        }
        for bad in ["1200/80", "120/", "120-80", "120/80 ", "a/b"] {
            match bp.check(Some(&json!(bad))) {
                FieldOutcome::Rejected(v) => {
                    assert_eq!(v[0].message, "Blood pressure must be in the format: xxx/xxx.")
                }
                other => panic!("{bad}: expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn temperature_accepts_decimals_in_range() {
        let s = schema();
        let t = s.field("temperature").unwrap();
        assert_eq!(t.check(Some(&json!(36.6))), FieldOutcome::Accepted(json!(36.6)));
        assert!(matches!(t.check(Some(&json!(45.1))), FieldOutcome::Rejected(_)));
    }

    #[test]
    fn duplicate_field_names_rejected() {
        let err = Schema::new(vec![FieldRule::string("status"), FieldRule::string("status")])
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(ref f) if f == "status"));
    }

    #[test]
    fn name_fields_carry_their_label() {
        let s = schema();
        assert_eq!(
            s.field("emergency_middle_name").unwrap().message_for(RuleCode::Required),
            "Middle name is required."
        );
        assert_eq!(
            s.field("emergency_last_name").unwrap().message_for(RuleCode::MaxLength),
            "Last name must not exceed 255 characters."
        );
    }
}
