//! Validation for identifiers, statuses, and full property records.
//!
//! Client input is normalized with [`sanitize_text`] and lowercased before any
//! length, charset, or membership rule runs, so `"  OAK-STREET  "` is accepted
//! as `oak-street`.


use super::domain::{Property, PropertyStatus};
use super::sanitize::sanitize_text;

pub const PROPERTY_ID_REQUIRED: &str = "Property ID is required";
pub const PROPERTY_ID_LENGTH: &str = "Property ID must be 3-50 characters";
pub const PROPERTY_ID_CHARSET: &str = "Property ID contains invalid characters";
pub const STATUS_REQUIRED: &str = "Status is required";
pub const STATUS_UNKNOWN: &str = "Status must be complete, pending, or overdue";

const PROPERTY_ID_MIN: usize = 3;
const PROPERTY_ID_MAX: usize = 50;
const NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 200;
const UNITS_MAX: u32 = 10_000;
const TASK_COUNT_MAX: u32 = 1_000;
const ISSUES_MAX: usize = 20;
const ISSUE_MAX: usize = 500;

/// Outcome of validating a single client-supplied value.
///
/// `sanitized` is present exactly when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub sanitized: Option<String>,
    pub error: Option<String>,
}

impl ValidationResult {
    fn accepted(sanitized: String) -> Self {
        Self {
            valid: true,
            sanitized: Some(sanitized),
            error: None,
        }
    }

    fn rejected(message: &'static str) -> Self {
        Self {
            valid: false,
            sanitized: None,
            error: Some(message.to_string()),
        }
    }

    pub fn into_result(self) -> Result<String, ValidationError> {
        match (self.sanitized, self.error) {
            (Some(value), _) if self.valid => Ok(value),
            (_, error) => Err(ValidationError(
                error.unwrap_or_else(|| "Validation failed".to_string()),
            )),
        }
    }
}

/// A rejected input, carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub fn validate_property_id(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return ValidationResult::rejected(PROPERTY_ID_REQUIRED);
    }

    let sanitized = normalize(raw);
    let length = sanitized.chars().count();
    if !(PROPERTY_ID_MIN..=PROPERTY_ID_MAX).contains(&length) {
        return ValidationResult::rejected(PROPERTY_ID_LENGTH);
    }

    if !is_property_id_charset(&sanitized) {
        return ValidationResult::rejected(PROPERTY_ID_CHARSET);
    }

    ValidationResult::accepted(sanitized)
}

pub fn validate_property_status(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return ValidationResult::rejected(STATUS_REQUIRED);
    }

    let sanitized = normalize(raw);
    match sanitized.parse::<PropertyStatus>() {
        Ok(_) => ValidationResult::accepted(sanitized),
        Err(_) => ValidationResult::rejected(STATUS_UNKNOWN),
    }
}

pub fn parse_property_id(raw: &str) -> Result<String, ValidationError> {
    validate_property_id(raw).into_result()
}

pub fn parse_property_status(raw: &str) -> Result<PropertyStatus, ValidationError> {
    let value = validate_property_status(raw).into_result()?;
    value
        .parse::<PropertyStatus>()
        .map_err(|_| ValidationError(STATUS_UNKNOWN.to_string()))
}

/// A single failed rule on a full property record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Applies the stricter record rules used when properties are loaded into a
/// repository. Every violation is reported, not just the first.
pub fn validate_property(property: &Property) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    if !is_strict_property_id(&property.id) {
        let message = validate_property_id(&property.id)
            .error
            .unwrap_or_else(|| "Property ID must already be normalized".to_string());
        violations.push(FieldViolation::new("id", message));
    }

    check_text(
        &mut violations,
        "name",
        &property.name,
        NAME_MAX,
        is_name_char,
        "Property name",
    );
    check_text(
        &mut violations,
        "address",
        &property.address,
        ADDRESS_MAX,
        |c| is_name_char(c) || c == '#',
        "Property address",
    );

    if property.units == 0 {
        violations.push(FieldViolation::new("units", "Must have at least 1 unit"));
    } else if property.units > UNITS_MAX {
        violations.push(FieldViolation::new(
            "units",
            "Cannot have more than 10,000 units",
        ));
    }

    if property.maintenance_score > 100 {
        violations.push(FieldViolation::new(
            "maintenanceScore",
            "Maintenance score cannot exceed 100",
        ));
    }

    for (field, count) in [
        ("tasks.completed", property.tasks.completed),
        ("tasks.pending", property.tasks.pending),
        ("tasks.overdue", property.tasks.overdue),
    ] {
        if count > TASK_COUNT_MAX {
            violations.push(FieldViolation::new(field, "Task count cannot exceed 1000"));
        }
    }

    if property.issues.len() > ISSUES_MAX {
        violations.push(FieldViolation::new(
            "issues",
            "Cannot have more than 20 issues",
        ));
    }
    for (index, issue) in property.issues.iter().enumerate() {
        let field = format!("issues.{index}");
        let trimmed = issue.trim();
        if trimmed.is_empty() {
            violations.push(FieldViolation::new(
                field,
                "Issue description cannot be empty",
            ));
        } else if trimmed.chars().count() > ISSUE_MAX {
            violations.push(FieldViolation::new(
                field,
                "Issue description must be less than 500 characters",
            ));
        } else if !trimmed.chars().all(|c| is_name_char(c) || c == '!' || c == '?') {
            violations.push(FieldViolation::new(
                field,
                "Issue description contains invalid characters",
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn normalize(raw: &str) -> String {
    sanitize_text(raw).to_lowercase()
}

fn is_property_id_charset(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// Stored ids must already be in normalized form.
fn is_strict_property_id(value: &str) -> bool {
    let length = value.chars().count();
    (PROPERTY_ID_MIN..=PROPERTY_ID_MAX).contains(&length) && is_property_id_charset(value)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '-' | '\'' | '&' | '.' | ',' | '(' | ')')
}

fn check_text(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: &str,
    max: usize,
    allowed: impl Fn(char) -> bool,
    label: &str,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(FieldViolation::new(field, format!("{label} is required")));
    } else if trimmed.chars().count() > max {
        violations.push(FieldViolation::new(
            field,
            format!("{label} must be less than {max} characters"),
        ));
    } else if !trimmed.chars().all(allowed) {
        violations.push(FieldViolation::new(
            field,
            format!("{label} contains invalid characters"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::domain::PropertyTaskCounts;
    use chrono::NaiveDate;

    #[test]
    fn accepts_well_formed_ids() {
        for id in ["oak-street", "riverside-complex", "sunset-manor", "test123"] {
            let result = validate_property_id(id);
            assert!(result.valid, "{id} should be valid");
            assert_eq!(result.sanitized.as_deref(), Some(id));
            assert!(result.error.is_none());
        }
    }

    #[test]
    fn rejects_malformed_ids_with_fixed_messages() {
        let long = "a".repeat(51);
        let cases = [
            ("", PROPERTY_ID_REQUIRED),
            ("ab", PROPERTY_ID_LENGTH),
            (long.as_str(), PROPERTY_ID_LENGTH),
            ("   ", PROPERTY_ID_LENGTH),
            ("Invalid_ID!", PROPERTY_ID_CHARSET),
            ("test@domain.com", PROPERTY_ID_CHARSET),
            ("test<script>", PROPERTY_ID_CHARSET),
        ];

        for (raw, message) in cases {
            let result = validate_property_id(raw);
            assert!(!result.valid, "{raw:?} should be rejected");
            assert_eq!(result.error.as_deref(), Some(message));
            assert!(result.sanitized.is_none());
        }
    }

    #[test]
    fn normalizes_before_checking_ids() {
        let result = validate_property_id("  OAK-STREET  ");
        assert!(result.valid);
        assert_eq!(result.sanitized.as_deref(), Some("oak-street"));

        let fifty = format!("  {}  ", "b".repeat(50));
        assert!(validate_property_id(&fifty).valid);
        assert_eq!(
            parse_property_id("oak\x00-street"),
            Ok("oak-street".to_string())
        );
        assert_eq!(
            parse_property_id("\u{FEFF}oak-street\u{FEFF}"),
            Ok("oak-street".to_string())
        );
    }

    #[test]
    fn validates_statuses() {
        for status in ["complete", "pending", "overdue"] {
            let result = validate_property_status(status);
            assert!(result.valid);
            assert_eq!(result.sanitized.as_deref(), Some(status));
        }

        let normalized = validate_property_status("  COMPLETE  ");
        assert_eq!(normalized.sanitized.as_deref(), Some("complete"));

        for (raw, message) in [
            ("", STATUS_REQUIRED),
            ("invalid", STATUS_UNKNOWN),
            ("complete<script>", STATUS_UNKNOWN),
        ] {
            let result = validate_property_status(raw);
            assert!(!result.valid);
            assert_eq!(result.error.as_deref(), Some(message));
            assert!(result.sanitized.is_none());
        }
    }

    #[test]
    fn parse_status_yields_enum() {
        assert_eq!(parse_property_status(" Overdue "), Ok(PropertyStatus::Overdue));
        assert_eq!(
            parse_property_status("done"),
            Err(ValidationError(STATUS_UNKNOWN.to_string()))
        );
    }

    fn record() -> Property {
        Property {
            id: "test-property".to_string(),
            name: "Test Property".to_string(),
            address: "123 Test Street, Unit #4".to_string(),
            units: 10,
            status: PropertyStatus::Complete,
            last_inspection: NaiveDate::from_ymd_opt(2024, 10, 1).expect("valid date"),
            next_inspection: NaiveDate::from_ymd_opt(2024, 10, 15).expect("valid date"),
            maintenance_score: 95,
            tasks: PropertyTaskCounts {
                completed: 5,
                pending: 1,
                overdue: 0,
            },
            issues: vec!["Test issue".to_string()],
        }
    }

    #[test]
    fn full_record_passes_strict_rules() {
        assert_eq!(validate_property(&record()), Ok(()));
    }

    #[test]
    fn full_record_reports_every_violation() {
        let mut property = record();
        property.id = "ab".to_string();
        property.name = "<b>Bold</b>".to_string();
        property.units = 0;
        property.tasks.pending = 1_001;
        property.issues = vec!["fine".to_string(); 21];

        let violations = validate_property(&property).expect_err("record rejected");
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["id", "name", "units", "tasks.pending", "issues"]);
        assert_eq!(violations[0].message, PROPERTY_ID_LENGTH);
    }

    #[test]
    fn stored_ids_must_be_normalized() {
        let mut property = record();
        property.id = "Oak-Street".to_string();
        let violations = validate_property(&property).expect_err("uppercase id rejected");
        assert_eq!(violations[0].field, "id");
    }
}
