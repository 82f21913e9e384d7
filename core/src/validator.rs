//! Answer validation
//!
//! Runs the full rule set over a session's values. Every field of the form
//! gets an entry in the report; an empty message means the field passed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::domain::aggregates::Form;
use crate::domain::value_objects::{is_allowed_upload, Field, FieldType, FieldValue};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Accepts anything that reads as a number once trimmed, `NaN` excluded:
/// decimals, exponents, signed `Infinity`, and unsigned `0x`/`0o`/`0b`
/// integer literals.
pub fn is_valid_number(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_radix_literal(trimmed) {
        return true;
    }
    if trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed) == "Infinity" {
        return true;
    }
    trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn is_radix_literal(value: &str) -> bool {
    let radix = match value.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return false,
    };
    let digits = &value[2..];
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

pub fn is_valid_datetime(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Field id → error message, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<(String, String)>,
}

impl ValidationReport {
    /// The message recorded for `field_id`; empty when it passed or is unknown.
    pub fn error(&self, field_id: &str) -> &str {
        self.errors
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, msg)| msg.as_str())
            .unwrap_or("")
    }

    pub fn is_valid(&self) -> bool {
        self.errors.iter().all(|(_, msg)| msg.is_empty())
    }

    /// Every entry, including passing fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(id, msg)| (id.as_str(), msg.as_str()))
    }

    /// Only the entries carrying a message.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, msg)| !msg.is_empty())
    }

    /// Blanks the message for `field_id` without re-running any rule.
    pub fn clear(&mut self, field_id: &str) {
        if let Some((_, msg)) = self.errors.iter_mut().find(|(id, _)| id == field_id) {
            msg.clear();
        }
    }

    pub(crate) fn set(&mut self, field_id: &str, message: String) {
        match self.errors.iter_mut().find(|(id, _)| id == field_id) {
            Some((_, msg)) => *msg = message,
            None => self.errors.push((field_id.to_string(), message)),
        }
    }
}

/// Validates every field of `form` against `values`.
pub fn validate(form: &Form, values: &HashMap<String, FieldValue>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for field in &form.fields {
        let message = check(field, values.get(&field.id)).unwrap_or_default();
        report.set(&field.id, message);
    }
    report
}

fn check(field: &Field, value: Option<&FieldValue>) -> Option<String> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ if field.required => return Some(format!("{} is required", field.label)),
        _ => return None,
    };

    match (field.field_type, value) {
        (FieldType::Email, FieldValue::Text(s)) if !is_valid_email(s) => {
            Some(format!("Invalid email format for {}", field.label))
        }
        (FieldType::Number, FieldValue::Text(s)) if !is_valid_number(s) => {
            Some(format!("{} must be a valid number", field.label))
        }
        (FieldType::Upload, FieldValue::File(file)) if !is_allowed_upload(&file.mime) => Some(format!(
            "Only JPEG, PNG images, and PDF files are allowed for {}",
            field.label
        )),
        (FieldType::Datetime, FieldValue::Text(s)) if !is_valid_datetime(s) => {
            Some(format!("{} must be a valid date and time", field.label))
        }
        _ => None,
    }
}
