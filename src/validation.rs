//! Field and section validation
//!
//! Pure functions mapping a field and its current value to the first rule it
//! violates. Rules run in a fixed order: required, length, format, then the
//! field's custom message.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::schema::{FieldKind, FormField, FormSection};
use crate::values::{FieldValue, FieldValues};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern"));

/// Why a field's value is unacceptable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Must be at least {0} characters")]
    TooShort(usize),

    #[error("Cannot exceed {0} characters")]
    TooLong(usize),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    #[error("{0}")]
    Custom(String),
}

/// Validate one field. `None` means the value passes every rule.
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Option<FieldError> {
    if field.required && value.map_or(true, FieldValue::is_empty) {
        return Some(FieldError::Required);
    }

    if let Some(text) = value.and_then(FieldValue::as_text) {
        let len = text.chars().count();
        if let Some(min) = field.min_length {
            if len < min {
                return Some(FieldError::TooShort(min));
            }
        }
        if let Some(max) = field.max_length {
            if len > max {
                return Some(FieldError::TooLong(max));
            }
        }

        if !text.is_empty() {
            match field.kind() {
                FieldKind::Email if !EMAIL_PATTERN.is_match(text) => {
                    return Some(FieldError::InvalidEmail)
                }
                FieldKind::Phone if !PHONE_PATTERN.is_match(text) => {
                    return Some(FieldError::InvalidPhone)
                }
                _ => {}
            }
        }
    }

    // Required text never gets here empty; an unchecked flag still does.
    match field.custom_message() {
        Some(message) if value.map_or(true, FieldValue::is_falsy) => {
            Some(FieldError::Custom(message.to_string()))
        }
        _ => None,
    }
}

/// Validate every field of a section against the current values
pub fn validate_section(section: &FormSection, values: &FieldValues) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for field in &section.fields {
        if let Some(error) = validate_field(field, values.get(&field.field_id)) {
            errors.insert(&field.field_id, error);
        }
    }
    errors
}

/// Field id to validation error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    errors: BTreeMap<String, FieldError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field_id: &str, error: FieldError) {
        self.errors.insert(field_id.to_string(), error);
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldError> {
        self.errors.get(field_id)
    }

    pub fn remove(&mut self, field_id: &str) -> Option<FieldError> {
        self.errors.remove(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.errors.contains_key(field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.errors.iter().map(|(id, e)| (id.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
