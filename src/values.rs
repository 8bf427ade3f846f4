//! Field value state

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldKind, FormField, FormSchema};

/// Current value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Choices(Vec<String>),
}

impl FieldValue {
    /// Starting value for a freshly fetched field
    pub fn initial_for(field: &FormField) -> Self {
        match field.kind() {
            FieldKind::MultiChoiceSet => FieldValue::Choices(Vec::new()),
            FieldKind::BooleanCheckbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Empty string or empty selection
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Choices(c) => c.is_empty(),
            FieldValue::Flag(_) => false,
        }
    }

    /// Empty string or unchecked flag. An empty selection still counts as a value.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Flag(b) => !b,
            FieldValue::Choices(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        match self {
            FieldValue::Choices(c) => c.iter().any(|v| v == option),
            _ => false,
        }
    }

    /// Multi-choice value with `option` toggled; other kinds start from no selection
    pub fn toggled(&self, option: &str) -> FieldValue {
        FieldValue::Choices(toggle_option(self.choices(), option))
    }

    /// Multi-choice value with `option` checked or unchecked
    pub fn with_option(&self, option: &str, checked: bool) -> FieldValue {
        FieldValue::Choices(set_option(self.choices(), option, checked))
    }

    fn choices(&self) -> &[String] {
        match self {
            FieldValue::Choices(c) => c,
            _ => &[],
        }
    }
}

/// Check or uncheck `option`. Checking an already checked option keeps a single entry.
pub fn set_option(choices: &[String], option: &str, checked: bool) -> Vec<String> {
    let present = choices.iter().any(|v| v == option);
    match (checked, present) {
        (true, false) => {
            let mut next = choices.to_vec();
            next.push(option.to_string());
            next
        }
        (false, true) => choices.iter().filter(|v| *v != option).cloned().collect(),
        _ => choices.to_vec(),
    }
}

/// Add `option` if absent, remove it if present
pub fn toggle_option(choices: &[String], option: &str) -> Vec<String> {
    let present = choices.iter().any(|v| v == option);
    set_option(choices, option, !present)
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Choices(c) => write!(f, "{}", c.join(", ")),
            FieldValue::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
        }
    }
}

/// Field id to value, in schema-declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldValues {
    entries: IndexMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per schema field, each at its initial value
    pub fn initial(schema: &FormSchema) -> Self {
        Self {
            entries: schema
                .fields()
                .map(|f| (f.field_id.clone(), FieldValue::initial_for(f)))
                .collect(),
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.entries.get(field_id)
    }

    /// Replace the value in place, or append a new entry
    pub fn set(&mut self, field_id: &str, value: FieldValue) {
        self.entries.insert(field_id.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
