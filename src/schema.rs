//! Form schema model
//!
//! Typed description of a server-defined form: sections, fields, options and
//! constraints. Deserialized from the form service's wire format and treated
//! as read-only once fetched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DynaformError, Result};

/// A user identity (roll number + display name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub roll_number: String,
    pub name: String,
}

impl User {
    pub fn new(roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            name: name.into(),
        }
    }

    /// Uppercased first letter of the name, used as an avatar
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

/// Wire-level field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Tel,
    Email,
    Textarea,
    Date,
    Dropdown,
    Radio,
    Checkbox,
}

/// Semantic field kind, resolved from the wire type and declared options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    ShortText,
    Phone,
    Email,
    MultilineText,
    Date,
    SingleSelect,
    SingleChoiceSet,
    MultiChoiceSet,
    /// Checkbox without options: a single boolean
    BooleanCheckbox,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::ShortText => "short-text",
            FieldKind::Phone => "phone",
            FieldKind::Email => "email",
            FieldKind::MultilineText => "multiline-text",
            FieldKind::Date => "date",
            FieldKind::SingleSelect => "single-select",
            FieldKind::SingleChoiceSet => "single-choice-set",
            FieldKind::MultiChoiceSet => "multi-choice-set",
            FieldKind::BooleanCheckbox => "checkbox",
        }
    }
}

/// Custom validation hint attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub message: String,
}

/// One selectable option of a choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_test_id: Option<String>,
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub data_test_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

impl FormField {
    pub fn kind(&self) -> FieldKind {
        match self.field_type {
            FieldType::Text => FieldKind::ShortText,
            FieldType::Tel => FieldKind::Phone,
            FieldType::Email => FieldKind::Email,
            FieldType::Textarea => FieldKind::MultilineText,
            FieldType::Date => FieldKind::Date,
            FieldType::Dropdown => FieldKind::SingleSelect,
            FieldType::Radio => FieldKind::SingleChoiceSet,
            FieldType::Checkbox if self.options.is_empty() => FieldKind::BooleanCheckbox,
            FieldType::Checkbox => FieldKind::MultiChoiceSet,
        }
    }

    /// Custom validation message, if one is declared and non-empty
    pub fn custom_message(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .map(|v| v.message.as_str())
            .filter(|m| !m.is_empty())
    }

    pub fn option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// A named, ordered group of fields presented as one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    pub section_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FormField>,
}

/// Full form description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub form_title: String,
    pub form_id: String,
    pub version: String,
    pub sections: Vec<FormSection>,
}

impl FormSchema {
    /// Iterate all fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, field_id: &str) -> Option<&FormField> {
        self.fields().find(|f| f.field_id == field_id)
    }

    /// Reject schemas the form controller cannot render
    pub fn check(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(DynaformError::Payload("Form contains no sections".into()));
        }

        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.field_id.as_str()) {
                return Err(DynaformError::Payload(format!(
                    "Duplicate field id in form: {}",
                    field.field_id
                )));
            }
        }

        Ok(())
    }
}

/// Body of a successful `/get-form` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    #[serde(default)]
    pub message: String,
    pub form: FormSchema,
}

impl FormResponse {
    /// Decode a response body. Fields of a type this client cannot render are
    /// dropped with a warning; the rest of the form still loads.
    pub fn from_value(mut json: serde_json::Value) -> serde_json::Result<Self> {
        if let Some(sections) = json
            .pointer_mut("/form/sections")
            .and_then(|s| s.as_array_mut())
        {
            for section in sections {
                if let Some(fields) = section.get_mut("fields").and_then(|f| f.as_array_mut()) {
                    fields.retain(is_supported_field);
                }
            }
        }
        serde_json::from_value(json)
    }
}

fn is_supported_field(field: &serde_json::Value) -> bool {
    let field_type = field.get("type");
    let supported = field_type.map_or(false, |t| FieldType::deserialize(t).is_ok());
    if !supported {
        tracing::warn!(
            "Skipping field {:?} of unsupported type {:?}",
            field.get("fieldId"),
            field_type
        );
    }
    supported
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn field(id: &str, field_type: FieldType) -> FormField {
        FormField {
            field_id: id.into(),
            field_type,
            label: id.into(),
            placeholder: None,
            required: false,
            data_test_id: format!("{}-input", id),
            validation: None,
            options: vec![],
            max_length: None,
            min_length: None,
        }
    }

    pub fn options(values: &[&str]) -> Vec<FieldOption> {
        values
            .iter()
            .map(|v| FieldOption {
                value: v.to_string(),
                label: v.to_uppercase(),
                data_test_id: Some(format!("opt-{}", v)),
            })
            .collect()
    }

    pub fn section(id: u32, fields: Vec<FormField>) -> FormSection {
        FormSection {
            section_id: id,
            title: format!("Section {}", id),
            description: String::new(),
            fields,
        }
    }

    pub fn schema(sections: Vec<FormSection>) -> FormSchema {
        FormSchema {
            form_title: "Student Form".into(),
            form_id: "form-1".into(),
            version: "1.0".into(),
            sections,
        }
    }

    /// Two sections: a required `name` (min 2) then an optional `bio`
    pub fn two_step() -> FormSchema {
        let mut name = field("name", FieldType::Text);
        name.required = true;
        name.min_length = Some(2);
        schema(vec![
            section(1, vec![name]),
            section(2, vec![field("bio", FieldType::Textarea)]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_deserialize_wire_form() {
        let body = r#"{
            "message": "Form fetched",
            "form": {
                "formTitle": "Student Form",
                "formId": "f-1",
                "version": "1.0",
                "sections": [{
                    "sectionId": 1,
                    "title": "Basics",
                    "description": "About you",
                    "fields": [
                        {"fieldId": "email", "type": "email", "label": "Email",
                         "required": true, "dataTestId": "email-input",
                         "validation": {"message": "Email needed"}},
                        {"fieldId": "langs", "type": "checkbox", "label": "Languages",
                         "required": false, "dataTestId": "langs",
                         "options": [{"value": "rs", "label": "Rust", "dataTestId": "langs-rs"}]},
                        {"fieldId": "agree", "type": "checkbox", "label": "I agree",
                         "required": false, "dataTestId": "agree"}
                    ]
                }]
            }
        }"#;

        let response: FormResponse = serde_json::from_str(body).unwrap();
        let form = response.form;
        assert_eq!(form.form_id, "f-1");
        let fields: Vec<_> = form.fields().collect();
        assert_eq!(fields[0].kind(), FieldKind::Email);
        assert_eq!(fields[0].custom_message(), Some("Email needed"));
        assert_eq!(fields[1].kind(), FieldKind::MultiChoiceSet);
        assert_eq!(fields[1].options[0].data_test_id.as_deref(), Some("langs-rs"));
        assert_eq!(fields[2].kind(), FieldKind::BooleanCheckbox);
    }

    #[test]
    fn test_unknown_field_type_rejected() {
        let body = r#"{"fieldId": "x", "type": "slider", "label": "X", "required": false}"#;
        assert!(serde_json::from_str::<FormField>(body).is_err());
    }

    #[test]
    fn test_check_rejects_duplicates_and_empty() {
        assert!(schema(vec![]).check().is_err());

        let dup = schema(vec![
            section(1, vec![field("a", FieldType::Text)]),
            section(2, vec![field("a", FieldType::Date)]),
        ]);
        assert!(matches!(dup.check(), Err(DynaformError::Payload(_))));

        assert!(two_step().check().is_ok());
    }

    #[test]
    fn test_unknown_field_type_skipped_in_response() {
        let body = serde_json::json!({
            "message": "ok",
            "form": {
                "formTitle": "T", "formId": "f", "version": "1",
                "sections": [{
                    "sectionId": 1, "title": "S",
                    "fields": [
                        {"fieldId": "x", "type": "slider", "label": "X"},
                        {"fieldId": "y", "label": "Y"},
                        {"fieldId": "name", "type": "text", "label": "Name"}
                    ]
                }]
            }
        });
        let response = FormResponse::from_value(body).unwrap();
        let ids: Vec<_> = response.form.fields().map(|f| f.field_id.as_str()).collect();
        assert_eq!(ids, vec!["name"]);
    }

    #[test]
    fn test_field_lookup() {
        let form = two_step();
        assert_eq!(form.field("bio").map(|f| f.kind()), Some(FieldKind::MultilineText));
        assert!(form.field("missing").is_none());
        assert_eq!(User::new("R1", "alice").initial(), Some('A'));
    }
}
