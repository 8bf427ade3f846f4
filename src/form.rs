//! Form controller
//!
//! `FormState` owns the fetched schema, every field value, the error map and
//! the active section index. It changes only through [`FormState::dispatch`],
//! which consumes the current state and returns the next one together with
//! the event the transition produced.

use std::sync::Arc;

use crate::error::Result;
use crate::schema::FormSchema;
use crate::section::SectionView;
use crate::validation::ErrorMap;
use crate::values::{FieldValue, FieldValues};

/// User intent against the form
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Store a new value for one field
    Edit { field_id: String, value: FieldValue },
    /// Validate the active section and move forward
    Next,
    /// Move back one section without validating
    Previous,
    /// Validate the last section and hand off the values
    Submit,
}

/// Observable outcome of a transition
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    Blocked { section: usize, errors: usize },
    Submitted(FieldValues),
}

/// Complete state of one form session
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: FieldValues,
    errors: ErrorMap,
    section_index: usize,
}

impl FormState {
    /// Start on the first section with every field at its initial value
    pub fn new(schema: FormSchema) -> Result<Self> {
        schema.check()?;
        let values = FieldValues::initial(&schema);
        Ok(Self {
            schema: Arc::new(schema),
            values,
            errors: ErrorMap::new(),
            section_index: 0,
        })
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn current_section(&self) -> SectionView<'_> {
        SectionView {
            section: &self.schema.sections[self.section_index],
            index: self.section_index,
            count: self.schema.sections.len(),
        }
    }

    pub fn is_last_section(&self) -> bool {
        self.current_section().is_last()
    }

    /// Apply one action
    pub fn dispatch(mut self, action: FormAction) -> (Self, Option<FormEvent>) {
        match action {
            FormAction::Edit { field_id, value } => {
                if self.schema.field(&field_id).is_none() {
                    tracing::warn!("Ignoring edit of unknown field {}", field_id);
                    return (self, None);
                }
                self.values.set(&field_id, value);
                self.errors.remove(&field_id);
                (self, None)
            }
            FormAction::Previous => {
                if self.section_index == 0 {
                    return (self, None);
                }
                let from = self.section_index;
                self.section_index -= 1;
                tracing::debug!("Section {} -> {}", from, self.section_index);
                let to = self.section_index;
                (self, Some(FormEvent::Retreated { from, to }))
            }
            FormAction::Next => {
                if let Some(blocked) = self.validate_current() {
                    return (self, Some(blocked));
                }
                if self.is_last_section() {
                    return (self, None);
                }
                let from = self.section_index;
                self.section_index += 1;
                tracing::debug!("Section {} -> {}", from, self.section_index);
                let to = self.section_index;
                (self, Some(FormEvent::Advanced { from, to }))
            }
            FormAction::Submit => {
                if !self.is_last_section() {
                    tracing::warn!(
                        "Submit ignored on section {} of {}",
                        self.section_index + 1,
                        self.schema.sections.len()
                    );
                    return (self, None);
                }
                if let Some(blocked) = self.validate_current() {
                    return (self, Some(blocked));
                }
                tracing::info!("Form {} submitted", self.schema.form_id);
                let values = self.values.clone();
                (self, Some(FormEvent::Submitted(values)))
            }
        }
    }

    /// Recompute the error map for the active section
    fn validate_current(&mut self) -> Option<FormEvent> {
        let errors = self.current_section().validate(&self.values);
        self.errors = errors;
        if self.errors.is_empty() {
            None
        } else {
            tracing::debug!(
                "Section {} blocked with {} error(s)",
                self.section_index,
                self.errors.len()
            );
            Some(FormEvent::Blocked {
                section: self.section_index,
                errors: self.errors.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::*;
    use crate::schema::FieldType;
    use crate::validation::FieldError;

    fn edit(state: FormState, id: &str, text: &str) -> FormState {
        state
            .dispatch(FormAction::Edit {
                field_id: id.into(),
                value: FieldValue::Text(text.into()),
            })
            .0
    }

    #[test]
    fn test_required_blocks_next() {
        let state = FormState::new(two_step()).unwrap();
        let (state, event) = state.dispatch(FormAction::Next);
        assert_eq!(event, Some(FormEvent::Blocked { section: 0, errors: 1 }));
        assert_eq!(state.section_index(), 0);
        assert_eq!(state.errors().get("name"), Some(&FieldError::Required));
    }

    #[test]
    fn test_edit_clears_field_error() {
        let state = FormState::new(two_step()).unwrap();
        let (state, _) = state.dispatch(FormAction::Next);
        assert!(state.errors().contains("name"));

        let state = edit(state, "name", "A");
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_end_to_end_two_sections() {
        let state = FormState::new(two_step()).unwrap();

        let state = edit(state, "name", "A");
        let (state, event) = state.dispatch(FormAction::Next);
        assert_eq!(event, Some(FormEvent::Blocked { section: 0, errors: 1 }));
        assert_eq!(state.errors().get("name"), Some(&FieldError::TooShort(2)));

        let state = edit(state, "name", "Al");
        let (state, event) = state.dispatch(FormAction::Next);
        assert_eq!(event, Some(FormEvent::Advanced { from: 0, to: 1 }));

        let (state, event) = state.dispatch(FormAction::Submit);
        let mut expected = FieldValues::new();
        expected.set("name", FieldValue::Text("Al".into()));
        expected.set("bio", FieldValue::Text(String::new()));
        assert_eq!(event, Some(FormEvent::Submitted(expected)));
        assert_eq!(state.section_index(), 1);
    }

    #[test]
    fn test_next_then_previous_preserves_values() {
        let state = FormState::new(two_step()).unwrap();
        let state = edit(state, "name", "Alice");
        let (state, _) = state.dispatch(FormAction::Next);
        let state = edit(state, "bio", "hello");
        let (state, event) = state.dispatch(FormAction::Previous);

        assert_eq!(event, Some(FormEvent::Retreated { from: 1, to: 0 }));
        assert_eq!(state.section_index(), 0);
        assert_eq!(state.values().get("name"), Some(&FieldValue::Text("Alice".into())));
        assert_eq!(state.values().get("bio"), Some(&FieldValue::Text("hello".into())));
    }

    #[test]
    fn test_previous_keeps_errors_of_left_section() {
        let mut email = field("email", FieldType::Email);
        email.required = true;
        let form = schema(vec![
            section(1, vec![field("a", FieldType::Text)]),
            section(2, vec![email]),
        ]);
        let (state, _) = FormState::new(form).unwrap().dispatch(FormAction::Next);
        let (state, _) = state.dispatch(FormAction::Next);
        assert!(state.errors().contains("email"));

        let (state, _) = state.dispatch(FormAction::Previous);
        assert_eq!(state.section_index(), 0);
        assert!(state.errors().contains("email"));
    }

    #[test]
    fn test_bounds_are_noops() {
        let state = FormState::new(two_step()).unwrap();
        let (state, event) = state.dispatch(FormAction::Previous);
        assert_eq!(event, None);
        assert_eq!(state.section_index(), 0);

        let (state, event) = state.dispatch(FormAction::Submit);
        assert_eq!(event, None);

        let state = edit(state, "name", "Al");
        let (state, _) = state.dispatch(FormAction::Next);
        let (state, event) = state.dispatch(FormAction::Next);
        assert_eq!(event, None);
        assert_eq!(state.section_index(), 1);
    }

    #[test]
    fn test_unknown_field_edit_ignored() {
        let state = FormState::new(two_step()).unwrap();
        let before = state.clone();
        let state = edit(state, "ghost", "boo");
        assert_eq!(state, before);
    }

    #[test]
    fn test_invalid_schema_rejected() {
        assert!(FormState::new(schema(vec![])).is_err());
    }
}
