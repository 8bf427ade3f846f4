//! Section controller

use crate::render::{describe, ControlView};
use crate::schema::{FormSchema, FormSection};
use crate::validation::{validate_section, ErrorMap};
use crate::values::FieldValues;

/// Forward action offered by a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Submit,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Next => "Next",
            PrimaryAction::Submit => "Submit",
        }
    }
}

/// Position of a section relative to the active one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Completed,
    Current,
    Upcoming,
}

/// The active section of a form
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    pub section: &'a FormSection,
    pub index: usize,
    pub count: usize,
}

impl<'a> SectionView<'a> {
    /// View of section `index`, if it exists
    pub fn new(schema: &'a FormSchema, index: usize) -> Option<Self> {
        schema.sections.get(index).map(|section| Self {
            section,
            index,
            count: schema.sections.len(),
        })
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// Next on every section but the last, Submit on the last
    pub fn primary_action(&self) -> PrimaryAction {
        if self.is_last() {
            PrimaryAction::Submit
        } else {
            PrimaryAction::Next
        }
    }

    pub fn validate(&self, values: &FieldValues) -> ErrorMap {
        validate_section(self.section, values)
    }

    pub fn controls(&self, values: &FieldValues, errors: &ErrorMap) -> Vec<ControlView> {
        self.section
            .fields
            .iter()
            .map(|f| {
                let error = errors.get(&f.field_id).map(|e| e.to_string());
                describe(f, values.get(&f.field_id), error.as_deref())
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<StepMarker> {
        (0..self.count)
            .map(|i| match i.cmp(&self.index) {
                std::cmp::Ordering::Less => StepMarker::Completed,
                std::cmp::Ordering::Equal => StepMarker::Current,
                std::cmp::Ordering::Greater => StepMarker::Upcoming,
            })
            .collect()
    }

    /// Share of the form reached, counting the active section
    pub fn progress_percent(&self) -> u8 {
        (((self.index + 1) * 100) / self.count) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::*;
    use crate::schema::FieldType;

    fn three_step() -> FormSchema {
        schema(vec![
            section(1, vec![field("a", FieldType::Text)]),
            section(2, vec![field("b", FieldType::Text)]),
            section(3, vec![field("c", FieldType::Text)]),
        ])
    }

    #[test]
    fn test_primary_action_and_bounds() {
        let form = three_step();
        let first = SectionView::new(&form, 0).unwrap();
        assert!(first.is_first());
        assert_eq!(first.primary_action(), PrimaryAction::Next);

        let last = SectionView::new(&form, 2).unwrap();
        assert!(last.is_last());
        assert_eq!(last.primary_action().label(), "Submit");

        assert!(SectionView::new(&form, 3).is_none());
    }

    #[test]
    fn test_markers_and_progress() {
        let form = three_step();
        let view = SectionView::new(&form, 1).unwrap();
        assert_eq!(
            view.markers(),
            vec![StepMarker::Completed, StepMarker::Current, StepMarker::Upcoming]
        );
        assert_eq!(view.progress_percent(), 66);
        assert_eq!(SectionView::new(&form, 2).unwrap().progress_percent(), 100);
    }

    #[test]
    fn test_controls_show_section_errors() {
        let form = two_step();
        let values = FieldValues::initial(&form);
        let view = SectionView::new(&form, 0).unwrap();
        let errors = view.validate(&values);

        let controls = view.controls(&values, &errors);
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].error.as_deref(), Some("This field is required"));
    }

    #[test]
    fn test_errors_of_other_sections_not_shown() {
        let form = two_step();
        let values = FieldValues::initial(&form);
        let mut errors = ErrorMap::new();
        errors.insert("name", crate::validation::FieldError::Required);

        let second = SectionView::new(&form, 1).unwrap();
        let controls = second.controls(&values, &errors);
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].field_id, "bio");
        assert!(controls[0].error.is_none());
    }
}
