//! Field rendering
//!
//! Maps a field and its current value to the control that edits it, and turns
//! terminal input into value updates reported through a single
//! `(field_id, new_value)` callback.

use colored::Colorize;
use thiserror::Error;

use crate::schema::{FieldKind, FormField};
use crate::values::FieldValue;

/// Placeholder entry of a select control, standing for the empty value
pub const SELECT_PLACEHOLDER: &str = "Select";

/// Interactive control for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldControl {
    /// Single-line input; `input_type` is the textual flavour (text, tel, email, date)
    TextInput { input_type: &'static str },
    TextArea,
    Select,
    RadioGroup,
    CheckboxGroup,
    Toggle,
}

impl FieldControl {
    pub fn for_field(field: &FormField) -> Self {
        match field.kind() {
            FieldKind::ShortText => FieldControl::TextInput { input_type: "text" },
            FieldKind::Phone => FieldControl::TextInput { input_type: "tel" },
            FieldKind::Email => FieldControl::TextInput { input_type: "email" },
            FieldKind::Date => FieldControl::TextInput { input_type: "date" },
            FieldKind::MultilineText => FieldControl::TextArea,
            FieldKind::SingleSelect => FieldControl::Select,
            FieldKind::SingleChoiceSet => FieldControl::RadioGroup,
            FieldKind::MultiChoiceSet => FieldControl::CheckboxGroup,
            FieldKind::BooleanCheckbox => FieldControl::Toggle,
        }
    }

    /// Short usage hint shown next to the input prompt
    pub fn hint(&self, option_count: usize) -> String {
        match self {
            FieldControl::TextInput { input_type: "date" } => "YYYY-MM-DD".into(),
            FieldControl::TextInput { .. } => "text".into(),
            FieldControl::TextArea => "text, blank line to finish".into(),
            FieldControl::Select => format!("0-{}", option_count),
            FieldControl::RadioGroup => format!("1-{}", option_count),
            FieldControl::CheckboxGroup => {
                format!("toggle 1-{}, +n to check, -n to uncheck, e.g. 1,3", option_count)
            }
            FieldControl::Toggle => "y/n".into(),
        }
    }
}

/// Input that cannot be turned into a value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not an option number")]
    NotANumber(String),

    #[error("Choose an option between {min} and {max}")]
    OutOfRange { min: usize, max: usize },

    #[error("Answer y or n")]
    ExpectedYesNo,
}

/// Render model of one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub test_id: Option<String>,
    pub selected: bool,
}

/// Render model of one field control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub field_id: String,
    pub control: FieldControl,
    pub label: String,
    pub placeholder: Option<String>,
    pub display: String,
    pub required: bool,
    pub test_id: String,
    pub options: Vec<OptionView>,
    pub error: Option<String>,
}

/// Build the render model for `field` at `value`
pub fn describe(field: &FormField, value: Option<&FieldValue>, error: Option<&str>) -> ControlView {
    let control = FieldControl::for_field(field);
    let selected = |option: &str| match (control, value) {
        (FieldControl::CheckboxGroup, Some(v)) => v.contains(option),
        (FieldControl::Select | FieldControl::RadioGroup, Some(v)) => v.as_text() == Some(option),
        _ => false,
    };

    let display = match (control, value) {
        (FieldControl::Toggle, Some(FieldValue::Flag(true))) => "yes".into(),
        (FieldControl::Toggle, _) => "no".into(),
        (_, Some(v)) => v.to_string(),
        (_, None) => String::new(),
    };

    ControlView {
        field_id: field.field_id.clone(),
        control,
        label: field.label.clone(),
        placeholder: field.placeholder.clone(),
        display,
        required: field.required,
        test_id: field.data_test_id.clone(),
        options: field
            .options
            .iter()
            .map(|o| OptionView {
                value: o.value.clone(),
                label: o.label.clone(),
                test_id: o.data_test_id.clone(),
                selected: selected(&o.value),
            })
            .collect(),
        error: error.map(String::from),
    }
}

/// Turn one line of terminal input into the field's new value
pub fn interpret(
    field: &FormField,
    input: &str,
    current: Option<&FieldValue>,
) -> Result<FieldValue, InputError> {
    let count = field.options.len();
    match FieldControl::for_field(field) {
        FieldControl::TextInput { .. } | FieldControl::TextArea => {
            Ok(FieldValue::Text(input.to_string()))
        }
        FieldControl::Select => {
            let n = parse_choice(input.trim(), 0, count)?;
            Ok(FieldValue::Text(
                n.checked_sub(1)
                    .map(|i| field.options[i].value.clone())
                    .unwrap_or_default(),
            ))
        }
        FieldControl::RadioGroup => {
            let n = parse_choice(input.trim(), 1, count)?;
            Ok(FieldValue::Text(field.options[n - 1].value.clone()))
        }
        FieldControl::CheckboxGroup => {
            let mut value = current
                .cloned()
                .unwrap_or_else(|| FieldValue::Choices(Vec::new()));
            // `+n` checks, `-n` unchecks, a bare `n` toggles
            let picks = input
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| match (s.strip_prefix('+'), s.strip_prefix('-')) {
                    (Some(n), _) => parse_choice(n, 1, count).map(|n| (Some(true), n)),
                    (_, Some(n)) => parse_choice(n, 1, count).map(|n| (Some(false), n)),
                    _ => parse_choice(s, 1, count).map(|n| (None, n)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            for (checked, n) in picks {
                let option = &field.options[n - 1].value;
                value = match checked {
                    Some(checked) => value.with_option(option, checked),
                    None => value.toggled(option),
                };
            }
            Ok(value)
        }
        FieldControl::Toggle => match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "x" => Ok(FieldValue::Flag(true)),
            "n" | "no" | "false" | "" => Ok(FieldValue::Flag(false)),
            _ => Err(InputError::ExpectedYesNo),
        },
    }
}

/// Interpret `input` and report the new value through `on_change`
pub fn edit<F>(
    field: &FormField,
    input: &str,
    current: Option<&FieldValue>,
    mut on_change: F,
) -> Result<(), InputError>
where
    F: FnMut(&str, FieldValue),
{
    let value = interpret(field, input, current)?;
    on_change(&field.field_id, value);
    Ok(())
}

fn parse_choice(input: &str, min: usize, max: usize) -> Result<usize, InputError> {
    let n: usize = input
        .parse()
        .map_err(|_| InputError::NotANumber(input.to_string()))?;
    if n < min || n > max {
        return Err(InputError::OutOfRange { min, max });
    }
    Ok(n)
}

impl ControlView {
    /// Terminal lines for this control, numbered `index` within its section
    pub fn lines(&self, index: usize) -> Vec<String> {
        let marker = if self.required { " *".red().to_string() } else { String::new() };
        let test_id = format!("[{}]", self.test_id).dimmed();
        let mut lines = Vec::new();

        match self.control {
            FieldControl::Toggle => {
                let check = if self.display == "yes" { "[x]" } else { "[ ]" };
                lines.push(format!("{:>3}. {} {}{} {}", index, check, self.label.bold(), marker, test_id));
            }
            _ => {
                lines.push(format!("{:>3}. {}{} {}", index, self.label.bold(), marker, test_id));
            }
        }

        match self.control {
            FieldControl::TextInput { .. } | FieldControl::TextArea => {
                if self.display.is_empty() {
                    let placeholder = self.placeholder.as_deref().unwrap_or("");
                    lines.push(format!("     > {}", placeholder.dimmed()));
                } else {
                    for line in self.display.lines() {
                        lines.push(format!("     > {}", line.cyan()));
                    }
                }
            }
            FieldControl::Select => {
                let none = self.options.iter().all(|o| !o.selected);
                lines.push(format!("     {} 0) {}", if none { "(•)" } else { "( )" }, SELECT_PLACEHOLDER));
                lines.extend(self.option_lines("(•)", "( )"));
            }
            FieldControl::RadioGroup => lines.extend(self.option_lines("(•)", "( )")),
            FieldControl::CheckboxGroup => lines.extend(self.option_lines("[x]", "[ ]")),
            FieldControl::Toggle => {}
        }

        if let Some(error) = &self.error {
            lines.push(format!("     {}", error.red()));
        }
        lines
    }

    fn option_lines(&self, on: &str, off: &str) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let mark = if o.selected { on.green().to_string() } else { off.to_string() };
                let test_id = o
                    .test_id
                    .as_ref()
                    .map(|t| format!(" [{}]", t).dimmed().to_string())
                    .unwrap_or_default();
                format!("     {} {}) {}{}", mark, i + 1, o.label, test_id)
            })
            .collect()
    }
}
