//! Output formatting

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::schema::FormSchema;
use crate::values::FieldValues;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// A completed form, as handed to the submission callback
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: String,
    pub version: String,
    pub roll_number: String,
    pub submitted_at: DateTime<Utc>,
    pub values: FieldValues,
}

#[derive(Tabled)]
struct ValueRow {
    field: String,
    value: String,
}

#[derive(Tabled)]
struct FieldRow {
    section: String,
    field: String,
    #[tabled(rename = "type")]
    kind: String,
    required: bool,
    constraints: String,
}

impl OutputFormat {
    pub fn render_submission(&self, submission: &Submission) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(submission)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(submission)?),
            OutputFormat::Table => {
                let rows: Vec<ValueRow> = submission
                    .values
                    .iter()
                    .map(|(id, v)| ValueRow {
                        field: id.to_string(),
                        value: v.to_string(),
                    })
                    .collect();
                Ok(format!(
                    "Form {} (version {}) submitted by {} at {}\n{}",
                    submission.form_id,
                    submission.version,
                    submission.roll_number,
                    submission.submitted_at.to_rfc3339(),
                    Table::new(rows).with(Style::modern())
                ))
            }
        }
    }

    pub fn render_schema(&self, schema: &FormSchema) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(schema)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(schema)?),
            OutputFormat::Table => {
                let rows: Vec<FieldRow> = schema
                    .sections
                    .iter()
                    .flat_map(|s| {
                        s.fields.iter().map(move |f| FieldRow {
                            section: s.title.clone(),
                            field: f.field_id.clone(),
                            kind: f.kind().name().to_string(),
                            required: f.required,
                            constraints: constraints(f.min_length, f.max_length, f.options.len()),
                        })
                    })
                    .collect();
                Ok(format!(
                    "{} ({}, version {})\n{}",
                    schema.form_title,
                    schema.form_id,
                    schema.version,
                    Table::new(rows).with(Style::modern())
                ))
            }
        }
    }
}

fn constraints(min: Option<usize>, max: Option<usize>, options: usize) -> String {
    let mut parts = Vec::new();
    if let Some(min) = min {
        parts.push(format!("min {}", min));
    }
    if let Some(max) = max {
        parts.push(format!("max {}", max));
    }
    if options > 0 {
        parts.push(format!("{} options", options));
    }
    parts.join(", ")
}
