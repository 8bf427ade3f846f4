//! Interactive terminal front end
//!
//! Drives a [`Session`] from line-oriented input: the login view, the form
//! sections with their controls, and the retry view after a failed load.

use std::io::{BufRead, Write};

use chrono::Utc;
use colored::Colorize;

use crate::api::FormApi;
use crate::error::Result;
use crate::form::{FormAction, FormEvent, FormState};
use crate::output::Submission;
use crate::render::{self, FieldControl};
use crate::section::{PrimaryAction, StepMarker};
use crate::session::{Credentials, NoticeKind, Session, View};
use crate::values::FieldValues;

const PROGRESS_WIDTH: usize = 20;

enum Flow {
    Continue,
    Quit,
    Submitted(Submission),
}

/// Terminal session over any input/output pair
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the form is submitted or the user quits.
    ///
    /// With `preset` credentials the login view is skipped on first entry.
    pub async fn run(
        &mut self,
        session: &mut Session,
        api: &dyn FormApi,
        preset: Option<Credentials>,
    ) -> Result<Option<Submission>> {
        if let Some(credentials) = preset {
            if session.login(&credentials).is_ok() {
                session.load_form(api).await;
            }
        }

        loop {
            let flow = match session.view() {
                View::Login { .. } => self.login_screen(session, api).await?,
                View::Loading { .. } => {
                    session.load_form(api).await;
                    Flow::Continue
                }
                View::LoadFailed { .. } => self.failed_screen(session, api).await?,
                View::Form(_) => self.form_screen(session)?,
            };

            match flow {
                Flow::Continue => {}
                Flow::Quit => return Ok(None),
                Flow::Submitted(submission) => {
                    writeln!(self.output, "{}", "Form submitted.".green().bold())?;
                    return Ok(Some(submission));
                }
            }
        }
    }

    async fn login_screen(&mut self, session: &mut Session, api: &dyn FormApi) -> Result<Flow> {
        writeln!(self.output, "\n{}", "Student Account".blue().bold())?;
        if let View::Login { notice: Some(notice) } = session.view() {
            let line = match notice.kind {
                NoticeKind::Success | NoticeKind::Info => notice.message.green(),
                NoticeKind::Error => notice.message.red(),
            };
            writeln!(self.output, "{}", line)?;
        }

        let Some(roll_number) = self.prompt("Roll Number: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(Flow::Quit);
        };
        let credentials = Credentials::new(roll_number, name);

        let Some(choice) = self.prompt("[l]ogin, [s]ign up, [q]uit: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.trim().to_ascii_lowercase().as_str() {
            "l" | "login" => {
                if session.login(&credentials).is_ok() {
                    writeln!(self.output, "{}", "Loading form...".dimmed())?;
                    session.load_form(api).await;
                }
            }
            "s" | "signup" | "sign up" => {
                writeln!(self.output, "{}", "Processing...".dimmed())?;
                session.register(api, &credentials).await;
            }
            "q" | "quit" => return Ok(Flow::Quit),
            other => writeln!(self.output, "{}", format!("Unknown choice: {}", other).red())?,
        }
        Ok(Flow::Continue)
    }

    async fn failed_screen(&mut self, session: &mut Session, api: &dyn FormApi) -> Result<Flow> {
        if let View::LoadFailed { message } = session.view() {
            writeln!(self.output, "{}", message.red())?;
        }
        let Some(choice) = self.prompt("[r]etry, [l]ogout, [q]uit: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.trim().to_ascii_lowercase().as_str() {
            "r" | "retry" => {
                session.load_form(api).await;
            }
            "l" | "logout" => session.logout(),
            "q" | "quit" => return Ok(Flow::Quit),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn form_screen(&mut self, session: &mut Session) -> Result<Flow> {
        let (field_count, primary, first) = match session.form() {
            Some(form) => {
                self.draw_form(session, form)?;
                let section = form.current_section();
                (section.section.fields.len(), section.primary_action(), section.is_first())
            }
            None => return Ok(Flow::Continue),
        };

        let mut prompt = format!(
            "Field 1-{} to edit, [f]ill all, [n] {}",
            field_count,
            primary.label().to_lowercase()
        );
        if !first {
            prompt.push_str(", [p]revious");
        }
        prompt.push_str(", [l]ogout, [q]uit: ");
        let Some(choice) = self.prompt(&prompt)? else {
            return Ok(Flow::Quit);
        };
        let choice = choice.trim().to_ascii_lowercase();

        if let Ok(n) = choice.parse::<usize>() {
            if (1..=field_count).contains(&n) {
                self.edit_field(session, n - 1)?;
            } else {
                writeln!(self.output, "{}", format!("No field {}", n).red())?;
            }
            return Ok(Flow::Continue);
        }

        let action = match choice.as_str() {
            "f" | "fill" => {
                for i in 0..field_count {
                    if !self.edit_field(session, i)? {
                        return Ok(Flow::Quit);
                    }
                }
                return Ok(Flow::Continue);
            }
            "n" | "next" if primary == PrimaryAction::Next => FormAction::Next,
            "n" | "next" | "s" | "submit" => FormAction::Submit,
            "p" | "prev" | "previous" => FormAction::Previous,
            "l" | "logout" => {
                session.logout();
                return Ok(Flow::Continue);
            }
            "q" | "quit" => return Ok(Flow::Quit),
            _ => {
                writeln!(self.output, "{}", format!("Unknown choice: {}", choice).red())?;
                return Ok(Flow::Continue);
            }
        };

        match session.dispatch(action) {
            Some(FormEvent::Blocked { errors, .. }) => {
                writeln!(self.output, "{}", format!("Please fix {} error(s) before continuing", errors).red())?;
            }
            Some(FormEvent::Submitted(values)) => {
                if let Some(submission) = submission(session, values) {
                    return Ok(Flow::Submitted(submission));
                }
            }
            Some(FormEvent::Advanced { .. }) | Some(FormEvent::Retreated { .. }) => {}
            None if choice.starts_with('s') && primary == PrimaryAction::Next => {
                writeln!(self.output, "{}", "Submit is available on the last section".yellow())?;
            }
            None => {}
        }
        Ok(Flow::Continue)
    }

    /// Prompt for one field of the active section. Returns false on end of input.
    fn edit_field(&mut self, session: &mut Session, index: usize) -> Result<bool> {
        let Some(form) = session.form() else {
            return Ok(true);
        };
        let Some(field) = form.current_section().section.fields.get(index).cloned() else {
            return Ok(true);
        };
        let current = form.values().get(&field.field_id).cloned();
        let error = form.errors().get(&field.field_id).map(|e| e.to_string());

        let view = render::describe(&field, current.as_ref(), error.as_deref());
        for line in view.lines(index + 1) {
            writeln!(self.output, "{}", line)?;
        }

        let control = FieldControl::for_field(&field);
        let hint = control.hint(field.options.len());
        let Some(mut input) = self.prompt(&format!("{} ({}): ", field.label, hint))? else {
            return Ok(false);
        };
        if control == FieldControl::TextArea && !input.is_empty() {
            while let Some(line) = self.prompt("  ... ")? {
                if line.is_empty() {
                    break;
                }
                input.push('\n');
                input.push_str(&line);
            }
        }

        let result = render::edit(&field, &input, current.as_ref(), |field_id, value| {
            session.dispatch(FormAction::Edit {
                field_id: field_id.to_string(),
                value,
            });
        });
        if let Err(e) = result {
            writeln!(self.output, "{}", e.to_string().red())?;
        }
        Ok(true)
    }

    fn draw_form(&mut self, session: &Session, form: &FormState) -> Result<()> {
        if let Some(user) = session.user() {
            let avatar = user.initial().map(String::from).unwrap_or_default();
            writeln!(
                self.output,
                "\n({}) {} {}",
                avatar.blue().bold(),
                user.name,
                format!("Roll: {}", user.roll_number).dimmed()
            )?;
        }

        let schema = form.schema();
        writeln!(self.output, "{}", schema.form_title.blue().bold())?;
        writeln!(
            self.output,
            "{}",
            format!("Form ID: {} | Version: {}", schema.form_id, schema.version).dimmed()
        )?;

        let section = form.current_section();
        let steps: Vec<String> = section
            .markers()
            .iter()
            .zip(&schema.sections)
            .enumerate()
            .map(|(i, (marker, s))| {
                let step = format!("{} {}", i + 1, s.title);
                match marker {
                    StepMarker::Completed => format!("✓ {}", step).green().to_string(),
                    StepMarker::Current => format!("● {}", step).blue().bold().to_string(),
                    StepMarker::Upcoming => format!("○ {}", step).dimmed().to_string(),
                }
            })
            .collect();
        writeln!(self.output, "{}", steps.join("  "))?;

        let percent = section.progress_percent() as usize;
        let filled = percent * PROGRESS_WIDTH / 100;
        writeln!(
            self.output,
            "[{}{}] {}%",
            "#".repeat(filled).blue(),
            "-".repeat(PROGRESS_WIDTH - filled),
            percent
        )?;

        writeln!(self.output, "\n{}", section.section.title.blue().bold())?;
        if !section.section.description.is_empty() {
            writeln!(self.output, "{}", section.section.description)?;
        }
        for (i, control) in section.controls(form.values(), form.errors()).iter().enumerate() {
            for line in control.lines(i + 1) {
                writeln!(self.output, "{}", line)?;
            }
        }
        Ok(())
    }

    /// Print `prompt` and read one line without its terminator; `None` at end of input
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

fn submission(session: &Session, values: FieldValues) -> Option<Submission> {
    let user = session.user()?;
    let form = session.form()?;
    Some(Submission {
        form_id: form.schema().form_id.clone(),
        version: form.schema().version.clone(),
        roll_number: user.roll_number.clone(),
        submitted_at: Utc::now(),
        values,
    })
}
