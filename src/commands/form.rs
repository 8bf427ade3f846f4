//! Form commands

use std::io;

use colored::Colorize;
use dynaform::session::NoticeKind;
use dynaform::{ApiClient, Console, Credentials, DynaformError, FormApi, OutputFormat, Result, Session};

/// Interactive session; skips the login view when both credentials are given
pub async fn fill(
    client: &ApiClient,
    roll_number: Option<String>,
    name: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let preset = match (roll_number, name) {
        (Some(roll_number), Some(name)) => Some(Credentials::new(roll_number, name)),
        _ => None,
    };

    let mut session = Session::new();
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    if let Some(submission) = console.run(&mut session, client, preset).await? {
        tracing::info!(
            "Submitted form {} for {}",
            submission.form_id,
            submission.roll_number
        );
        println!("{}", format.render_submission(&submission)?);
    }
    Ok(())
}

pub async fn register(client: &ApiClient, roll_number: String, name: String) -> Result<()> {
    let mut session = Session::new();
    let notice = session
        .register(client, &Credentials::new(roll_number, name))
        .await;
    match notice.kind {
        NoticeKind::Success => println!("{}", notice.message.green()),
        NoticeKind::Info => println!("{}", notice.message.yellow()),
        NoticeKind::Error => return Err(DynaformError::Rejected(notice.message)),
    }
    Ok(())
}

pub async fn schema(client: &ApiClient, roll_number: &str, format: OutputFormat) -> Result<()> {
    let response = client.get_form(roll_number).await?;
    println!("{}", format.render_schema(&response.form)?);
    Ok(())
}
