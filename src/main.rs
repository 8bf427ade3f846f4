//! dynaform CLI
//!
//! Terminal client for the dynamic form service.
//!
//! # Usage
//!
//! ```bash
//! dynaform fill
//! dynaform fill --roll-number R1 --name "Ada Lovelace" --format json
//! dynaform register --roll-number R1 --name "Ada Lovelace"
//! dynaform schema --roll-number R1 --format yaml
//! dynaform config set api_url http://localhost:8080
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynaform::{ApiClient, Config, OutputFormat, DEFAULT_API_URL};

mod commands;

#[derive(Parser)]
#[command(name = "dynaform")]
#[command(version)]
#[command(about = "Dynamic multi-step form client", long_about = None)]
struct Cli {
    /// Form service URL
    #[arg(long, env = "DYNAFORM_API_URL")]
    api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and fill out your form
    Fill {
        #[arg(long)]
        roll_number: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        roll_number: String,
        #[arg(long)]
        name: String,
    },
    /// Show the form assigned to a roll number
    Schema {
        #[arg(long)]
        roll_number: String,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::load(cli.profile.as_deref()).unwrap_or_default();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .ok()
                .or_else(|| config.log_level.clone())
                .unwrap_or_else(|| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api_url = cli
        .api_url
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.into());
    let format = cli.format.or_else(|| config.format()).unwrap_or_default();

    let result = run(cli.command, &api_url, &config, format, cli.profile.as_deref()).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    api_url: &str,
    config: &Config,
    format: OutputFormat,
    profile: Option<&str>,
) -> dynaform::Result<()> {
    let client = || ApiClient::new(api_url, config.request_timeout());

    match command {
        Commands::Fill { roll_number, name } => {
            commands::form::fill(&client()?, roll_number, name, format).await
        }
        Commands::Register { roll_number, name } => {
            commands::form::register(&client()?, roll_number, name).await
        }
        Commands::Schema { roll_number } => {
            commands::form::schema(&client()?, &roll_number, format).await
        }
        Commands::Config { action } => commands::config::handle(action, profile),
    }
}
