//! OpenForms CLI
//!
//! Command-line client for the OpenForms API.
//!
//! # Usage
//!
//! ```bash
//! openforms signup --name "Ada Lovelace" --email ada@example.com --password secret1
//! openforms login --email ada@example.com --password secret1
//! openforms forms create -f application.yaml
//! openforms forms list --format json
//! openforms fill <FORM_ID> -a "Name=Ada" -a "Colours=Red" --file "CV=./cv.pdf"
//! openforms responses list <FORM_ID>
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod commands;
mod config;
mod output;

const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "openforms")]
#[command(author = "OpenForms")]
#[command(version)]
#[command(about = "OpenForms Command Line Interface", long_about = None)]
struct Cli {
    /// API endpoint URL
    #[arg(long, env = "OPENFORMS_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "OPENFORMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "OPENFORMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage forms
    Forms {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// View responses
    Responses {
        #[command(subcommand)]
        action: ResponseCommands,
    },
    /// Answer a form and submit it
    Fill {
        form_id: String,
        /// LABEL=VALUE; repeat a checkbox label once per selected option
        #[arg(long = "answer", short)]
        answers: Vec<String>,
        /// LABEL=PATH for upload fields
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FormCommands {
    /// List forms (defaults to your own)
    List {
        #[arg(long)]
        creator: Option<String>,
    },
    /// Show a form's fields
    Show {
        id: String,
        /// Only show it if owned by this user
        #[arg(long)]
        creator: Option<String>,
    },
    /// Create a form from a YAML or JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
        /// Override the file's title
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete one of your forms
    Delete { id: String },
    /// Print a form's shareable link
    Link { id: String },
}

#[derive(Subcommand)]
enum ResponseCommands {
    /// List responses to one of your forms
    List { form_id: String },
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

async fn run(cli: Cli) -> Result<(), String> {
    let profile = cli.profile.as_deref();
    let mut config = config::Config::load(profile)?;

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.into());
    let client = client::ApiClient::new(
        &api_url,
        Duration::from_secs(cli.timeout),
        config.session.clone(),
    )?;

    match cli.command {
        Commands::Signup { name, email, password } => {
            commands::account::signup(&client, &name, &email, &password, cli.format).await
        }
        Commands::Login { email, password } => {
            commands::account::login(&client, &mut config, profile, &email, &password).await
        }
        Commands::Logout => commands::account::logout(&mut config, profile),
        Commands::Whoami => commands::account::whoami(&config, cli.format),
        Commands::Forms { action } => commands::forms::handle(action, &client, cli.format).await,
        Commands::Responses { action } => {
            commands::responses::handle(action, &client, cli.format).await
        }
        Commands::Fill { form_id, answers, files } => {
            commands::fill::handle(&client, &config, &form_id, &answers, &files, cli.format).await
        }
        Commands::Config { action } => commands::config::handle(action, &mut config, profile),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
