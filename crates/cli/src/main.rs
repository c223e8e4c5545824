//! Shopfront CLI - mock REST API, tokens and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Serve the json-server style mock API on port 3000
//! shopfront mock-api --port 3000
//!
//! # Same, with no products or users
//! shopfront mock-api --empty
//!
//! # Fabricate a token signed with SHOPFRONT_TOKEN_SECRET
//! shopfront token issue -e lan@example.com -n "Lan"
//!
//! # Show what a token carries
//! shopfront token decode <token>
//!
//! # POST the sample catalog to a running API
//! shopfront seed --api http://localhost:3000
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::IpAddr;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the in-memory mock REST API
    MockApi {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Start without the sample products and users
        #[arg(long)]
        empty: bool,
    },
    /// Issue or inspect tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// POST the bundled sample data to a REST API
    Seed {
        /// API base URL
        #[arg(long, default_value = "http://localhost:3000")]
        api: Url,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Fabricate a signed token
    Issue {
        #[arg(short, long)]
        email: String,

        /// Display name (defaults to the email's local part)
        #[arg(short, long)]
        name: Option<String>,

        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
    /// Print a token's claims as JSON (signature not checked)
    Decode { token: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_cli=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::MockApi { host, port, empty } => {
            commands::mock_api::run(host, port, empty).await?;
        }
        Commands::Token { action } => match action {
            TokenAction::Issue {
                email,
                name,
                ttl_hours,
            } => {
                println!("{}", commands::token::issue(&email, name.as_deref(), ttl_hours)?);
            }
            TokenAction::Decode { token } => {
                println!("{}", commands::token::describe(&token, chrono::Utc::now())?);
            }
        },
        Commands::Seed { api } => {
            let summary = commands::seed::run(&api).await?;
            if summary.failed > 0 {
                return Err(format!("{} records were rejected", summary.failed).into());
            }
        }
    }
    Ok(())
}
