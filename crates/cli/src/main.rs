//! Lexline CLI entry point.
//!
//! Commands:
//! - `onboard`     Write a default config file
//! - `gateway`     Start the HTTP API server
//! - `ask`         Run a single exchange from the terminal
//! - `categories`  List the legal categories
//! - `doctor`      Check config and provider reachability

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "lexline",
    about = "Lexline: UK legal information chat service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(short, long)]
        message: String,

        /// Legal category tag (e.g. "housing"); classified automatically if omitted
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List the supported legal categories
    Categories,

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Ask { message, category } => commands::ask::run(message, category).await?,
        Commands::Categories => commands::categories::run(),
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
