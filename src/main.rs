//! Course assistant CLI entry point.

use anyhow::Result;
use clap::Parser;
use course_rag::cli::{commands, Cli, Commands};
use course_rag::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("course_rag={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = Settings::load_from(cli.config.as_deref().map(std::path::Path::new))?;

    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ask { query, direct } => {
            commands::run_ask(&query, direct, settings).await?;
        }

        Commands::Search { query, k } => {
            commands::run_search(&query, k, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
