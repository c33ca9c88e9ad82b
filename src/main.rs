//! SplitX video splitter
//!
//! Splits a video into fixed-length clips with lossless stream copy, one clip
//! at a time.
//!
//! # Usage
//!
//! ```bash
//! splitter plan --input "talk.mp4" --interval 10
//! splitter split --input "talk.mp4" --interval 10 --segment 2 --output-dir clips
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use splitx_cli::adapters::TomlConfigAdapter;
use splitx_cli::cli::{commands, Cli, Commands};

/// Initialize logging; RUST_LOG wins over the configured level
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Main entry point for the SplitX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfigAdapter::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(
        cli.log_level.as_deref().unwrap_or(&config.log_level),
        cli.log_json,
    );

    info!("Starting SplitX");

    match cli.command {
        Commands::Plan(args) => commands::plan(args, config).await?,
        Commands::Split(args) => commands::split(args, config).await?,
    }

    Ok(())
}
