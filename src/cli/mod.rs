//! CLI module for SplitX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// SplitX video splitter
///
/// Splits a video into fixed-length clips with lossless stream copy.
#[derive(Parser)]
#[command(name = "splitter")]
#[command(about = "SplitX - Split a video into fixed-length clips without re-encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (defaults to ./splitter.toml when present)
    #[arg(long, global = true, env = "SPLITTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show how a video would be split
    Plan(args::PlanArgs),
    /// Cut segments and save them to the output directory
    Split(args::SplitArgs),
}
