//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

fn parse_interval(s: &str) -> Result<u8, String> {
    number_range(s, 1, 60)
}

fn parse_segment_number(s: &str) -> Result<usize, String> {
    number_range(s, 1, usize::MAX)
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Split interval in minutes (1-60)
    #[arg(short = 'm', long, value_name = "MINUTES", value_parser = parse_interval)]
    pub interval: Option<u8>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Split interval in minutes (1-60)
    #[arg(short = 'm', long, value_name = "MINUTES", value_parser = parse_interval)]
    pub interval: Option<u8>,

    /// Segment number to produce, 1-based (repeatable; default: all segments)
    #[arg(short, long = "segment", value_name = "N", value_parser = parse_segment_number)]
    pub segments: Vec<usize>,

    /// Directory the clips are saved to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}
