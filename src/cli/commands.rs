//! Command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::adapters::SplitterConfig;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::session::SplitSession;
use crate::cli::args::{PlanArgs, SplitArgs};
use crate::domain::model::{EventRecord, LifecycleEvent, MediaSource, Segment, SplitInterval};
use crate::utils::time::format_clock;

#[derive(Serialize)]
struct PlanReport<'a> {
    source: &'a str,
    duration_seconds: f64,
    interval_minutes: u8,
    segments: &'a [Segment],
}

fn apply_interval(config: &mut SplitterConfig, interval: Option<u8>) -> Result<()> {
    if let Some(minutes) = interval {
        config.interval = SplitInterval::new(minutes)?;
    }
    Ok(())
}

fn print_table(source: &MediaSource, interval: SplitInterval, segments: &[Segment]) {
    println!(
        "{} ({}), split every {}",
        source.name,
        format_clock(source.duration_seconds),
        interval
    );
    if segments.is_empty() {
        println!("No segments.");
        return;
    }

    let width = segments
        .iter()
        .map(|s| s.output_name.len())
        .max()
        .unwrap_or(0)
        .max("Segment".len());
    println!("{:>3}  {:<width$}  {:>8}  {:>8}", "#", "Segment", "From", "To");
    for segment in segments {
        println!(
            "{:>3}  {:<width$}  {:>8}  {:>8}",
            segment.number(),
            segment.output_name,
            format_clock(segment.from_seconds),
            format_clock(segment.to_seconds),
        );
    }
}

/// Render lifecycle events as short status lines on stderr
async fn print_events(mut events: UnboundedReceiver<EventRecord>) {
    while let Some(record) = events.recv().await {
        let line = match &record.event {
            LifecycleEvent::LoadingStarted { name } => format!("{} - loading", name),
            LifecycleEvent::LoadFailed { reason } => format!("load failed: {}", reason),
            LifecycleEvent::ProcessingStarted { segment_id } => {
                format!("segment {} - processing", segment_id + 1)
            }
            LifecycleEvent::ProcessingSucceeded { segment_id } => {
                format!("segment {} - completed", segment_id + 1)
            }
            LifecycleEvent::ProcessingFailed { segment_id, reason } => {
                format!("segment {} - failed: {}", segment_id + 1, reason)
            }
        };
        eprintln!("[{}] {}", record.at.format("%H:%M:%S"), line);
    }
}

/// Execute the plan command
pub async fn plan(args: PlanArgs, mut config: SplitterConfig) -> Result<()> {
    apply_interval(&mut config, args.interval)?;
    info!(input = %args.input.display(), interval = %config.interval, "Planning");

    let container =
        DefaultAppContainer::new(&config).context("Failed to initialize media engine")?;
    let session = container.session();

    let source = session
        .load(&args.input)
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let segments = session.segments();

    if args.json {
        let report = PlanReport {
            source: &source.name,
            duration_seconds: source.duration_seconds,
            interval_minutes: session.interval().minutes(),
            segments: &segments,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&source, session.interval(), &segments);
    }

    session.close().await?;
    Ok(())
}

/// Load the input and process the requested 1-based segments in order
async fn run_split(session: &SplitSession, input: &Path, requested: &[usize]) -> Result<()> {
    session
        .load(input)
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let total = session.segments().len();
    let targets: Vec<usize> = if requested.is_empty() {
        (0..total).collect()
    } else {
        requested.iter().map(|n| n - 1).collect()
    };
    if let Some(out_of_range) = targets.iter().find(|&&id| id >= total) {
        bail!(
            "Segment {} does not exist; the video has {} segments",
            out_of_range + 1,
            total
        );
    }

    let mut failures = 0;
    for &id in &targets {
        match session.process(id).await {
            Ok(delivery) => println!(
                "{}\t{}\t{} bytes",
                delivery.file_name, delivery.handle.location, delivery.size_bytes
            ),
            Err(e) => {
                error!(segment = id + 1, error = %e, "Segment failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} segments failed", failures, targets.len());
    }
    info!(segments = targets.len(), "Split completed");
    Ok(())
}

/// Execute the split command
pub async fn split(args: SplitArgs, mut config: SplitterConfig) -> Result<()> {
    apply_interval(&mut config, args.interval)?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    info!(
        input = %args.input.display(),
        interval = %config.interval,
        output_dir = %config.output_dir.display(),
        "Splitting"
    );

    let mut container =
        DefaultAppContainer::new(&config).context("Failed to initialize media engine")?;
    let printer = container.take_events().map(|events| tokio::spawn(print_events(events)));
    let session = container.session();

    let outcome = run_split(&session, &args.input, &args.segments).await;
    let closed = session.close().await;

    // The printer ends once the last event sender is gone.
    drop(session);
    drop(container);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    outcome?;
    closed?;
    Ok(())
}
