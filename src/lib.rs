//! SplitX Video Splitter Library
//!
//! Plans fixed-length segments of a video and materializes them one at a time
//! through a media engine doing lossless stream-copy cuts.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{SegmentProcessor, SplitSession};
pub use domain::errors::DomainError;
pub use domain::model::{
    Delivery, DeliveryHandle, LifecycleEvent, MediaSource, Segment, SegmentPlan, SegmentStatus,
    SplitInterval,
};
pub use domain::rules::plan_segments;
pub use error::{SplitXError, SplitXResult};

/// Initialize SplitX library
pub fn init() -> SplitXResult<()> {
    // Initialize FFmpeg
    ffmpeg_next::init().map_err(|e| SplitXError::FFmpegInitError {
        message: e.to_string(),
    })?;

    Ok(())
}
