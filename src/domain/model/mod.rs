// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A loaded video whose duration is known
///
/// `path` is the caller-owned content handle. Nothing in the core writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub name: String,
    pub duration_seconds: f64,
    pub path: PathBuf,
}

impl MediaSource {
    /// Create a new media source
    pub fn new(name: impl Into<String>, duration_seconds: f64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            path: path.into(),
        }
    }

    /// Whether the duration has been probed to a usable value
    pub fn has_duration(&self) -> bool {
        self.duration_seconds.is_finite() && self.duration_seconds > 0.0
    }
}

/// Split interval in whole minutes, always within `[1, 60]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SplitInterval(u8);

impl SplitInterval {
    pub const MIN_MINUTES: u8 = 1;
    pub const MAX_MINUTES: u8 = 60;
    pub const DEFAULT_MINUTES: u8 = 30;

    /// Create a split interval, rejecting values outside `[1, 60]`
    pub fn new(minutes: u8) -> Result<Self, DomainError> {
        if !(Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(DomainError::InvalidInput(format!(
                "Split interval must be between {} and {} minutes, got {}",
                Self::MIN_MINUTES,
                Self::MAX_MINUTES,
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u8 {
        self.0
    }

    /// Interval length in seconds
    pub fn seconds(&self) -> u32 {
        u32::from(self.0) * 60
    }
}

impl Default for SplitInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

impl TryFrom<u8> for SplitInterval {
    type Error = DomainError;

    fn try_from(minutes: u8) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<SplitInterval> for u8 {
    fn from(interval: SplitInterval) -> Self {
        interval.0
    }
}

impl fmt::Display for SplitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

/// Processing status of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Pending,
    Processing,
    Processed,
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SegmentStatus::Pending => "pending",
            SegmentStatus::Processing => "processing",
            SegmentStatus::Processed => "processed",
        };
        f.write_str(label)
    }
}

/// A contiguous time range of the source with its planned output name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    pub from_seconds: f64,
    pub to_seconds: f64,
    pub output_name: String,
    pub status: SegmentStatus,
}

impl Segment {
    /// Length of the segment in seconds
    pub fn duration(&self) -> f64 {
        self.to_seconds - self.from_seconds
    }

    /// 1-based ordinal, as used in output names
    pub fn number(&self) -> usize {
        self.id + 1
    }
}

/// The ordered segments of one source plus what the processor needs to cut them
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SegmentPlan {
    /// Name the source was ingested under in the engine workspace
    pub input_name: String,
    /// Media type handed to the delivery surface
    pub media_type: String,
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    pub fn new(
        input_name: impl Into<String>,
        media_type: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            input_name: input_name.into(),
            media_type: media_type.into(),
            segments,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Segment> {
        self.segments.get_mut(id)
    }
}

/// Stream-copy cut of one time range from an ingested input
#[derive(Debug, Clone, PartialEq)]
pub struct CutRequest {
    pub input_name: String,
    pub output_name: String,
    pub from_seconds: f64,
    pub to_seconds: f64,
}

impl CutRequest {
    /// Build the cut for a planned segment
    pub fn for_segment(input_name: &str, segment: &Segment) -> Self {
        Self {
            input_name: input_name.to_string(),
            output_name: segment.output_name.clone(),
            from_seconds: segment.from_seconds,
            to_seconds: segment.to_seconds,
        }
    }
}

/// Reference issued by the delivery surface; must be released once superseded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryHandle {
    pub id: u64,
    pub location: String,
}

/// Result of a successful delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub segment_id: usize,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub handle: DeliveryHandle,
}

/// The single artifact retained by the processor
#[derive(Debug, Clone, PartialEq)]
pub struct ProducedArtifact {
    pub segment_id: usize,
    /// Workspace name the bytes were produced under
    pub output_name: String,
    /// `None` until delivered, or after the handle was released by a partial eviction
    pub delivery: Option<DeliveryHandle>,
}

/// Lifecycle notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LifecycleEvent {
    LoadingStarted { name: String },
    LoadFailed { reason: String },
    ProcessingStarted { segment_id: usize },
    ProcessingSucceeded { segment_id: usize },
    ProcessingFailed { segment_id: usize, reason: String },
}

/// A lifecycle event stamped with the time it was emitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LifecycleEvent,
}

impl EventRecord {
    pub fn now(event: LifecycleEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests;
