// Domain errors - Outcomes reported at the processor and session boundary

use thiserror::Error;

/// Domain-specific error types
///
/// Every variant is a recovered, segment- or load-scoped outcome. None of
/// them invalidates the current plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Offered file is not a video, or an argument is out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The media engine refused to ingest the source file
    #[error("Unable to write '{name}' into the engine workspace: {reason}")]
    EngineWriteFailure { name: String, reason: String },

    /// The media engine could not read the source duration
    #[error("Unable to probe '{name}': {reason}")]
    ProbeFailure { name: String, reason: String },

    /// Releasing the previously produced artifact failed
    #[error("Unable to release artifact of segment {held_segment_id}: {reason}")]
    EvictionFailure {
        held_segment_id: usize,
        reason: String,
    },

    /// The cut failed for one segment
    #[error("Segment {segment_id} failed: {reason}")]
    ProcessingFailure { segment_id: usize, reason: String },

    /// The produced bytes are no longer resident in the engine workspace
    #[error("Segment {segment_id} is not available for delivery: {reason}")]
    ArtifactUnavailable { segment_id: usize, reason: String },

    /// The delivery surface refused the bytes; the artifact stays cached and can be delivered again
    #[error("Segment {segment_id} could not be delivered: {reason}")]
    DeliveryFailure { segment_id: usize, reason: String },

    /// Another request currently holds the processing gate
    #[error("Another segment is being processed")]
    Busy,

    /// Segment id is not part of the current plan
    #[error("Unknown segment: {0}")]
    UnknownSegment(usize),

    /// No source has been loaded yet
    #[error("No video loaded")]
    NoSource,
}

impl DomainError {
    /// Segment the outcome is scoped to, if any
    pub fn segment_id(&self) -> Option<usize> {
        match self {
            DomainError::EvictionFailure { held_segment_id, .. } => Some(*held_segment_id),
            DomainError::ProcessingFailure { segment_id, .. }
            | DomainError::ArtifactUnavailable { segment_id, .. }
            | DomainError::DeliveryFailure { segment_id, .. } => Some(*segment_id),
            DomainError::UnknownSegment(id) => Some(*id),
            _ => None,
        }
    }
}
