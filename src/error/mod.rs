//! Error handling module for SplitX
//!
//! These are adapter-level failures: what the media engine, the delivery
//! surface or the config loader report. The application layer wraps them into
//! [`crate::domain::errors::DomainError`] before they reach a caller.

use thiserror::Error;

/// Main error type for SplitX adapters
#[derive(Error, Debug)]
pub enum SplitXError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// FFmpeg initialization error
    #[error("Failed to initialize FFmpeg: {message}")]
    FFmpegInitError { message: String },

    /// Media probe error
    #[error("Failed to probe media file: {message}")]
    ProbeError { message: String },

    /// Stream-copy cut error
    #[error("Clipping operation failed: {message}")]
    ClippingError { message: String },

    /// Named entry is not present in the engine workspace
    #[error("Workspace entry not found: {name}")]
    WorkspaceEntryMissing { name: String },

    /// Delivery handle was never issued or was already released
    #[error("Unknown delivery handle: {id}")]
    UnknownDeliveryHandle { id: u64 },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Background task failed to complete
    #[error("Background task failed: {message}")]
    TaskError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// FFmpeg error
    #[error("FFmpeg error: {0}")]
    FFmpegError(#[from] ffmpeg_next::Error),
}

/// Result type alias for SplitX adapter operations
pub type SplitXResult<T> = std::result::Result<T, SplitXError>;
