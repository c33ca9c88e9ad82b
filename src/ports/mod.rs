// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::model::*;
use crate::error::SplitXResult;

/// Port for the media engine and its workspace
///
/// The workspace holds at most the ingested source plus one produced output.
/// All calls are sequenced by the segment processor.
#[async_trait]
pub trait MediaEnginePort: Send + Sync {
    /// Ingest the source file under `name`
    async fn write_input(&self, name: &str, source: &Path) -> SplitXResult<()>;

    /// Read the container duration of an ingested input, in seconds
    async fn probe_duration(&self, name: &str) -> SplitXResult<f64>;

    /// Stream-copy the requested range into a new workspace output, no re-encoding
    async fn cut(&self, request: &CutRequest) -> SplitXResult<()>;

    /// Read the bytes of a produced output
    async fn read_output(&self, name: &str) -> SplitXResult<Vec<u8>>;

    /// Remove a produced output from the workspace
    async fn remove_output(&self, name: &str) -> SplitXResult<()>;

    /// Remove an ingested input from the workspace
    async fn remove_input(&self, name: &str) -> SplitXResult<()>;
}

/// Port for handing produced bytes to the user
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Expose bytes for saving under a suggested file name
    async fn offer(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        media_type: &str,
    ) -> SplitXResult<DeliveryHandle>;

    /// Release a handle previously returned by `offer`
    async fn release(&self, handle: &DeliveryHandle) -> SplitXResult<()>;
}

/// Port for lifecycle notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LifecycleEvent);
}
