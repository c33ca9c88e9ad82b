// Filesystem delivery adapter - Saves delivered segments into an output directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::model::*;
use crate::error::{SplitXError, SplitXResult};
use crate::ports::*;

/// Delivery surface backed by a directory
///
/// `offer` writes the bytes to `<output_dir>/<file_name>` and issues a handle.
/// Releasing a handle forgets it; the saved file belongs to the user and stays.
pub struct FsDeliveryAdapter {
    output_dir: PathBuf,
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, PathBuf>>,
}

impl FsDeliveryAdapter {
    /// Create new delivery adapter, creating the output directory if needed
    pub fn new(output_dir: impl AsRef<Path>) -> SplitXResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of handles issued and not yet released
    pub fn live_handles(&self) -> usize {
        self.live.lock().len()
    }

    /// Reject names that would escape the output directory
    fn target_path(&self, file_name: &str) -> SplitXResult<PathBuf> {
        let candidate = Path::new(file_name);
        match candidate.file_name() {
            Some(name) if name == candidate.as_os_str() => Ok(self.output_dir.join(name)),
            _ => Err(SplitXError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid delivery file name: {}", file_name),
            ))),
        }
    }
}

#[async_trait]
impl DeliveryPort for FsDeliveryAdapter {
    async fn offer(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        media_type: &str,
    ) -> SplitXResult<DeliveryHandle> {
        let target = self.target_path(file_name)?;
        tokio::fs::write(&target, &bytes).await?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.lock().insert(id, target.clone());
        debug!(
            handle = id,
            file = %target.display(),
            media_type,
            size = bytes.len(),
            "Delivered file"
        );

        Ok(DeliveryHandle {
            id,
            location: target.to_string_lossy().into_owned(),
        })
    }

    async fn release(&self, handle: &DeliveryHandle) -> SplitXResult<()> {
        match self.live.lock().remove(&handle.id) {
            Some(_) => Ok(()),
            None => Err(SplitXError::UnknownDeliveryHandle { id: handle.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_offer_writes_file_and_release_forgets_handle() {
        let dir = TempDir::new().unwrap();
        let adapter = FsDeliveryAdapter::new(dir.path().join("out")).unwrap();

        let handle = adapter
            .offer(b"segment bytes".to_vec(), "clip-1.mp4", "video/mp4")
            .await
            .unwrap();
        let saved = std::fs::read(dir.path().join("out").join("clip-1.mp4")).unwrap();
        assert_eq!(saved, b"segment bytes");
        assert_eq!(adapter.live_handles(), 1);

        adapter.release(&handle).await.unwrap();
        assert_eq!(adapter.live_handles(), 0);
        assert!(dir.path().join("out").join("clip-1.mp4").exists());

        let err = adapter.release(&handle).await.unwrap_err();
        assert!(matches!(err, SplitXError::UnknownDeliveryHandle { .. }));
    }

    #[tokio::test]
    async fn test_offer_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let adapter = FsDeliveryAdapter::new(dir.path()).unwrap();
        assert!(adapter
            .offer(vec![1, 2, 3], "../escape.mp4", "video/mp4")
            .await
            .is_err());
        assert_eq!(adapter.live_handles(), 0);
    }
}
