// Split session - Loads a source, keeps the interval and replans on change

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::app::processor::SegmentProcessor;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{media_type_for, plan_for_source};
use crate::ports::*;

/// One user's working session: a single source, one interval, one processor
pub struct SplitSession {
    engine: Arc<dyn MediaEnginePort>,
    events: Arc<dyn EventSink>,
    processor: SegmentProcessor,
    source: Mutex<Option<MediaSource>>,
    interval: Mutex<SplitInterval>,
}

impl SplitSession {
    /// Create new session with injected ports
    pub fn new(
        engine: Arc<dyn MediaEnginePort>,
        delivery: Arc<dyn DeliveryPort>,
        events: Arc<dyn EventSink>,
        interval: SplitInterval,
    ) -> Self {
        let processor = SegmentProcessor::new(Arc::clone(&engine), delivery, Arc::clone(&events));
        Self {
            engine,
            events,
            processor,
            source: Mutex::new(None),
            interval: Mutex::new(interval),
        }
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.source.lock().clone()
    }

    pub fn interval(&self) -> SplitInterval {
        *self.interval.lock()
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.processor.segments()
    }

    pub fn processor(&self) -> &SegmentProcessor {
        &self.processor
    }

    fn load_failed(&self, error: DomainError) -> DomainError {
        warn!(error = %error, "Load failed");
        self.events.emit(LifecycleEvent::LoadFailed {
            reason: error.to_string(),
        });
        error
    }

    /// Load a video file, replacing any previous source, and plan its segments
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<MediaSource, DomainError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.events
            .emit(LifecycleEvent::LoadingStarted { name: name.clone() });
        info!(file = %path.display(), "Loading video");

        if name.is_empty() || media_type_for(&name).is_none() {
            return Err(self.load_failed(DomainError::InvalidInput(format!(
                "'{}' is not a supported video file",
                path.display()
            ))));
        }

        let previous = self.source.lock().clone();
        if let Some(previous) = previous {
            self.processor
                .reset()
                .await
                .map_err(|e| self.load_failed(e))?;
            *self.source.lock() = None;
            if let Err(e) = self.engine.remove_input(&previous.name).await {
                warn!(file = %previous.name, error = %e, "Failed to remove previous input");
            }
        }

        if let Err(e) = self.engine.write_input(&name, path).await {
            return Err(self.load_failed(DomainError::EngineWriteFailure {
                name,
                reason: e.to_string(),
            }));
        }

        let duration_seconds = match self.engine.probe_duration(&name).await {
            Ok(duration) => duration,
            Err(e) => {
                if let Err(remove_err) = self.engine.remove_input(&name).await {
                    warn!(file = %name, error = %remove_err, "Failed to remove unprobed input");
                }
                return Err(self.load_failed(DomainError::ProbeFailure {
                    name,
                    reason: e.to_string(),
                }));
            }
        };

        let source = MediaSource::new(name, duration_seconds, path);
        let plan = plan_for_source(&source, self.interval());
        info!(
            file = %source.name,
            duration = source.duration_seconds,
            segments = plan.len(),
            "Video loaded"
        );
        self.processor.install_plan(plan).await?;
        *self.source.lock() = Some(source.clone());
        Ok(source)
    }

    /// Change the split interval; the whole plan is rebuilt
    pub async fn set_interval(&self, interval: SplitInterval) -> Result<(), DomainError> {
        if self.processor.is_processing() {
            return Err(DomainError::Busy);
        }

        if let Some(source) = self.source() {
            self.processor
                .install_plan(plan_for_source(&source, interval))
                .await?;
        }
        *self.interval.lock() = interval;
        info!(interval = %interval, "Split interval changed");
        Ok(())
    }

    /// Cut and deliver one segment
    pub async fn process(&self, segment_id: usize) -> Result<Delivery, DomainError> {
        if self.source.lock().is_none() {
            return Err(DomainError::NoSource);
        }
        self.processor.request_process(segment_id).await
    }

    /// Deliver the already processed segment again
    pub async fn deliver(&self, segment_id: usize) -> Result<Delivery, DomainError> {
        if self.source.lock().is_none() {
            return Err(DomainError::NoSource);
        }
        self.processor.deliver(segment_id).await
    }

    /// Release the cached artifact and remove the source from the engine
    pub async fn close(&self) -> Result<(), DomainError> {
        self.processor.reset().await?;
        let previous = self.source.lock().take();
        if let Some(previous) = previous {
            if let Err(e) = self.engine.remove_input(&previous.name).await {
                warn!(file = %previous.name, error = %e, "Failed to remove input");
            }
        }
        Ok(())
    }
}
