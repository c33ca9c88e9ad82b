// Segment processor - Materializes one segment at a time and delivers it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::*;

struct ProcessorState {
    plan: SegmentPlan,
    artifact: Option<ProducedArtifact>,
}

/// Releases the processing gate when dropped
struct GateGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Orchestrates the media engine for a fixed plan
///
/// Holds at most one produced artifact. Every operation that touches the engine
/// workspace goes through a single gate; a call made while the gate is held is
/// rejected with [`DomainError::Busy`] and changes nothing.
pub struct SegmentProcessor {
    engine: Arc<dyn MediaEnginePort>,
    delivery: Arc<dyn DeliveryPort>,
    events: Arc<dyn EventSink>,
    state: Mutex<ProcessorState>,
    in_flight: AtomicBool,
}

impl SegmentProcessor {
    /// Create a processor with injected engine, delivery and event ports
    pub fn new(
        engine: Arc<dyn MediaEnginePort>,
        delivery: Arc<dyn DeliveryPort>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine,
            delivery,
            events,
            state: Mutex::new(ProcessorState {
                plan: SegmentPlan::default(),
                artifact: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    fn acquire_gate(&self) -> Result<GateGuard<'_>, DomainError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DomainError::Busy)?;
        Ok(GateGuard {
            flag: &self.in_flight,
        })
    }

    /// Whether an operation currently holds the gate
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the current plan
    pub fn plan(&self) -> SegmentPlan {
        self.state.lock().plan.clone()
    }

    /// Snapshot of the current segments and their statuses
    pub fn segments(&self) -> Vec<Segment> {
        self.state.lock().plan.segments.clone()
    }

    pub fn status_of(&self, segment_id: usize) -> Option<SegmentStatus> {
        self.state.lock().plan.get(segment_id).map(|s| s.status)
    }

    /// Segment whose artifact currently occupies the cache slot
    pub fn artifact_segment(&self) -> Option<usize> {
        self.state.lock().artifact.as_ref().map(|a| a.segment_id)
    }

    /// Replace the plan, releasing the cached artifact first
    ///
    /// If the release fails the old plan and artifact are kept.
    pub async fn install_plan(&self, plan: SegmentPlan) -> Result<(), DomainError> {
        let _gate = self.acquire_gate()?;
        self.evict().await?;

        debug!(
            input = %plan.input_name,
            segments = plan.len(),
            "Installing segment plan"
        );
        self.state.lock().plan = plan;
        Ok(())
    }

    /// Release the cached artifact and drop the plan
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.install_plan(SegmentPlan::default()).await
    }

    /// Cut one segment and deliver it
    pub async fn request_process(&self, segment_id: usize) -> Result<Delivery, DomainError> {
        let _gate = self.acquire_gate()?;

        let request = {
            let state = self.state.lock();
            let segment = state
                .plan
                .get(segment_id)
                .ok_or(DomainError::UnknownSegment(segment_id))?;
            CutRequest::for_segment(&state.plan.input_name, segment)
        };

        info!(
            segment_id,
            output = %request.output_name,
            from = request.from_seconds,
            to = request.to_seconds,
            "Processing segment"
        );

        if let Err(e) = self.evict().await {
            self.events.emit(LifecycleEvent::ProcessingFailed {
                segment_id,
                reason: e.to_string(),
            });
            return Err(e);
        }

        self.mark_processing(segment_id);
        self.events
            .emit(LifecycleEvent::ProcessingStarted { segment_id });

        match self.engine.cut(&request).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    if let Some(segment) = state.plan.get_mut(segment_id) {
                        segment.status = SegmentStatus::Processed;
                    }
                    state.artifact = Some(ProducedArtifact {
                        segment_id,
                        output_name: request.output_name.clone(),
                        delivery: None,
                    });
                }
                info!(segment_id, output = %request.output_name, "Segment processed");
                self.events
                    .emit(LifecycleEvent::ProcessingSucceeded { segment_id });

                self.deliver_cached(segment_id).await
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    if let Some(segment) = state.plan.get_mut(segment_id) {
                        segment.status = SegmentStatus::Pending;
                    }
                }
                let reason = e.to_string();
                warn!(segment_id, error = %reason, "Segment processing failed");
                self.events.emit(LifecycleEvent::ProcessingFailed {
                    segment_id,
                    reason: reason.clone(),
                });
                Err(DomainError::ProcessingFailure { segment_id, reason })
            }
        }
    }

    /// Deliver an already processed segment again without re-cutting it
    pub async fn deliver(&self, segment_id: usize) -> Result<Delivery, DomainError> {
        let _gate = self.acquire_gate()?;
        self.deliver_cached(segment_id).await
    }

    /// Target becomes Processing; only one segment may show as Processed at a time
    fn mark_processing(&self, segment_id: usize) {
        let mut state = self.state.lock();
        for segment in state.plan.segments.iter_mut() {
            if segment.id == segment_id {
                segment.status = SegmentStatus::Processing;
            } else if segment.status == SegmentStatus::Processed {
                segment.status = SegmentStatus::Pending;
            }
        }
    }

    /// Release the delivery handle and the workspace output of the cached artifact
    async fn evict(&self) -> Result<(), DomainError> {
        let cached = self.state.lock().artifact.clone();
        let artifact = match cached {
            Some(artifact) => artifact,
            None => return Ok(()),
        };

        if let Some(handle) = &artifact.delivery {
            if let Err(e) = self.delivery.release(handle).await {
                warn!(
                    segment_id = artifact.segment_id,
                    error = %e,
                    "Failed to release delivery handle"
                );
                return Err(DomainError::EvictionFailure {
                    held_segment_id: artifact.segment_id,
                    reason: e.to_string(),
                });
            }
            let mut state = self.state.lock();
            if let Some(held) = state.artifact.as_mut() {
                held.delivery = None;
            }
        }

        if let Err(e) = self.engine.remove_output(&artifact.output_name).await {
            warn!(
                segment_id = artifact.segment_id,
                output = %artifact.output_name,
                error = %e,
                "Failed to remove workspace output"
            );
            return Err(DomainError::EvictionFailure {
                held_segment_id: artifact.segment_id,
                reason: e.to_string(),
            });
        }

        self.state.lock().artifact = None;
        debug!(
            segment_id = artifact.segment_id,
            output = %artifact.output_name,
            "Evicted artifact"
        );
        Ok(())
    }

    async fn deliver_cached(&self, segment_id: usize) -> Result<Delivery, DomainError> {
        let (output_name, media_type, previous) = {
            let state = self.state.lock();
            let segment = state
                .plan
                .get(segment_id)
                .ok_or(DomainError::UnknownSegment(segment_id))?;
            if segment.status != SegmentStatus::Processed {
                return Err(DomainError::ArtifactUnavailable {
                    segment_id,
                    reason: format!("segment is {}", segment.status),
                });
            }
            match &state.artifact {
                Some(artifact) if artifact.segment_id == segment_id => (
                    artifact.output_name.clone(),
                    state.plan.media_type.clone(),
                    artifact.delivery.clone(),
                ),
                _ => {
                    return Err(DomainError::ArtifactUnavailable {
                        segment_id,
                        reason: "output is no longer in the workspace".to_string(),
                    })
                }
            }
        };

        let bytes = self
            .engine
            .read_output(&output_name)
            .await
            .map_err(|e| DomainError::ArtifactUnavailable {
                segment_id,
                reason: e.to_string(),
            })?;

        if let Some(handle) = previous {
            self.delivery
                .release(&handle)
                .await
                .map_err(|e| DomainError::EvictionFailure {
                    held_segment_id: segment_id,
                    reason: e.to_string(),
                })?;
            let mut state = self.state.lock();
            if let Some(held) = state.artifact.as_mut() {
                held.delivery = None;
            }
        }

        let size_bytes = bytes.len() as u64;
        let handle = self
            .delivery
            .offer(bytes, &output_name, &media_type)
            .await
            .map_err(|e| {
                warn!(segment_id, error = %e, "Delivery failed, artifact kept");
                DomainError::DeliveryFailure {
                    segment_id,
                    reason: e.to_string(),
                }
            })?;

        {
            let mut state = self.state.lock();
            if let Some(held) = state.artifact.as_mut() {
                held.delivery = Some(handle.clone());
            }
        }

        info!(
            segment_id,
            file = %output_name,
            size_bytes,
            location = %handle.location,
            "Segment delivered"
        );

        Ok(Delivery {
            segment_id,
            file_name: output_name,
            media_type,
            size_bytes,
            handle,
        })
    }
}
