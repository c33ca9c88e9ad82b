//! In-memory test doubles for the engine, delivery and event ports

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use splitx_cli::domain::model::*;
use splitx_cli::error::{SplitXError, SplitXResult};
use splitx_cli::ports::*;

/// Ordered record of every port call, shared between fakes
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal, prefix: &str) -> Vec<String> {
    journal
        .lock()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}

pub fn position(journal: &Journal, entry: &str) -> usize {
    journal
        .lock()
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("'{}' not found in journal", entry))
}

pub struct FakeEngine {
    pub journal: Journal,
    pub durations: Mutex<HashMap<String, f64>>,
    pub inputs: Mutex<HashSet<String>>,
    pub outputs: Mutex<HashMap<String, Vec<u8>>>,
    pub failing_cuts: Mutex<HashSet<String>>,
    pub fail_write: AtomicBool,
    pub fail_remove: AtomicBool,
    pub block_cuts: AtomicBool,
    pub cut_started: Notify,
    pub release_cut: Notify,
}

impl FakeEngine {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            durations: Mutex::new(HashMap::new()),
            inputs: Mutex::new(HashSet::new()),
            outputs: Mutex::new(HashMap::new()),
            failing_cuts: Mutex::new(HashSet::new()),
            fail_write: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
            block_cuts: AtomicBool::new(false),
            cut_started: Notify::new(),
            release_cut: Notify::new(),
        }
    }

    pub fn with_duration(self, name: &str, seconds: f64) -> Self {
        self.durations.lock().insert(name.to_string(), seconds);
        self
    }

    pub fn fail_cut_of(&self, output_name: &str) {
        self.failing_cuts.lock().insert(output_name.to_string());
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.lock().contains_key(name)
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.lock().contains(name)
    }

    fn record(&self, entry: String) {
        self.journal.lock().push(entry);
    }
}

#[async_trait]
impl MediaEnginePort for FakeEngine {
    async fn write_input(&self, name: &str, _source: &Path) -> SplitXResult<()> {
        self.record(format!("write_input:{}", name));
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(SplitXError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "workspace full",
            )));
        }
        self.inputs.lock().insert(name.to_string());
        Ok(())
    }

    async fn probe_duration(&self, name: &str) -> SplitXResult<f64> {
        self.record(format!("probe:{}", name));
        self.durations
            .lock()
            .get(name)
            .copied()
            .ok_or_else(|| SplitXError::ProbeError {
                message: format!("no metadata for {}", name),
            })
    }

    async fn cut(&self, request: &CutRequest) -> SplitXResult<()> {
        self.record(format!("cut:{}", request.output_name));
        if self.block_cuts.load(Ordering::SeqCst) {
            self.cut_started.notify_one();
            self.release_cut.notified().await;
        }
        if self.failing_cuts.lock().contains(&request.output_name) {
            return Err(SplitXError::ClippingError {
                message: "corrupt packet".to_string(),
            });
        }
        let bytes = format!(
            "{}[{}..{}]",
            request.input_name, request.from_seconds, request.to_seconds
        )
        .into_bytes();
        self.outputs
            .lock()
            .insert(request.output_name.clone(), bytes);
        Ok(())
    }

    async fn read_output(&self, name: &str) -> SplitXResult<Vec<u8>> {
        self.record(format!("read_output:{}", name));
        self.outputs
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            })
    }

    async fn remove_output(&self, name: &str) -> SplitXResult<()> {
        self.record(format!("remove_output:{}", name));
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(SplitXError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "locked",
            )));
        }
        self.outputs
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            })
    }

    async fn remove_input(&self, name: &str) -> SplitXResult<()> {
        self.record(format!("remove_input:{}", name));
        if self.inputs.lock().remove(name) {
            Ok(())
        } else {
            Err(SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            })
        }
    }
}

pub struct FakeDelivery {
    pub journal: Journal,
    pub next_id: AtomicU64,
    pub live: Mutex<HashSet<u64>>,
    pub offered: Mutex<Vec<(String, String, usize)>>,
    pub fail_release: AtomicBool,
    pub fail_offer: AtomicBool,
}

impl FakeDelivery {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashSet::new()),
            offered: Mutex::new(Vec::new()),
            fail_release: AtomicBool::new(false),
            fail_offer: AtomicBool::new(false),
        }
    }

    pub fn live_handles(&self) -> usize {
        self.live.lock().len()
    }
}

#[async_trait]
impl DeliveryPort for FakeDelivery {
    async fn offer(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        media_type: &str,
    ) -> SplitXResult<DeliveryHandle> {
        if self.fail_offer.load(Ordering::SeqCst) {
            self.journal.lock().push("offer:refused".to_string());
            return Err(SplitXError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(format!("offer:{}", id));
        self.live.lock().insert(id);
        self.offered
            .lock()
            .push((file_name.to_string(), media_type.to_string(), bytes.len()));
        Ok(DeliveryHandle {
            id,
            location: format!("mem://{}", file_name),
        })
    }

    async fn release(&self, handle: &DeliveryHandle) -> SplitXResult<()> {
        self.journal.lock().push(format!("release:{}", handle.id));
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(SplitXError::UnknownDeliveryHandle { id: handle.id });
        }
        if self.live.lock().remove(&handle.id) {
            Ok(())
        } else {
            Err(SplitXError::UnknownDeliveryHandle { id: handle.id })
        }
    }
}

/// Keeps every event and writes processing events into the journal
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<LifecycleEvent>>,
    pub journal: Journal,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<LifecycleEvent> {
        self.events.lock().last().cloned()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: LifecycleEvent) {
        let entry = match &event {
            LifecycleEvent::ProcessingStarted { segment_id } => {
                Some(format!("processing-started:{}", segment_id))
            }
            LifecycleEvent::ProcessingSucceeded { segment_id } => {
                Some(format!("processing-succeeded:{}", segment_id))
            }
            LifecycleEvent::ProcessingFailed { segment_id, .. } => {
                Some(format!("processing-failed:{}", segment_id))
            }
            _ => None,
        };
        if let Some(entry) = entry {
            self.journal.lock().push(entry);
        }
        self.events.lock().push(event);
    }
}

/// Engine, delivery and sink sharing one journal
pub struct Harness {
    pub journal: Journal,
    pub engine: Arc<FakeEngine>,
    pub delivery: Arc<FakeDelivery>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_engine(|engine| engine)
    }

    pub fn with_engine(configure: impl FnOnce(FakeEngine) -> FakeEngine) -> Self {
        let journal = journal();
        Self {
            engine: Arc::new(configure(FakeEngine::new(Arc::clone(&journal)))),
            delivery: Arc::new(FakeDelivery::new(Arc::clone(&journal))),
            sink: Arc::new(RecordingSink {
                events: Mutex::new(Vec::new()),
                journal: Arc::clone(&journal),
            }),
            journal,
        }
    }

    pub fn engine_port(&self) -> Arc<dyn MediaEnginePort> {
        Arc::clone(&self.engine) as Arc<dyn MediaEnginePort>
    }

    pub fn delivery_port(&self) -> Arc<dyn DeliveryPort> {
        Arc::clone(&self.delivery) as Arc<dyn DeliveryPort>
    }

    pub fn sink_port(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.sink) as Arc<dyn EventSink>
    }
}
