use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::adapters::{FsDeliveryAdapter, LibavEngineAdapter, SplitterConfig, TracingNotifier};
use crate::app::session::SplitSession;
use crate::domain::model::EventRecord;
use crate::error::SplitXResult;
use crate::ports::{DeliveryPort, EventSink, MediaEnginePort};

pub trait AppContainer: Send + Sync {
    fn session(&self) -> Arc<SplitSession>;
}

/// Wires the libav engine, filesystem delivery and tracing notifier into a session
pub struct DefaultAppContainer {
    session: Arc<SplitSession>,
    events: Option<UnboundedReceiver<EventRecord>>,
}

impl DefaultAppContainer {
    pub fn new(config: &SplitterConfig) -> SplitXResult<Self> {
        let engine = match &config.workspace_dir {
            Some(dir) => LibavEngineAdapter::with_workspace(dir)?,
            None => LibavEngineAdapter::new()?,
        };
        let delivery = FsDeliveryAdapter::new(&config.output_dir)?;
        let (notifier, events) = TracingNotifier::with_channel();

        let session = Arc::new(SplitSession::new(
            Arc::new(engine) as Arc<dyn MediaEnginePort>,
            Arc::new(delivery) as Arc<dyn DeliveryPort>,
            Arc::new(notifier) as Arc<dyn EventSink>,
            config.interval,
        ));

        Ok(Self {
            session,
            events: Some(events),
        })
    }

    /// Lifecycle events for the presentation layer; can be taken once
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<EventRecord>> {
        self.events.take()
    }
}

impl AppContainer for DefaultAppContainer {
    fn session(&self) -> Arc<SplitSession> {
        Arc::clone(&self.session)
    }
}
