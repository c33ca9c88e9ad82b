// Tracing notifier - Lifecycle events as structured logs, optionally forwarded on a channel

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::domain::model::*;
use crate::ports::*;

/// Event sink that logs every lifecycle event and can forward it to a listener
pub struct TracingNotifier {
    sender: Option<UnboundedSender<EventRecord>>,
}

impl TracingNotifier {
    /// Log-only notifier
    pub fn new() -> Self {
        Self { sender: None }
    }

    /// Notifier that also forwards timestamped events to the returned receiver
    pub fn with_channel() -> (Self, UnboundedReceiver<EventRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    fn log(event: &LifecycleEvent) {
        match event {
            LifecycleEvent::LoadingStarted { name } => info!(file = %name, "Loading ..."),
            LifecycleEvent::LoadFailed { reason } => warn!(reason = %reason, "Load failed"),
            LifecycleEvent::ProcessingStarted { segment_id } => {
                debug!(segment_id, "Processing started")
            }
            LifecycleEvent::ProcessingSucceeded { segment_id } => {
                info!(segment_id, "Processing completed")
            }
            LifecycleEvent::ProcessingFailed { segment_id, reason } => {
                error!(segment_id, reason = %reason, "Processing failed")
            }
        }
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingNotifier {
    fn emit(&self, event: LifecycleEvent) {
        Self::log(&event);
        if let Some(sender) = &self.sender {
            // A dropped receiver only means nobody is listening any more.
            let _ = sender.send(EventRecord::now(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_forwards_events_in_order() {
        let (notifier, mut receiver) = TracingNotifier::with_channel();
        notifier.emit(LifecycleEvent::ProcessingStarted { segment_id: 0 });
        notifier.emit(LifecycleEvent::ProcessingSucceeded { segment_id: 0 });

        let first = receiver.try_recv().unwrap();
        let second = receiver.try_recv().unwrap();
        assert_eq!(first.event, LifecycleEvent::ProcessingStarted { segment_id: 0 });
        assert_eq!(second.event, LifecycleEvent::ProcessingSucceeded { segment_id: 0 });
        assert!(first.at <= second.at);
    }

    #[test]
    fn test_emit_survives_dropped_receiver() {
        let (notifier, receiver) = TracingNotifier::with_channel();
        drop(receiver);
        notifier.emit(LifecycleEvent::LoadFailed {
            reason: "gone".to_string(),
        });
        TracingNotifier::new().emit(LifecycleEvent::LoadingStarted {
            name: "clip.mp4".to_string(),
        });
    }
}
