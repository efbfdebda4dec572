//! Lifecycle events reported to the caller during a transmission.
//!
//! A transmission produces, in order:
//!
//! ```text
//! Started{length} ── Progress{index}* ──┬── Done
//!                                       ├── Cancelled{completed}
//!                                       └── Error{error}
//! ```
//!
//! An acquisition failure produces a lone `Error`. At most one terminal
//! event is ever delivered.

use tokio::sync::mpsc;
use tracing::warn;

/// One lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionEvent {
    /// Emitter acquired, sequence of `length` patterns about to play.
    Started {
        /// Number of patterns, word gaps included.
        length: usize,
    },
    /// Pattern at 1-based position `index` finished, trailing gap included.
    Progress {
        /// 1-based position in the sequence.
        index: usize,
    },
    /// Transmission aborted by a hardware error.
    Error {
        /// Rendered error chain.
        error: String,
    },
    /// Stopped on request.
    Cancelled {
        /// Patterns fully sent before the stop.
        completed: usize,
    },
    /// Whole sequence sent.
    Done,
}

impl TransmissionEvent {
    /// Short state name, matching the event record shape `{state: ...}`.
    pub fn state(&self) -> &'static str {
        match self {
            TransmissionEvent::Started { .. } => "started",
            TransmissionEvent::Progress { .. } => "progress",
            TransmissionEvent::Error { .. } => "error",
            TransmissionEvent::Cancelled { .. } => "cancelled",
            TransmissionEvent::Done => "done",
        }
    }

    /// True for the events that end a transmission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransmissionEvent::Error { .. }
                | TransmissionEvent::Cancelled { .. }
                | TransmissionEvent::Done
        )
    }
}

/// Receives transmission events synchronously on the transmitting task.
///
/// Implementations must not block; hand work off to a channel if needed.
pub trait TransmissionObserver: Send + Sync {
    /// Called once per event, in order.
    fn on_event(&self, event: TransmissionEvent);
}

impl<F> TransmissionObserver for F
where
    F: Fn(TransmissionEvent) + Send + Sync,
{
    fn on_event(&self, event: TransmissionEvent) {
        self(event)
    }
}

/// Forwards events to a consumer task. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<TransmissionEvent>,
}

impl ChannelObserver {
    /// Observer plus the receiving end for the consumer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransmissionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TransmissionObserver for ChannelObserver {
    fn on_event(&self, event: TransmissionEvent) {
        let _ = self.tx.send(event);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TransmissionObserver for NoopObserver {
    fn on_event(&self, _event: TransmissionEvent) {}
}

/// Wraps an observer and enforces the single-terminal-event rule.
pub(crate) struct EventSink<'a> {
    observer: &'a dyn TransmissionObserver,
    terminated: bool,
}

impl<'a> EventSink<'a> {
    pub(crate) fn new(observer: &'a dyn TransmissionObserver) -> Self {
        Self {
            observer,
            terminated: false,
        }
    }

    pub(crate) fn emit(&mut self, event: TransmissionEvent) {
        if self.terminated {
            warn!(?event, "Dropping event after terminal event");
            return;
        }
        self.terminated = event.is_terminal();
        self.observer.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_sink_drops_after_terminal() {
        let seen = Mutex::new(Vec::new());
        let observer = |e: TransmissionEvent| seen.lock().push(e);
        let mut sink = EventSink::new(&observer);
        sink.emit(TransmissionEvent::Started { length: 1 });
        sink.emit(TransmissionEvent::Done);
        sink.emit(TransmissionEvent::Error {
            error: "late".into(),
        });
        sink.emit(TransmissionEvent::Done);
        assert_eq!(
            *seen.lock(),
            vec![
                TransmissionEvent::Started { length: 1 },
                TransmissionEvent::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_channel_observer() {
        let (tx, mut rx) = ChannelObserver::channel();
        tx.on_event(TransmissionEvent::Progress { index: 2 });
        assert_eq!(rx.recv().await, Some(TransmissionEvent::Progress { index: 2 }));
        drop(rx);
        tx.on_event(TransmissionEvent::Done);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(TransmissionEvent::Done.state(), "done");
        assert_eq!(TransmissionEvent::Started { length: 0 }.state(), "started");
        assert!(!TransmissionEvent::Progress { index: 1 }.is_terminal());
        assert!(TransmissionEvent::Cancelled { completed: 0 }.is_terminal());
    }
}
