//! Progress events and sinks.
//!
//! Long-running catalog builds and plan applications report progress
//! through a [`ProgressSink`]. Emission is infallible by construction:
//! the trait returns `()` and the channel sink drops events whose
//! receiver has gone away, so an observer can never throw back into the
//! pipeline.

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc;

/// A progress event emitted during catalog building or plan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A ref was resolved to a commit.
    RefResolved {
        /// The resolved commit id.
        commit_id: String,
    },
    /// The remote tree walk finished.
    ArchivesFound {
        /// Number of archives discovered.
        count: usize,
    },
    /// An archive is about to be fetched and listed.
    ArchiveStarted {
        /// Repository path of the archive.
        path: String,
        /// 0-based position within the build.
        index: usize,
        /// Total number of archives.
        total: usize,
    },
    /// An archive yielded catalog rows.
    ArchiveCataloged {
        /// Repository path of the archive.
        path: String,
        /// Number of tables discovered inside.
        tables: usize,
    },
    /// An archive held no SQL entries and was skipped.
    ArchiveEmpty {
        /// Repository path of the archive.
        path: String,
    },
    /// An archive could not be fetched or read and was skipped.
    ArchiveFailed {
        /// Repository path of the archive.
        path: String,
        /// Failure description.
        message: String,
    },
    /// A plan step is about to execute.
    StepStarted {
        /// Table the step reloads.
        table: String,
        /// 0-based position within the plan.
        index: usize,
        /// Total number of steps.
        total: usize,
    },
    /// A plan step finished executing.
    StepApplied {
        /// Table the step reloaded.
        table: String,
        /// Number of statements executed.
        statements: usize,
    },
    /// Free-form progress text.
    Message(String),
    /// Terminal event: the work completed.
    Done {
        /// Final number of catalog rows or applied steps.
        tables: usize,
        /// The resolved commit id.
        commit_id: String,
    },
    /// Terminal event: the work failed.
    Failed {
        /// Failure description.
        message: String,
    },
}

/// A sink receiving progress events.
///
/// Implementations must tolerate being invoked zero or many times and
/// must never panic; emission failures are theirs to swallow.
pub trait ProgressSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: ProgressEvent);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// A sink forwarding events over an unbounded channel.
///
/// If the receiver is dropped, further events are silently discarded;
/// the producing pipeline is unaffected. Pair with a
/// [`CancelFlag`](crate::CancelFlag) when a disappearing observer
/// should also stop the work.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver observing it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// A sink recording events in memory, for tests.
#[derive(Default)]
pub struct MemorySink {
    events: RwLock<Vec<ProgressEvent>>,
}

impl MemorySink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events recorded so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().clone()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: ProgressEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(ProgressEvent::ArchivesFound { count: 2 });
        sink.emit(ProgressEvent::Done {
            tables: 5,
            commit_id: "c1".into(),
        });

        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::ArchivesFound { count: 2 });
        assert!(matches!(rx.try_recv().unwrap(), ProgressEvent::Done { .. }));
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        // Must not panic or error.
        sink.emit(ProgressEvent::Message("still going".into()));
    }

    #[test]
    fn memory_sink_records() {
        let sink = MemorySink::new();
        sink.emit(ProgressEvent::ArchiveEmpty { path: "a.zip".into() });
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = ProgressEvent::RefResolved { commit_id: "c1".into() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"ref_resolved""#));
    }
}
