use tokio::sync::mpsc;

use crate::TrackerEvent;

/// Receives poller events. Called with the poller's lock held, so
/// implementations must not call back into the poller.
pub trait SnapshotSink: Send + Sync {
    fn emit(&self, event: TrackerEvent);
}

pub struct ChannelSnapshotSink {
    tx: mpsc::UnboundedSender<TrackerEvent>,
}

impl ChannelSnapshotSink {
    pub fn new(tx: mpsc::UnboundedSender<TrackerEvent>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end, for callers that just want a stream of events.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SnapshotSink for ChannelSnapshotSink {
    fn emit(&self, event: TrackerEvent) {
        // A dropped receiver means the view is gone; nothing left to notify.
        let _ = self.tx.send(event);
    }
}
