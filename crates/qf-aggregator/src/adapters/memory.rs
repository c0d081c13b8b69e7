//! In-memory event sink.

use crate::ports::{EventSink, FeedEvent};
use parking_lot::RwLock;

/// Collects published events in memory. Used by tests and by embedders that
/// drain notifications after each invocation.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<FeedEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<FeedEvent> {
        self.events.read().clone()
    }

    /// Drain and return everything published so far.
    pub fn take(&self) -> Vec<FeedEvent> {
        std::mem::take(&mut *self.events.write())
    }
}

impl EventSink for InMemoryEventSink {
    fn publish(&self, event: FeedEvent) {
        self.events.write().push(event);
    }
}
