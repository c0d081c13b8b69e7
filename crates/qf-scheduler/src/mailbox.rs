//! Latest-wins trigger mailbox.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// A capacity-1 mailbox: delivering replaces any value still waiting, so a
/// slow consumer always wakes to the newest trigger and never works through
/// a backlog.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Put a value in the slot, replacing any undelivered one, and wake the
    /// consumer.
    pub fn deliver(&self, value: T) {
        *self.slot.lock() = Some(value);
        self.notify.notify_one();
    }

    /// Take the current value, if any.
    pub fn retrieve(&self) -> Option<T> {
        self.slot.lock().take()
    }

    /// Wait until a delivery happens. A delivery that arrived while nobody
    /// was waiting is not lost; the next call returns immediately.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
