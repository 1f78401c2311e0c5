use std::sync::{Arc, Mutex};

/// Delivers a human-readable failure message to the user.
///
/// Fire-and-forget: sinks must not fail and return nothing.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

/// Sink that reports messages through `tracing` at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "cart::notify", "{message}");
    }
}

/// Sink that keeps every message, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock poisoned").clone()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<String> {
        self.messages.lock().expect("lock poisoned").last().cloned()
    }

    /// Drain all messages received so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().expect("lock poisoned"))
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().expect("lock poisoned").is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .expect("lock poisoned")
            .push(message.to_string());
    }
}
