//! Lifecycle event reporting toward the user-facing surface
//!
//! The tracker emits one event per state transition; reporters are
//! fire-and-forget and must never block or mutate operation state.

use std::sync::Mutex;
use tracing::{error, info};

/// Receiver for operation lifecycle events (the toast surface in a UI).
pub trait StatusReporter: Send + Sync {
    fn notify_pending(&self, message: &str);
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Default reporter that writes lifecycle events to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn notify_pending(&self, message: &str) {
        info!("{message}");
    }

    fn notify_success(&self, message: &str) {
        info!("{message}");
    }

    fn notify_error(&self, message: &str) {
        error!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Pending,
    Success,
    Error,
}

/// Reporter that buffers events in memory, for headless embeddings that poll
/// for display updates and for tests asserting on emitted events.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(EventKind, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(EventKind, String)> {
        self.lock().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Messages of the given kind, in emission order
    pub fn messages(&self, kind: EventKind) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, kind: EventKind, message: &str) {
        self.lock().push((kind, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(EventKind, String)>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatusReporter for MemoryReporter {
    fn notify_pending(&self, message: &str) {
        self.push(EventKind::Pending, message);
    }

    fn notify_success(&self, message: &str) {
        self.push(EventKind::Success, message);
    }

    fn notify_error(&self, message: &str) {
        self.push(EventKind::Error, message);
    }
}
