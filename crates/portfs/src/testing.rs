//! Deterministic fixtures for exercising lock staleness and failure
//! reporting.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::clock::Clock;
use crate::message::{MessageHandler, Severity};

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// A sink that records every message for later assertions.
#[derive(Debug, Default)]
pub struct CapturingMessageHandler {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl CapturingMessageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns the transcript so far.
    pub fn take(&self) -> Vec<(Severity, String)> {
        std::mem::take(&mut *self.messages.lock().expect("handler poisoned"))
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().expect("handler poisoned").is_empty()
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .expect("handler poisoned")
            .iter()
            .any(|(_, text)| text.contains(needle))
    }
}

impl MessageHandler for CapturingMessageHandler {
    fn message(&self, severity: Severity, text: &str) {
        self.messages
            .lock()
            .expect("handler poisoned")
            .push((severity, text.to_string()));
    }
}
