//! Diagnostic sink that records events for assertions.

use crate::diagnostics::DiagnosticSink;
use log::Level;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// One captured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub level: Level,
    pub component: String,
    pub message: String,
}

/// Sink that keeps every event in memory.
///
/// ```
/// use jsonl_stream::testing::MemorySink;
/// use jsonl_stream::ReaderOptions;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let opts = ReaderOptions::default().with_sink(sink.clone());
/// # let _ = opts;
/// assert!(sink.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events recorded at exactly `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.events().iter().filter(|e| e.level == level).count()
    }

    /// Whether some event at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, level: Level, component: &str, message: fmt::Arguments<'_>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Event {
                level,
                component: component.to_string(),
                message: message.to_string(),
            });
    }
}
