//! Diagnostics sink injected into readers and writers.
//!
//! Everything the crate absorbs instead of returning (skipped lines, read
//! failures, failed appends) is reported here. The default [`LogSink`] forwards
//! to the [`log`] facade, so hosts that already install a logger get the events
//! for free; tests can swap in [`MemorySink`](crate::testing::MemorySink).

use log::Level;
use std::fmt;
use std::sync::Arc;

/// Receiver for diagnostic events.
///
/// Implementations must be `Send + Sync`: one sink is usually shared by every
/// read session and writer in a process.
pub trait DiagnosticSink: Send + Sync {
    /// Record one event. `component` is `"reader"` or `"writer"`.
    fn emit(&self, level: Level, component: &str, message: fmt::Arguments<'_>);
}

/// Sink that forwards to the `log` crate under `jsonl_stream::<component>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, level: Level, component: &str, message: fmt::Arguments<'_>) {
        let target = match component {
            "reader" => "jsonl_stream::reader",
            "writer" => "jsonl_stream::writer",
            _ => "jsonl_stream",
        };
        log::log!(target: target, level, "{message}");
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _level: Level, _component: &str, _message: fmt::Arguments<'_>) {}
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn DiagnosticSink>;

pub(crate) fn default_sink() -> SharedSink {
    Arc::new(LogSink)
}
