//! Reader and writer configuration.
//!
//! Both option types implement `Deserialize` with every plain field defaulted,
//! so a host application can embed them in its own configuration file:
//!
//! ```
//! use jsonl_stream::ReaderOptions;
//!
//! let opts: ReaderOptions = serde_json::from_str(r#"{"chunk_size": 4096}"#).unwrap();
//! assert_eq!(opts.chunk_size, 4096);
//! assert!(!opts.strip_cr);
//! ```
//!
//! The diagnostic sink and the codec registry can't be deserialized; they are
//! set with the `with_*` methods.

use crate::diagnostics::{DiagnosticSink, SharedSink, default_sink};
use crate::io::{CodecRegistry, CompressionCodec};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Bytes requested from the source per read.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Options for [`JsonlReader`](crate::JsonlReader) and the record iterators.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Upper bound on the size of each read. Zero is treated as one.
    pub chunk_size: usize,
    /// Remove one trailing `\r` from every record (CRLF files). Mid-stream
    /// lines that are only `\r` are then dropped like empty lines.
    pub strip_cr: bool,
    /// Detect and unwrap compressed files. `.jsonl`, `.ndjson` and `.json`
    /// paths are never sniffed for magic bytes.
    pub decompress: bool,
    #[serde(skip)]
    pub codecs: CodecRegistry,
    #[serde(skip, default = "default_sink")]
    pub sink: SharedSink,
}

impl ReaderOptions {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_strip_cr(mut self, strip_cr: bool) -> Self {
        self.strip_cr = strip_cr;
        self
    }

    #[must_use]
    pub fn with_decompress(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn CompressionCodec>) -> Self {
        self.codecs.register(codec);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            strip_cr: false,
            decompress: true,
            codecs: CodecRegistry::builtin(),
            sink: default_sink(),
        }
    }
}

impl fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("chunk_size", &self.chunk_size)
            .field("strip_cr", &self.strip_cr)
            .field("decompress", &self.decompress)
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

/// Options for [`JsonlWriter`](crate::JsonlWriter).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Call `sync_data` after every record, not just on close.
    pub sync: bool,
    #[serde(skip, default = "default_sink")]
    pub sink: SharedSink,
}

impl WriterOptions {
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            sync: false,
            sink: default_sink(),
        }
    }
}

impl fmt::Debug for WriterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterOptions")
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
