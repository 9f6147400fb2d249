//! # jsonl-stream
//!
//! Streaming access to **JSON Lines** files: one JSON value per `\n`-terminated
//! line.
//!
//! ## Key Features
//!
//! - **Chunked reading** - files are read in small fixed-size chunks (1 KiB by
//!   default) and never loaded whole
//! - **Lazy iterators** - records are produced one `next()` at a time; stop
//!   pulling and the I/O stops, drop the iterator and the file is closed
//! - **Tolerant decoding** - lines that don't decode into the target type are
//!   skipped, counted and reported at trace level
//! - **Strict variants** - `try_*` iterators and writer calls surface the first
//!   failure instead
//! - **Append-only writer** - one record plus `\n` per call, flushed per call
//! - **Transparent decompression** - gzip, zstd, bzip2 and xz sources (feature
//!   flags)
//! - **Injected diagnostics** - a [`DiagnosticSink`] instead of a global logger
//!
//! ## Quick Start
//!
//! ```
//! use jsonl_stream::{JsonlReader, JsonlWriter};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Event { id: u32, kind: String }
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("events.jsonl");
//!
//! let mut w = JsonlWriter::open(&path)?;
//! w.write(&Event { id: 1, kind: "start".into() });
//! w.write(&Event { id: 2, kind: "stop".into() });
//! w.close();
//!
//! let reader = JsonlReader::open(&path)?;
//! let events: Vec<Event> = reader.values().collect();
//! assert_eq!(events.len(), 2);
//! assert_eq!(reader.collect_all_raw()[0], br#"{"id":1,"kind":"start"}"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! - Records are separated by `\n`; the delimiter is not part of the record
//! - Empty lines between records are ignored
//! - A trailing newline is optional; a final unterminated line is a record
//! - `\r` is kept unless [`ReaderOptions::strip_cr`] is set
//!
//! ## Error Handling
//!
//! Constructors return [`JsonlError`]. Once a session is running, the tolerant
//! API never returns an error: a failed read ends the sequence early (see
//! [`Records::error`]), a bad line is skipped, a failed write drops the record.
//! All of it goes to the configured sink.
//!
//! ## Module Overview
//!
//! - [`splitter`] - the carry-over buffer that turns chunks into records
//! - [`stream`] - lazy record and value iterators
//! - [`reader`] / [`writer`] - file-backed front ends
//! - [`io`] - source wrappers (decompression)
//! - [`diagnostics`] - the sink trait and the `log`-backed default
//! - [`testing`] - temp files, synthetic sources and a capturing sink

pub mod diagnostics;
pub mod error;
pub mod io;
pub mod options;
pub mod reader;
pub mod splitter;
pub mod stream;
pub mod testing;
pub mod writer;

pub use diagnostics::{DiagnosticSink, LogSink, NullSink};
pub use error::{JsonlError, Result};
pub use options::{DEFAULT_CHUNK_SIZE, ReaderOptions, WriterOptions};
pub use reader::{JsonlReader, read_jsonl_vec};
pub use splitter::LineSplitter;
pub use stream::{ReadStats, Records, TryRecords, TryValues, Values};
pub use writer::{JsonlWriter, append_jsonl};
