//! Testing utilities for code built on this crate.
//!
//! - **Mock I/O**: temporary JSONL files and synthetic byte sources
//!   ([`ChunkedReader`] for short reads, [`FailingReader`] for I/O errors)
//! - **Diagnostics capture**: [`MemorySink`] records what the reader and
//!   writer report
//! - **Fixtures**: sample records and mixed valid/invalid input
//!
//! ```
//! use jsonl_stream::testing::*;
//! use jsonl_stream::{JsonlReader, ReaderOptions};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tmp = mock_raw_file(&mixed_log_jsonl())?;
//! let sink = Arc::new(MemorySink::new());
//! let reader = JsonlReader::with_options(
//!     tmp.path(),
//!     ReaderOptions::default().with_sink(sink.clone()),
//! )?;
//! let logs: Vec<SampleLogEntry> = reader.collect_all();
//! assert_eq!(logs.len(), 3);
//! assert_eq!(sink.count(log::Level::Trace), 2);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mock_io;
pub mod sink;

pub use fixtures::*;
pub use mock_io::*;
pub use sink::*;
