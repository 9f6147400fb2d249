//! Lazy record and value iterators over a chunked source.
//!
//! Every iterator here owns one read session: its source, its
//! [`LineSplitter`] and its counters. Nothing runs between calls to `next`;
//! each call reads only as many chunks as it takes to complete one record, so
//! a consumer that stops pulling stops all I/O. Dropping the iterator closes
//! the source.
//!
//! Two flavours exist for both raw records and decoded values:
//!
//! | iterator        | item              | on decode failure     | on read failure          |
//! |-----------------|-------------------|-----------------------|--------------------------|
//! | [`Records`]     | `Vec<u8>`         | n/a                   | ends, kept in `error()`  |
//! | [`TryRecords`]  | `Result<Vec<u8>>` | n/a                   | yields `Err`, then ends  |
//! | [`Values`]      | `T`               | skipped, logged trace | ends, kept in `error()`  |
//! | [`TryValues`]   | `Result<T>`       | yields `Err`, ends    | yields `Err`, then ends  |

use crate::diagnostics::SharedSink;
use crate::error::{JsonlError, Result};
use crate::options::ReaderOptions;
use crate::splitter::LineSplitter;
use log::Level;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Boxed source produced by [`JsonlReader`](crate::JsonlReader).
pub type DynSource = Box<dyn Read + Send>;

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    pub chunks_read: u64,
    pub bytes_read: u64,
    /// Raw records handed to the consumer or decoder.
    pub records: u64,
    pub empty_lines: u64,
    /// Values decoded successfully.
    pub decoded: u64,
    /// Records dropped because they did not decode.
    pub skipped: u64,
}

/// Shared engine behind all four iterators.
struct RecordSource<R> {
    source: Option<R>,
    pending_error: Option<JsonlError>,
    splitter: LineSplitter,
    chunk: Vec<u8>,
    strip_cr: bool,
    /// Mid-stream records that were only a `\r` (dropped when `strip_cr` is on).
    cr_only: u64,
    sink: SharedSink,
    stats: ReadStats,
}

impl<R: Read> RecordSource<R> {
    fn new(source: R, options: &ReaderOptions) -> Self {
        Self {
            source: Some(source),
            pending_error: None,
            splitter: LineSplitter::new(),
            chunk: vec![0; options.effective_chunk_size()],
            strip_cr: options.strip_cr,
            cr_only: 0,
            sink: options.sink.clone(),
            stats: ReadStats::default(),
        }
    }

    fn failed(err: JsonlError, options: &ReaderOptions) -> Self {
        options
            .sink
            .emit(Level::Error, "reader", format_args!("Error reading data from file: {err}"));
        Self {
            source: None,
            pending_error: Some(err),
            splitter: LineSplitter::new(),
            chunk: Vec::new(),
            strip_cr: options.strip_cr,
            cr_only: 0,
            sink: options.sink.clone(),
            stats: ReadStats::default(),
        }
    }

    fn next_record(&mut self) -> Option<Result<Vec<u8>>> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }
        loop {
            if let Some(record) = self.splitter.next_record() {
                if self.strip_cr && record == b"\r" {
                    self.cr_only += 1;
                    self.refresh_empty_lines();
                    continue;
                }
                return Some(Ok(self.emit(record)));
            }
            let source = self.source.as_mut()?;
            match read_chunk(source, &mut self.chunk) {
                Ok(0) => {
                    self.source = None;
                    let last = self.splitter.finish().map(|record| self.emit(record));
                    self.refresh_empty_lines();
                    self.log_end("end of input");
                    return last.map(Ok);
                }
                Ok(n) => {
                    self.stats.chunks_read += 1;
                    self.stats.bytes_read += n as u64;
                    self.splitter.push(&self.chunk[..n]);
                }
                Err(source) => {
                    self.source = None;
                    self.splitter.clear();
                    self.refresh_empty_lines();
                    self.sink.emit(
                        Level::Error,
                        "reader",
                        format_args!("Error reading data from file: {source}"),
                    );
                    self.log_end("read failure");
                    return Some(Err(JsonlError::Read { source }));
                }
            }
        }
    }

    fn emit(&mut self, mut record: Vec<u8>) -> Vec<u8> {
        if self.strip_cr && record.last() == Some(&b'\r') {
            record.pop();
        }
        self.stats.records += 1;
        self.refresh_empty_lines();
        record
    }

    fn refresh_empty_lines(&mut self) {
        self.stats.empty_lines = self.splitter.empty_lines_dropped() + self.cr_only;
    }

    fn log_end(&self, reason: &str) {
        self.sink.emit(
            Level::Debug,
            "reader",
            format_args!(
                "session finished ({reason}): {} bytes in {} chunks, {} records",
                self.stats.bytes_read, self.stats.chunks_read, self.stats.records
            ),
        );
    }

    /// Stop producing: drop the source and any buffered partial record.
    fn shut(&mut self) {
        self.source = None;
        self.pending_error = None;
        self.splitter.clear();
    }

    fn line(&self) -> u64 {
        self.splitter.line()
    }
}

/// Read one chunk, retrying interrupted reads.
fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

fn decode<T: DeserializeOwned>(record: &[u8], line: u64) -> Result<T> {
    serde_json::from_slice(record).map_err(|source| JsonlError::Decode {
        line,
        len: record.len(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// Tolerant raw-record iterator. A read failure ends the sequence.
pub struct Records<R = DynSource> {
    inner: RecordSource<R>,
    error: Option<JsonlError>,
}

impl<R: Read> Records<R> {
    /// Stream records from any byte source.
    pub fn from_reader(source: R, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::new(source, options),
            error: None,
        }
    }

    pub(crate) fn failed(err: JsonlError, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::failed(err, options),
            error: None,
        }
    }

    /// The failure that ended the sequence early, if any.
    #[must_use]
    pub fn error(&self) -> Option<&JsonlError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> ReadStats {
        self.inner.stats
    }

    /// Whether the underlying source is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.source.is_some()
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        match self.inner.next_record()? {
            Ok(record) => Some(record),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

impl<R: Read> FusedIterator for Records<R> {}

/// Strict raw-record iterator: the first read failure is yielded, then it ends.
pub struct TryRecords<R = DynSource> {
    inner: RecordSource<R>,
}

impl<R: Read> TryRecords<R> {
    pub fn from_reader(source: R, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::new(source, options),
        }
    }

    pub(crate) fn failed(err: JsonlError, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::failed(err, options),
        }
    }

    #[must_use]
    pub fn stats(&self) -> ReadStats {
        self.inner.stats
    }
}

impl<R: Read> Iterator for TryRecords<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_record()
    }
}

impl<R: Read> FusedIterator for TryRecords<R> {}

// ---------------------------------------------------------------------------
// Decoded values
// ---------------------------------------------------------------------------

/// Tolerant decoding iterator.
///
/// Records that fail to decode into `T` are skipped and reported at trace
/// level; some files legitimately mix record shapes.
pub struct Values<T, R = DynSource> {
    inner: RecordSource<R>,
    error: Option<JsonlError>,
    _t: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, R: Read> Values<T, R> {
    pub fn from_reader(source: R, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::new(source, options),
            error: None,
            _t: PhantomData,
        }
    }

    pub(crate) fn failed(err: JsonlError, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::failed(err, options),
            error: None,
            _t: PhantomData,
        }
    }

    /// The read failure that ended the sequence early, if any.
    #[must_use]
    pub fn error(&self) -> Option<&JsonlError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> ReadStats {
        self.inner.stats
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.source.is_some()
    }
}

impl<T: DeserializeOwned, R: Read> Iterator for Values<T, R> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let record = match self.inner.next_record()? {
                Ok(record) => record,
                Err(err) => {
                    self.error = Some(err);
                    return None;
                }
            };
            match decode::<T>(&record, self.inner.line()) {
                Ok(value) => {
                    self.inner.stats.decoded += 1;
                    return Some(value);
                }
                Err(err) => {
                    self.inner.stats.skipped += 1;
                    self.inner.sink.emit(
                        Level::Trace,
                        "reader",
                        format_args!("Did not decode data to expected type: {err}"),
                    );
                }
            }
        }
    }
}

impl<T: DeserializeOwned, R: Read> FusedIterator for Values<T, R> {}

/// Strict decoding iterator: the first decode or read failure is yielded as
/// `Err` and the session ends.
pub struct TryValues<T, R = DynSource> {
    inner: RecordSource<R>,
    _t: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, R: Read> TryValues<T, R> {
    pub fn from_reader(source: R, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::new(source, options),
            _t: PhantomData,
        }
    }

    pub(crate) fn failed(err: JsonlError, options: &ReaderOptions) -> Self {
        Self {
            inner: RecordSource::failed(err, options),
            _t: PhantomData,
        }
    }

    #[must_use]
    pub fn stats(&self) -> ReadStats {
        self.inner.stats
    }
}

impl<T: DeserializeOwned, R: Read> Iterator for TryValues<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        let record = match self.inner.next_record()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err)),
        };
        match decode::<T>(&record, self.inner.line()) {
            Ok(value) => {
                self.inner.stats.decoded += 1;
                Some(Ok(value))
            }
            Err(err) => {
                self.inner.stats.skipped += 1;
                self.inner.shut();
                Some(Err(err))
            }
        }
    }
}

impl<T: DeserializeOwned, R: Read> FusedIterator for TryValues<T, R> {}
