//! Temporary files and synthetic byte sources.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new, empty temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_extension("jsonl")
    }

    /// Create a new temporary file with a specific extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create a temporary `.jsonl` file with one serialized value per line.
///
/// # Errors
///
/// Returns an error if the file can't be created or a value can't be serialized.
///
/// ```
/// use jsonl_stream::testing::mock_jsonl_file;
/// use jsonl_stream::JsonlReader;
///
/// let tmp = mock_jsonl_file(&[1u32, 2, 3]).unwrap();
/// let back: Vec<u32> = JsonlReader::open(tmp.path()).unwrap().collect_all();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
pub fn mock_jsonl_file<T: Serialize>(data: &[T]) -> Result<TempFilePath> {
    let mut bytes = Vec::new();
    for record in data {
        serde_json::to_writer(&mut bytes, record).context("serialize fixture record")?;
        bytes.push(b'\n');
    }
    mock_raw_file(&bytes)
}

/// Create a temporary `.jsonl` file holding exactly `bytes`.
///
/// # Errors
///
/// Returns an error if the file can't be created or written.
pub fn mock_raw_file(bytes: &[u8]) -> Result<TempFilePath> {
    let temp = TempFilePath::new().context("create temp file")?;
    std::fs::write(temp.path(), bytes)
        .with_context(|| format!("write {}", temp.path().display()))?;
    Ok(temp)
}

/// Read a JSONL file back for assertions, independently of the crate's reader.
///
/// # Errors
///
/// Returns an error if the file can't be read or a non-empty line fails to parse.
pub fn read_jsonl_output<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("parse line {} in {}", i + 1, path.display()))
        })
        .collect()
}

/// In-memory source that returns at most `max_read` bytes per `read`.
///
/// Forces short reads regardless of the buffer the caller offers.
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    max_read: usize,
}

impl ChunkedReader {
    #[must_use]
    pub fn new(data: Vec<u8>, max_read: usize) -> Self {
        Self {
            data,
            pos: 0,
            max_read: max_read.max(1),
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max_read).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// In-memory source that serves the first `fail_after` bytes of `data`, then
/// fails every read with an I/O error.
pub struct FailingReader {
    data: Vec<u8>,
    pos: usize,
    fail_after: usize,
    interrupt_first: bool,
}

impl FailingReader {
    #[must_use]
    pub fn new(data: Vec<u8>, fail_after: usize) -> Self {
        Self {
            data,
            pos: 0,
            fail_after,
            interrupt_first: false,
        }
    }

    /// Make the very first read return `ErrorKind::Interrupted`.
    #[must_use]
    pub fn interrupt_first(mut self) -> Self {
        self.interrupt_first = true;
        self
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if std::mem::take(&mut self.interrupt_first) {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let limit = self.fail_after.min(self.data.len());
        if self.pos >= limit {
            return Err(io::Error::other("simulated read failure"));
        }
        let n = buf.len().min(limit - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
