//! Append-only JSONL writer.

use crate::error::{JsonlError, Result};
use crate::options::WriterOptions;
use log::Level;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Appends one newline-terminated record per call to a file it owns.
///
/// Each record is written with a single `write_all` and flushed before the
/// call returns. The file is closed by [`close`](Self::close) or, failing
/// that, when the writer is dropped.
///
/// [`write`](Self::write) and [`write_bytes`](Self::write_bytes) never fail:
/// problems are reported to the diagnostic sink and the record is dropped. Use
/// [`try_write`](Self::try_write) / [`try_write_bytes`](Self::try_write_bytes)
/// to see them.
#[derive(Debug)]
pub struct JsonlWriter {
    file: Option<File>,
    path: PathBuf,
    options: WriterOptions,
    written: u64,
}

impl JsonlWriter {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    /// [`JsonlError::Open`] if the file can't be created or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::create(path, true)
    }

    /// Open `path`, refusing existing files unless `append_if_exists` is set.
    ///
    /// # Errors
    /// [`JsonlError::TargetExists`] if the file exists and `append_if_exists`
    /// is false (the file is not touched), [`JsonlError::Open`] otherwise.
    pub fn create(path: impl AsRef<Path>, append_if_exists: bool) -> Result<Self> {
        Self::with_options(path, append_if_exists, WriterOptions::default())
    }

    /// Same as [`create`](Self::create) with explicit options.
    ///
    /// # Errors
    /// See [`create`](Self::create).
    pub fn with_options(
        path: impl AsRef<Path>,
        append_if_exists: bool,
        options: WriterOptions,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() && !append_if_exists {
            return Err(JsonlError::TargetExists { path });
        }

        let opened = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.seek(SeekFrom::End(0)).map(|end| (file, end)));
        let (file, end) = match opened {
            Ok(v) => v,
            Err(source) => {
                options.sink.emit(
                    Level::Error,
                    "writer",
                    format_args!("Failed to open file: {}: {source}", path.display()),
                );
                return Err(JsonlError::Open { path, source });
            }
        };
        options.sink.emit(
            Level::Debug,
            "writer",
            format_args!("opened {} for append at offset {end}", path.display()),
        );

        Ok(Self {
            file: Some(file),
            path,
            options,
            written: 0,
        })
    }

    /// Append already-encoded bytes as one record.
    ///
    /// Failures are logged and the record is dropped.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if let Err(err) = self.try_write_bytes(bytes) {
            self.report(&err);
        }
    }

    /// Serialize `value` and append it as one record.
    ///
    /// Encoding and write failures are logged and the record is dropped.
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) {
        if let Err(err) = self.try_write(value) {
            self.report(&err);
        }
    }

    /// Append already-encoded bytes as one record.
    ///
    /// # Errors
    /// [`JsonlError::Closed`] after [`close`](Self::close), [`JsonlError::Write`]
    /// if the append or flush failed. The writer stays usable either way.
    pub fn try_write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut line = Vec::with_capacity(bytes.len() + 1);
        line.extend_from_slice(bytes);
        self.append_line(line)
    }

    /// Serialize `value` and append it as one record.
    ///
    /// # Errors
    /// [`JsonlError::Encode`] if serialization fails (nothing is written),
    /// otherwise as [`try_write_bytes`](Self::try_write_bytes).
    pub fn try_write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_vec(value).map_err(|source| JsonlError::Encode { source })?;
        self.append_line(line)
    }

    fn append_line(&mut self, mut line: Vec<u8>) -> Result<()> {
        let file = self.file.as_mut().ok_or(JsonlError::Closed)?;
        line.push(b'\n');
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|source| JsonlError::Write { source })?;
        if self.options.sync {
            file.sync_data().map_err(|source| JsonlError::Write { source })?;
        }
        self.written += 1;
        Ok(())
    }

    /// Flush, sync and release the file. Later calls are no-ops.
    ///
    /// # Errors
    /// [`JsonlError::Close`] if the final flush or sync failed. The handle is
    /// released regardless.
    pub fn try_close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()
            .and_then(|()| file.sync_all())
            .map_err(|source| JsonlError::Close { source })?;
        self.options.sink.emit(
            Level::Debug,
            "writer",
            format_args!("closed {} after {} records", self.path.display(), self.written),
        );
        Ok(())
    }

    /// Release the file, logging any failure.
    pub fn close(&mut self) {
        if let Err(err) = self.try_close() {
            self.report(&err);
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Records successfully appended by this handle.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.written
    }

    fn report(&self, err: &JsonlError) {
        self.options.sink.emit(Level::Error, "writer", format_args!("{err}"));
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.close();
    }
}

/// Append every item of `data` to `path`, creating the file if needed.
///
/// Returns the number of records written.
///
/// # Errors
/// Fails on the first open, encode or write error; records written before it
/// stay in the file.
pub fn append_jsonl<T: Serialize>(path: impl AsRef<Path>, data: &[T]) -> Result<usize> {
    let mut w = JsonlWriter::open(path)?;
    for item in data {
        w.try_write(item)?;
    }
    w.try_close()?;
    Ok(data.len())
}
