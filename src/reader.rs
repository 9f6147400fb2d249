//! File-backed JSONL reader.

use crate::error::{JsonlError, Result};
use crate::options::ReaderOptions;
use crate::stream::{DynSource, Records, TryRecords, TryValues, Values};
use log::Level;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Handle to a readable JSONL file.
///
/// Holding a `JsonlReader` does not keep the file open. Each call to
/// [`records`](Self::records), [`values`](Self::values) or their strict
/// variants opens a fresh, independent session that owns its own handle and
/// buffer.
///
/// ```no_run
/// use jsonl_stream::JsonlReader;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Event { id: u64 }
///
/// # fn main() -> jsonl_stream::Result<()> {
/// let reader = JsonlReader::open("events.jsonl")?;
/// for event in reader.values::<Event>() {
///     println!("{}", event.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonlReader {
    path: PathBuf,
    options: ReaderOptions,
}

impl JsonlReader {
    /// Open `path` with default options.
    ///
    /// # Errors
    /// [`JsonlError::TargetMissing`] if the path does not exist,
    /// [`JsonlError::TargetUnreadable`] if it can't be opened for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, ReaderOptions::default())
    }

    /// Open `path` with explicit options.
    ///
    /// # Errors
    /// Same as [`open`](Self::open).
    pub fn with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sink = &options.sink;

        if !path.exists() {
            sink.emit(
                Level::Error,
                "reader",
                format_args!("File does not exist: {}", path.display()),
            );
            return Err(JsonlError::TargetMissing { path });
        }

        let readable = if path.is_dir() {
            Err(io::Error::other("path is a directory"))
        } else {
            File::open(&path).map(drop)
        };
        if let Err(source) = readable {
            sink.emit(
                Level::Error,
                "reader",
                format_args!("File is not readable: {}: {source}", path.display()),
            );
            return Err(JsonlError::TargetUnreadable { path, source });
        }

        Ok(Self { path, options })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Lazily stream raw records. Open and read failures end the sequence
    /// silently; see [`Records::error`].
    #[must_use]
    pub fn records(&self) -> Records {
        match self.open_source() {
            Ok(src) => Records::from_reader(src, &self.options),
            Err(err) => Records::failed(err, &self.options),
        }
    }

    /// Lazily stream decoded values, skipping lines that don't decode as `T`.
    #[must_use]
    pub fn values<T: DeserializeOwned>(&self) -> Values<T> {
        match self.open_source() {
            Ok(src) => Values::from_reader(src, &self.options),
            Err(err) => Values::failed(err, &self.options),
        }
    }

    /// Like [`records`](Self::records), but open and read failures are yielded.
    #[must_use]
    pub fn try_records(&self) -> TryRecords {
        match self.open_source() {
            Ok(src) => TryRecords::from_reader(src, &self.options),
            Err(err) => TryRecords::failed(err, &self.options),
        }
    }

    /// Like [`values`](Self::values), but the first failure of any kind is yielded.
    #[must_use]
    pub fn try_values<T: DeserializeOwned>(&self) -> TryValues<T> {
        match self.open_source() {
            Ok(src) => TryValues::from_reader(src, &self.options),
            Err(err) => TryValues::failed(err, &self.options),
        }
    }

    /// Drain [`values`](Self::values) into a `Vec`, in file order.
    ///
    /// Meant for small files; the whole result is held in memory.
    #[must_use]
    pub fn collect_all<T: DeserializeOwned>(&self) -> Vec<T> {
        self.values().collect()
    }

    /// Drain [`records`](Self::records) into a `Vec`, in file order.
    #[must_use]
    pub fn collect_all_raw(&self) -> Vec<Vec<u8>> {
        self.records().collect()
    }

    fn open_source(&self) -> Result<DynSource> {
        let file = File::open(&self.path).map_err(|source| JsonlError::Open {
            path: self.path.clone(),
            source,
        })?;
        self.options.sink.emit(
            Level::Debug,
            "reader",
            format_args!("opened {} for streaming", self.path.display()),
        );
        if !self.options.decompress {
            return Ok(Box::new(file));
        }
        Ok(Box::new(self.options.codecs.auto_detect_reader(file, &self.path)))
    }
}

/// Read a whole JSONL file into a `Vec<T>`, failing on the first bad line.
///
/// # Errors
/// Returns the construction error, or the first open, read or decode failure.
pub fn read_jsonl_vec<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    JsonlReader::open(path)?.try_values().collect()
}
