//! Error type shared by the reader and the writer.
//!
//! Construction-time conditions are always returned to the caller. Failures that
//! happen while streaming or writing are only returned by the strict entry points
//! (`try_*`); the tolerant ones report them to the configured
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink) and carry on.

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T, E = JsonlError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    /// The file handed to a reader does not exist.
    #[error("file does not exist: {}", .path.display())]
    TargetMissing { path: PathBuf },

    /// The file exists but can't be opened for reading.
    #[error("file is not readable: {}", .path.display())]
    TargetUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A writer was asked not to append, but the target already exists.
    #[error("file already exists and appending is disabled: {}", .path.display())]
    TargetExists { path: PathBuf },

    /// Opening or creating a file failed.
    #[error("failed to open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A chunk read failed while streaming.
    #[error("error reading data: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    /// One record could not be decoded into the requested type.
    #[error("line {line} did not decode ({len} bytes): {source}")]
    Decode {
        line: u64,
        len: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a value for writing failed.
    #[error("error encoding object: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// Appending a record failed.
    #[error("error writing to file: {source}")]
    Write {
        #[source]
        source: io::Error,
    },

    /// Flushing or syncing on close failed.
    #[error("error closing file: {source}")]
    Close {
        #[source]
        source: io::Error,
    },

    /// The writer was already closed.
    #[error("writer is closed")]
    Closed,
}
