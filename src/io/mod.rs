//! Source-side I/O adapters wrapped around the raw file handle.

pub mod compression;

pub use compression::{CodecRegistry, CompressionCodec, DetectingReader};
