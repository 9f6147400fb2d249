//! Pluggable decompression for JSONL sources.
//!
//! A compressed file (`events.jsonl.gz`, `dump.jsonl.zst`, ...) is unwrapped
//! before it reaches the line splitter, so chunking and record boundaries are
//! computed on the decompressed bytes.
//!
//! ## Built-in Codecs
//!
//! When enabled via feature flags, the following codecs are registered by
//! [`CodecRegistry::builtin`]:
//! - **Gzip** (`.gz`) - via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) - via `zstd` (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`) - via `bzip2` (feature: `compression-bzip2`)
//! - **Xz** (`.xz`) - via `xz2` (feature: `compression-xz`)
//!
//! ## Detection
//! Detection is deferred to the first read. File extensions are checked
//! first; `.jsonl`/`.ndjson`/`.json` paths are read as-is; anything else is
//! sniffed for magic bytes. A source that matches nothing is passed through
//! unchanged.
//!
//! ## Custom Codecs
//! ```
//! use jsonl_stream::io::{CodecRegistry, CompressionCodec};
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! struct Identity;
//!
//! impl CompressionCodec for Identity {
//!     fn name(&self) -> &str { "identity" }
//!     fn extensions(&self) -> &[&str] { &[".ident"] }
//!     fn magic_bytes(&self) -> Option<&[u8]> { None }
//!     fn wrap_reader_dyn(
//!         &self,
//!         reader: Box<dyn Read + Send>,
//!     ) -> std::io::Result<Box<dyn Read + Send>> {
//!         Ok(reader)
//!     }
//! }
//!
//! let registry = CodecRegistry::builtin().with_codec(Arc::new(Identity));
//! assert!(registry.names().contains(&"identity"));
//! ```

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decompression algorithm that can sit in front of the line splitter.
///
/// Implementations must be `Send + Sync`: one registry is shared by every
/// session opened from the same [`ReaderOptions`](crate::ReaderOptions).
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &str;

    /// File extensions associated with this codec (e.g., `&[".gz", ".gzip"]`).
    ///
    /// Extensions should include the leading dot and be lowercase.
    fn extensions(&self) -> &[&str];

    /// Optional magic byte signature for content-based detection.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Wrap a reader with decompression.
    fn wrap_reader_dyn(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Ordered set of codecs consulted when a file is opened.
///
/// The first codec whose extension (or, failing that, magic bytes) matches wins.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn CompressionCodec>>,
}

impl CodecRegistry {
    /// Registry holding every codec enabled at compile time.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            codecs: vec![
                #[cfg(feature = "compression-gzip")]
                Arc::new(GzipCodec),
                #[cfg(feature = "compression-zstd")]
                Arc::new(ZstdCodec),
                #[cfg(feature = "compression-bzip2")]
                Arc::new(Bzip2Codec),
                #[cfg(feature = "compression-xz")]
                Arc::new(XzCodec),
            ],
        }
    }

    /// Registry with no codecs; every source is passed through.
    #[must_use]
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Append a codec. It is consulted after the ones already registered.
    pub fn register(&mut self, codec: Arc<dyn CompressionCodec>) {
        self.codecs.push(codec);
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn CompressionCodec>) -> Self {
        self.register(codec);
        self
    }

    /// Names of the registered codecs, in lookup order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.codecs.iter().map(|c| c.name()).collect()
    }

    /// Detect a codec from the path extension. Matching is case-insensitive.
    #[must_use]
    pub fn detect_from_extension(&self, path: impl AsRef<Path>) -> Option<Arc<dyn CompressionCodec>> {
        let path_str = path.as_ref().to_string_lossy().to_lowercase();
        self.codecs
            .iter()
            .find(|codec| codec.extensions().iter().any(|ext| path_str.ends_with(ext)))
            .cloned()
    }

    /// Detect a codec from the first bytes of a stream.
    #[must_use]
    pub fn detect_from_header(&self, head: &[u8]) -> Option<Arc<dyn CompressionCodec>> {
        if head.is_empty() {
            return None;
        }
        self.codecs
            .iter()
            .find(|codec| codec.magic_bytes().is_some_and(|magic| head.starts_with(magic)))
            .cloned()
    }

    /// Length of the longest registered magic signature.
    #[must_use]
    pub fn max_magic_len(&self) -> usize {
        self.codecs
            .iter()
            .filter_map(|c| c.magic_bytes().map(<[u8]>::len))
            .max()
            .unwrap_or(0)
    }

    /// Wrap `reader` with decompression if the path or content calls for it.
    ///
    /// No I/O happens here. Detection runs on the first `read` of the returned
    /// reader:
    /// 1. Check file path extension
    /// 2. Paths ending in `.jsonl`, `.ndjson` or `.json` are taken as plain text
    /// 3. Otherwise peek at most [`max_magic_len`](Self::max_magic_len) bytes
    ///    and match magic signatures
    /// 4. Pass the bytes through unchanged if nothing matched
    #[must_use]
    pub fn auto_detect_reader<R: Read + Send + 'static>(
        &self,
        reader: R,
        path_hint: impl AsRef<Path>,
    ) -> DetectingReader<R> {
        DetectingReader {
            state: Detect::Pending {
                inner: reader,
                codecs: self.clone(),
                hint: path_hint.as_ref().to_path_buf(),
            },
        }
    }

    fn resolve<R: Read + Send + 'static>(
        &self,
        mut inner: R,
        hint: &Path,
    ) -> io::Result<Box<dyn Read + Send>> {
        if let Some(codec) = self.detect_from_extension(hint) {
            return codec.wrap_reader_dyn(Box::new(inner));
        }
        let lower = hint.to_string_lossy().to_lowercase();
        let peek = self.max_magic_len();
        if peek == 0 || PLAIN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Ok(Box::new(inner));
        }

        let mut head = Vec::with_capacity(peek);
        (&mut inner).take(peek as u64).read_to_end(&mut head)?;
        let codec = self.detect_from_header(&head);
        let rest: Box<dyn Read + Send> = Box::new(io::Cursor::new(head).chain(inner));
        match codec {
            Some(codec) => codec.wrap_reader_dyn(rest),
            None => Ok(rest),
        }
    }
}

/// Extensions that are never sniffed for magic bytes.
const PLAIN_EXTENSIONS: &[&str] = &[".jsonl", ".ndjson", ".json"];

/// Reader returned by [`CodecRegistry::auto_detect_reader`].
///
/// Resolves the codec on its first `read`. Plain sources are then read with
/// the caller's buffer size; the only extra read is the magic-byte peek for
/// paths without a recognised extension.
pub struct DetectingReader<R> {
    state: Detect<R>,
}

enum Detect<R> {
    Pending {
        inner: R,
        codecs: CodecRegistry,
        hint: PathBuf,
    },
    Ready(Box<dyn Read + Send>),
    Broken,
}

impl<R> DetectingReader<R> {
    /// Whether the codec has been chosen (i.e. the source has been read).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, Detect::Pending { .. })
    }
}

impl<R: Read + Send + 'static> Read for DetectingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Detect::Pending { .. } = self.state {
            if let Detect::Pending { inner, codecs, hint } =
                std::mem::replace(&mut self.state, Detect::Broken)
            {
                self.state = Detect::Ready(codecs.resolve(inner, &hint)?);
            }
        }
        match &mut self.state {
            Detect::Ready(reader) => reader.read(buf),
            _ => Err(io::Error::other("decompression setup failed")),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ============================================================================
// Built-in Codec Implementations
// ============================================================================

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        // Multi-member so files built by repeated `gzip >>` appends read in full.
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read + Send>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(b"BZh")
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(xz2::read::XzDecoder::new(reader)))
    }
}
