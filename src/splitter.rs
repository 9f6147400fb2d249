//! Newline splitting over arbitrarily sized chunks.
//!
//! [`LineSplitter`] owns the carry-over buffer of a read session. Chunks are
//! pushed in as they arrive; complete records are pulled out one at a time.
//! Record boundaries depend only on where the `\n` bytes are, never on where
//! the chunk boundaries fell.
//!
//! Mid-stream empty lines are dropped. The final unterminated remainder is
//! returned by [`LineSplitter::finish`] whatever it contains, as long as it is
//! non-empty.

/// Carry-over buffer that reassembles `\n`-delimited records from chunks.
///
/// ```
/// use jsonl_stream::LineSplitter;
///
/// let mut s = LineSplitter::new();
/// s.push(b"{\"a\":1}\n{\"a\"");
/// assert_eq!(s.next_record().as_deref(), Some(&b"{\"a\":1}"[..]));
/// assert_eq!(s.next_record(), None);
/// s.push(b":2}");
/// assert_eq!(s.finish().as_deref(), Some(&b"{\"a\":2}"[..]));
/// ```
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
    /// Start of the unconsumed region of `buf`.
    start: usize,
    /// Everything in `buf[start..scan]` is known to contain no `\n`.
    scan: usize,
    lines: u64,
    empty_dropped: u64,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scan -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Carve out the next complete, non-empty record.
    ///
    /// Returns `None` once no delimiter remains in the buffer; at that point the
    /// buffer holds at most one partial record.
    pub fn next_record(&mut self) -> Option<Vec<u8>> {
        loop {
            let Some(offset) = self.buf[self.scan..].iter().position(|&b| b == b'\n') else {
                self.scan = self.buf.len();
                return None;
            };
            let end = self.scan + offset;
            let begin = self.start;
            self.start = end + 1;
            self.scan = self.start;
            self.lines += 1;

            if end == begin {
                self.empty_dropped += 1;
                continue;
            }
            return Some(self.buf[begin..end].to_vec());
        }
    }

    /// Flush the unterminated remainder at end-of-input.
    ///
    /// Leaves the splitter empty. Yields nothing when the input ended cleanly on
    /// a delimiter.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let rest = self.buf.split_off(self.start);
        self.clear();
        if rest.is_empty() {
            return None;
        }
        self.lines += 1;
        Some(rest)
    }

    /// Discard any buffered bytes without emitting them.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
        self.scan = 0;
    }

    /// Number of buffered bytes not yet emitted.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Physical (1-based) line number of the record most recently returned.
    ///
    /// Empty lines count towards the numbering even though they are dropped.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.lines
    }

    /// How many empty lines have been dropped so far.
    #[must_use]
    pub fn empty_lines_dropped(&self) -> u64 {
        self.empty_dropped
    }
}
