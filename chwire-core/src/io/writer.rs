//! Append-only output buffer.
//!
//! A [`ByteWriter`] vends contiguous writable spans of a requested minimum
//! size; the caller writes into the span and then commits exactly the number
//! of bytes it produced with [`ByteWriter::advance`]. The span may be larger
//! than requested. Spans must not be held across calls.

use bytes::Bytes;

/// Growable append-only byte sink.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    committed: usize,
}

impl ByteWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty writer with `capacity` bytes preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            committed: 0,
        }
    }

    /// Bytes committed so far.
    pub fn position(&self) -> usize {
        self.committed
    }

    /// View of the committed output.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.committed]
    }

    /// A writable span of at least `min` bytes starting at the commit
    /// position. The returned span may be longer than `min`.
    pub fn span(&mut self, min: usize) -> &mut [u8] {
        let need = self.committed + min;
        if self.buf.len() < need {
            // Grow geometrically so a run of small spans doesn't re-zero
            // the tail on every call.
            let grown = need.max(self.buf.len().saturating_mul(2)).max(64);
            self.buf.resize(grown, 0);
        }
        &mut self.buf[self.committed..]
    }

    /// Commit exactly `n` bytes written into the last vended span.
    pub fn advance(&mut self, n: usize) {
        assert!(
            self.committed + n <= self.buf.len(),
            "advance past the vended span: {} + {} > {}",
            self.committed,
            n,
            self.buf.len()
        );
        self.committed += n;
    }

    /// Append one byte.
    pub fn put_u8(&mut self, byte: u8) {
        self.span(1)[0] = byte;
        self.advance(1);
    }

    /// Append a byte slice.
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.span(bytes.len())[..bytes.len()].copy_from_slice(bytes);
        self.advance(bytes.len());
    }

    /// Consume the writer, returning the committed output.
    pub fn finish(mut self) -> Bytes {
        self.buf.truncate(self.committed);
        Bytes::from(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_returns_at_least_min() {
        let mut w = ByteWriter::new();
        let span = w.span(10);
        assert!(span.len() >= 10);
    }

    #[test]
    fn test_advance_commits_exactly() {
        let mut w = ByteWriter::new();
        let span = w.span(8);
        span[..3].copy_from_slice(b"abc");
        w.advance(3);
        assert_eq!(w.position(), 3);
        assert_eq!(w.as_slice(), b"abc");
    }

    #[test]
    fn test_repeated_spans_append() {
        let mut w = ByteWriter::new();
        for chunk in [&b"row"[..], b"binary", b"!"] {
            let span = w.span(chunk.len());
            span[..chunk.len()].copy_from_slice(chunk);
            w.advance(chunk.len());
        }
        assert_eq!(w.finish().as_ref(), b"rowbinary!");
    }

    #[test]
    fn test_put_helpers() {
        let mut w = ByteWriter::with_capacity(16);
        w.put_u8(0x16);
        w.put_slice(b"Hello");
        assert_eq!(w.as_slice(), b"\x16Hello");
    }

    #[test]
    #[should_panic(expected = "advance past the vended span")]
    fn test_advance_past_span_panics() {
        let mut w = ByteWriter::new();
        w.span(4);
        w.advance(4096);
    }
}
