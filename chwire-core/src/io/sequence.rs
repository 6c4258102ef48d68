//! Segmented input reader.
//!
//! A [`ByteSequence`] is an ordered list of immutable [`Bytes`] segments with
//! a cached total length. Response bodies usually arrive as one contiguous
//! buffer, and every bulk decoder has a fast path for that shape; when a
//! payload straddles a segment boundary the decoders fall back to copying
//! element-by-element through a small stack buffer.
//!
//! Consumption is by prefix: `advance(n)` rebinds the sequence to its own
//! suffix, zero-copy. Reads never mutate segment contents.

use bytes::Bytes;

use crate::error::{CodecError, Result};

/// Ordered sequence of immutable byte segments.
#[derive(Debug, Clone, Default)]
pub struct ByteSequence {
    /// Non-empty segments, in stream order.
    segments: Vec<Bytes>,
    /// Sum of segment lengths.
    len: usize,
}

impl ByteSequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit segments. Empty segments are dropped.
    pub fn from_segments(segments: impl IntoIterator<Item = Bytes>) -> Self {
        let segments: Vec<Bytes> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        let len = segments.iter().map(Bytes::len).sum();
        Self { segments, len }
    }

    /// Total remaining bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no bytes remain.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Contiguous view of the first segment. Empty only when the whole
    /// sequence is empty.
    pub fn first_span(&self) -> &[u8] {
        self.segments.first().map_or(&[], |s| s.as_ref())
    }

    /// True iff there is exactly one segment, enabling the SIMD fast path
    /// over the full remaining payload.
    pub fn is_single_segment(&self) -> bool {
        self.segments.len() == 1
    }

    /// Byte at `index` without consuming, walking segments as needed.
    pub fn peek(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        let mut index = index;
        for seg in &self.segments {
            if index < seg.len() {
                return Some(seg[index]);
            }
            index -= seg.len();
        }
        None
    }

    /// Zero-copy subrange `[start, start + len)`.
    pub fn slice(&self, start: usize, len: usize) -> Result<Self> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| CodecError::underrun(usize::MAX, self.len))?;
        if end > self.len {
            return Err(CodecError::underrun(end, self.len));
        }
        let mut out = Vec::new();
        let mut skip = start;
        let mut take = len;
        for seg in &self.segments {
            if take == 0 {
                break;
            }
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let upto = (seg.len() - skip).min(take);
            out.push(seg.slice(skip..skip + upto));
            take -= upto;
            skip = 0;
        }
        Ok(Self {
            segments: out,
            len,
        })
    }

    /// Copy the first `dst.len()` bytes into `dst` without consuming,
    /// crossing as many segments as needed.
    pub fn copy_to(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.len {
            return Err(CodecError::underrun(dst.len(), self.len));
        }
        let mut filled = 0;
        for seg in &self.segments {
            if filled == dst.len() {
                break;
            }
            let take = seg.len().min(dst.len() - filled);
            dst[filled..filled + take].copy_from_slice(&seg[..take]);
            filled += take;
        }
        Ok(())
    }

    /// Consume the first `n` bytes, rebinding the sequence to its suffix.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.len {
            return Err(CodecError::underrun(n, self.len));
        }
        let mut drop = n;
        while drop > 0 {
            let head_len = self.segments[0].len();
            if head_len <= drop {
                self.segments.remove(0);
                drop -= head_len;
            } else {
                let head = &mut self.segments[0];
                *head = head.slice(drop..);
                drop = 0;
            }
        }
        self.len -= n;
        Ok(())
    }

    /// Consume and return exactly `n` bytes. Zero-copy when the payload fits
    /// in the first segment.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        if n > self.len {
            return Err(CodecError::underrun(n, self.len));
        }
        let out = if self.first_span().len() >= n {
            self.segments[0].slice(..n)
        } else {
            let mut buf = vec![0u8; n];
            self.copy_to(&mut buf)?;
            Bytes::from(buf)
        };
        self.advance(n)?;
        Ok(out)
    }
}

impl From<Bytes> for ByteSequence {
    fn from(bytes: Bytes) -> Self {
        let len = bytes.len();
        let segments = if len == 0 { Vec::new() } else { vec![bytes] };
        Self { segments, len }
    }
}

impl From<Vec<u8>> for ByteSequence {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<&[u8]> for ByteSequence {
    fn from(bytes: &[u8]) -> Self {
        Bytes::copy_from_slice(bytes).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(data: &[u8], at: usize) -> ByteSequence {
        ByteSequence::from_segments([
            Bytes::copy_from_slice(&data[..at]),
            Bytes::copy_from_slice(&data[at..]),
        ])
    }

    #[test]
    fn test_single_segment_fast_path_shape() {
        let seq = ByteSequence::from(&b"abcdef"[..]);
        assert!(seq.is_single_segment());
        assert_eq!(seq.first_span(), b"abcdef");
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let seq = ByteSequence::from_segments([
            Bytes::new(),
            Bytes::from_static(b"ab"),
            Bytes::new(),
            Bytes::from_static(b"cd"),
        ]);
        assert_eq!(seq.len(), 4);
        assert!(!seq.is_single_segment());
        assert_eq!(seq.first_span(), b"ab");
    }

    #[test]
    fn test_copy_to_crosses_segments() {
        let seq = split(b"hello world", 4);
        let mut dst = [0u8; 11];
        seq.copy_to(&mut dst).expect("copy in range");
        assert_eq!(&dst, b"hello world");
        // Non-consuming.
        assert_eq!(seq.len(), 11);
    }

    #[test]
    fn test_advance_rebinds_to_suffix() {
        let mut seq = split(b"hello world", 4);
        seq.advance(6).expect("advance in range");
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.first_span(), b"world");
        assert!(seq.is_single_segment());
    }

    #[test]
    fn test_slice_is_zero_copy_subrange() {
        let seq = split(b"hello world", 4);
        let sub = seq.slice(3, 5).expect("slice in range");
        assert_eq!(sub.len(), 5);
        let mut dst = [0u8; 5];
        sub.copy_to(&mut dst).expect("copy");
        assert_eq!(&dst, b"lo wo");
    }

    #[test]
    fn test_slice_out_of_range() {
        let seq = ByteSequence::from(&b"abc"[..]);
        assert!(matches!(
            seq.slice(1, 3),
            Err(CodecError::Underrun { needed: 4, available: 3 })
        ));
    }

    #[test]
    fn test_read_bytes_zero_copy_within_first_segment() {
        let mut seq = ByteSequence::from(&b"abcdef"[..]);
        let head = seq.read_bytes(3).expect("read");
        assert_eq!(head.as_ref(), b"abc");
        assert_eq!(seq.first_span(), b"def");
    }

    #[test]
    fn test_read_bytes_across_boundary() {
        let mut seq = split(b"abcdef", 2);
        let head = seq.read_bytes(4).expect("read");
        assert_eq!(head.as_ref(), b"abcd");
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_peek_walks_segments() {
        let seq = split(b"abcdef", 3);
        assert_eq!(seq.peek(0), Some(b'a'));
        assert_eq!(seq.peek(3), Some(b'd'));
        assert_eq!(seq.peek(5), Some(b'f'));
        assert_eq!(seq.peek(6), None);
    }
}
