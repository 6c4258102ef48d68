//! String and FixedString handlers.
//!
//! `String` is a varint byte-count prefix followed by that many payload
//! bytes, preserved verbatim with no UTF-8 validation; the empty string is
//! the single byte `0x00`. Decoding is zero-copy when a payload sits inside
//! one segment. Writing many small ASCII strings takes a batched path: one
//! span for the whole run, varints encoded inline, one commit.
//!
//! `FixedString(n)` is exactly `n` bytes per value, right-padded with NUL
//! on write. Reading strips trailing NUL bytes, so a payload of all zeros
//! decodes to the empty string; this is lossy for values that legitimately
//! end in NUL and matches the server's own round-trip behavior.

use std::borrow::Cow;

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::io::{peek_varint, write_varint, ByteSequence, ByteWriter};
use crate::simd::{is_ascii_lanes, SimdCaps};

use super::ColumnType;

/// Batched-write heuristic bounds: a run of values is batched when every
/// value is at most `BATCH_MAX_ITEM` bytes, the payload total is at most
/// `BATCH_MAX_TOTAL`, and at least 70% of the payload bytes are ASCII.
const BATCH_MAX_TOTAL: usize = 1024;
const BATCH_MAX_ITEM: usize = 64;

/// `String`: varint length prefix plus payload bytes, verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringType {
    caps: SimdCaps,
}

impl StringType {
    /// Handler with the natively probed capability set.
    pub fn new() -> Self {
        Self {
            caps: SimdCaps::native(),
        }
    }

    /// Handler with an explicit capability set.
    pub fn with_caps(caps: SimdCaps) -> Self {
        Self { caps }
    }

    /// Batched small-ASCII write. Returns false when the heuristic does not
    /// hold; output is byte-identical to the per-value path either way.
    fn try_write_batched(&self, w: &mut ByteWriter, values: &[Bytes]) -> bool {
        if values.is_empty() {
            return false;
        }
        let mut total = 0;
        for value in values {
            if value.len() > BATCH_MAX_ITEM {
                return false;
            }
            total += value.len();
            if total > BATCH_MAX_TOTAL {
                return false;
            }
        }
        let ascii: usize = values
            .iter()
            .filter(|v| is_ascii_lanes(&self.caps, v))
            .map(|v| v.len())
            .sum();
        if ascii * 10 < total * 7 {
            return false;
        }
        // Every length is at most 64, so each varint prefix is one byte.
        let framed = total + values.len();
        let span = w.span(framed);
        let mut off = 0;
        for value in values {
            span[off] = value.len() as u8;
            off += 1;
            span[off..off + value.len()].copy_from_slice(value);
            off += value.len();
        }
        w.advance(framed);
        true
    }
}

impl Default for StringType {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for StringType {
    type Value = Bytes;

    fn protocol_code(&self) -> u8 {
        0x15
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("String")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        None
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<Bytes> {
        let (len, prefix) = peek_varint(seq)?;
        let len = usize::try_from(len)
            .map_err(|_| CodecError::underrun(usize::MAX, seq.len()))?;
        if seq.len() < prefix + len {
            // Declared payload is missing; consume nothing.
            return Err(CodecError::underrun(prefix + len, seq.len()));
        }
        seq.advance(prefix)?;
        seq.read_bytes(len)
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<Bytes>,
        limit: usize,
    ) -> Result<usize> {
        let mut appended = 0;
        while appended < limit && !seq.is_empty() {
            match peek_varint(seq) {
                Ok((len, prefix)) => {
                    let len = len as usize;
                    if seq.len() < prefix + len {
                        // Incomplete trailing item: stop without consuming.
                        break;
                    }
                    seq.advance(prefix)?;
                    let payload = seq.read_bytes(len)?;
                    dst.push(payload);
                    appended += 1;
                }
                // Truncated varint at the tail is an incomplete item too.
                Err(CodecError::Underrun { .. }) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(appended)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &Bytes) -> Result<()> {
        write_varint(w, value.len() as u64);
        w.put_slice(value);
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[Bytes]) -> Result<()> {
        if self.try_write_batched(w, values) {
            return Ok(());
        }
        for value in values {
            self.write_value(w, value)?;
        }
        Ok(())
    }
}

/// `FixedString(n)`: exactly `n` bytes per value, NUL-padded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStringType {
    length: usize,
    caps: SimdCaps,
}

impl FixedStringType {
    /// Smallest and largest accepted lengths.
    pub const MIN_LENGTH: usize = 1;
    pub const MAX_LENGTH: usize = 1_000_000;

    /// Handler for `FixedString(length)`.
    pub fn new(length: usize) -> Result<Self> {
        Self::with_caps(length, SimdCaps::native())
    }

    /// Handler with an explicit capability set.
    pub fn with_caps(length: usize, caps: SimdCaps) -> Result<Self> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(CodecError::parameter(
                "FixedString",
                "length",
                format!("{length} is outside 1..=1000000"),
            ));
        }
        Ok(Self { length, caps })
    }

    /// Declared per-value byte length.
    pub fn length(&self) -> usize {
        self.length
    }

    fn strip_padding(raw: Bytes) -> Bytes {
        let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        raw.slice(..end)
    }
}

impl ColumnType for FixedStringType {
    type Value = Bytes;

    fn protocol_code(&self) -> u8 {
        0x16
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("FixedString({})", self.length))
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(self.length)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<Bytes> {
        let raw = seq.read_bytes(self.length)?;
        Ok(Self::strip_padding(raw))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<Bytes>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / self.length);
        for _ in 0..count {
            let value = self.read_value(seq)?;
            dst.push(value);
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &Bytes) -> Result<()> {
        if value.len() > self.length {
            return Err(CodecError::overflow(
                self.type_name(),
                format!("{} payload bytes exceed the declared length", value.len()),
            ));
        }
        let span = w.span(self.length);
        span[..value.len()].copy_from_slice(value);
        span[value.len()..self.length].fill(0);
        w.advance(self.length);
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[Bytes]) -> Result<()> {
        for value in values {
            self.write_value(w, value)?;
        }
        Ok(())
    }
}
