//! LEB128 unsigned varint codec.
//!
//! Little-endian base-128: each byte carries 7 value bits, MSB set on every
//! byte except the last. String lengths and block header counts are framed
//! this way, so the one- and two-byte fast paths matter; both are inlined
//! before the general loop.

use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};

/// Longest legal encoding of a u64.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` and return the number of bytes written.
#[inline]
pub fn write_varint(w: &mut ByteWriter, value: u64) -> usize {
    if value < 0x80 {
        w.put_u8(value as u8);
        return 1;
    }
    if value < 0x4000 {
        let span = w.span(2);
        span[0] = (value as u8) | 0x80;
        span[1] = (value >> 7) as u8;
        w.advance(2);
        return 2;
    }
    let span = w.span(MAX_VARINT_LEN);
    let mut v = value;
    let mut n = 0;
    while v >= 0x80 {
        span[n] = (v as u8) | 0x80;
        v >>= 7;
        n += 1;
    }
    span[n] = v as u8;
    w.advance(n + 1);
    n + 1
}

/// Decode a varint without consuming; returns the value and its encoded
/// length. Used where a declared payload must be checked before any bytes
/// are committed.
#[inline]
pub fn peek_varint(seq: &ByteSequence) -> Result<(u64, usize)> {
    let span = seq.first_span();
    if let Some(&b0) = span.first() {
        if b0 < 0x80 {
            return Ok((u64::from(b0), 1));
        }
        if let Some(&b1) = span.get(1) {
            if b1 < 0x80 {
                return Ok((u64::from(b0 & 0x7f) | u64::from(b1) << 7, 2));
            }
        }
    }
    // General path: walk bytes, possibly across segments.
    let mut value = 0u64;
    let mut idx = 0;
    loop {
        let Some(byte) = seq.peek(idx) else {
            return Err(CodecError::underrun(idx + 1, seq.len()));
        };
        value |= u64::from(byte & 0x7f) << (7 * idx);
        idx += 1;
        if byte < 0x80 {
            return Ok((value, idx));
        }
        if idx == MAX_VARINT_LEN {
            return Err(CodecError::MalformedVarint);
        }
    }
}

/// Decode a varint, consuming its bytes.
#[inline]
pub fn read_varint(seq: &mut ByteSequence) -> Result<u64> {
    let (value, consumed) = peek_varint(seq)?;
    seq.advance(consumed)?;
    Ok(value)
}
