//! Bool handler.
//!
//! One byte per value: `0x00` is false, `0x01` is true, and any nonzero
//! byte decodes to true. Shares protocol code `0x01` with `UInt8`; the
//! printable name is what tells them apart.

use std::borrow::Cow;

use crate::error::Result;
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::SimdCaps;

use super::ColumnType;

/// `Bool`: one byte per value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoolType {
    caps: SimdCaps,
}

impl BoolType {
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
}

impl Default for BoolType {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for BoolType {
    type Value = bool;

    fn protocol_code(&self) -> u8 {
        0x01
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Bool")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(1)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<bool> {
        let mut raw = [0u8; 1];
        super::read_fixed(seq, &mut raw)?;
        Ok(raw[0] != 0)
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<bool>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len());
        let mut remaining = count;
        let mut chunk = [0u8; 256];
        while remaining > 0 {
            let take = remaining.min(chunk.len());
            let buf = &mut chunk[..take];
            seq.copy_to(buf)?;
            seq.advance(take)?;
            dst.extend(buf.iter().map(|b| *b != 0));
            remaining -= take;
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &bool) -> Result<()> {
        w.put_u8(u8::from(*value));
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[bool]) -> Result<()> {
        let span = w.span(values.len());
        for (slot, value) in span.iter_mut().zip(values) {
            *slot = u8::from(*value);
        }
        w.advance(values.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_bytes() {
        let ty = BoolType::new();
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &[true, false, true]).expect("write");
        assert_eq!(w.as_slice(), &[0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_any_nonzero_byte_is_true() {
        let ty = BoolType::new();
        let mut seq = ByteSequence::from(vec![0x00, 0x01, 0xff, 0x80]);
        let mut out = Vec::new();
        ty.read_values(&mut seq, &mut out, 4).expect("read");
        assert_eq!(out, vec![false, true, true, true]);
    }

    #[test]
    fn test_bulk_crosses_chunk_boundary() {
        let ty = BoolType::new();
        let raw: Vec<u8> = (0..600).map(|i| u8::from(i % 3 == 0)).collect();
        let expected: Vec<bool> = raw.iter().map(|b| *b != 0).collect();
        let mut seq = ByteSequence::from(raw);
        let mut out = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, 600).expect("read");
        assert_eq!(n, 600);
        assert_eq!(out, expected);
    }
}
