//! UUID handler.
//!
//! The server's 16-byte order differs from the RFC 4122 layout: with native
//! bytes split as `[0..4][4..6][6..8][8..16]`, the wire carries
//! `[6..8][4..6][0..4][reverse(8..16)]`. The scalar shuffle below is the
//! ground truth; the vector paths replicate the same index vector per
//! 128-bit lane, so every tier produces identical bytes.

use std::borrow::Cow;

use uuid::Uuid;

use crate::error::Result;
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::{shuffle_16_scalar, shuffle_lanes_16, SimdCaps};

use super::{read_fixed, ColumnType};

/// Wire byte `i` is native byte `WIRE_FROM_NATIVE[i]`.
const WIRE_FROM_NATIVE: [u8; 16] = [6, 7, 4, 5, 0, 1, 2, 3, 15, 14, 13, 12, 11, 10, 9, 8];
/// Native byte `i` is wire byte `NATIVE_FROM_WIRE[i]` (inverse permutation).
const NATIVE_FROM_WIRE: [u8; 16] = [4, 5, 6, 7, 2, 3, 0, 1, 15, 14, 13, 12, 11, 10, 9, 8];

/// Scratch chunk: 64 elements.
const CHUNK_BYTES: usize = 1024;

/// `UUID`: 16 bytes in the server's shuffled order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UuidType {
    caps: SimdCaps,
}

impl UuidType {
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

impl Default for UuidType {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for UuidType {
    type Value = Uuid;

    fn protocol_code(&self) -> u8 {
        0x1D
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("UUID")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(16)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<Uuid> {
        let mut wire = [0u8; 16];
        read_fixed(seq, &mut wire)?;
        let mut native = [0u8; 16];
        shuffle_16_scalar(&wire, &mut native, &NATIVE_FROM_WIRE);
        Ok(Uuid::from_bytes(native))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<Uuid>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 16);
        if count == 0 {
            return Ok(0);
        }
        let total = count * 16;
        if seq.first_span().len() >= total {
            let mut native = [0u8; CHUNK_BYTES];
            let span = seq.first_span();
            let mut off = 0;
            while off < total {
                let take = (total - off).min(CHUNK_BYTES);
                shuffle_lanes_16(
                    &self.caps,
                    &span[off..off + take],
                    &mut native[..take],
                    &NATIVE_FROM_WIRE,
                );
                for chunk in native[..take].chunks_exact(16) {
                    let mut raw = [0u8; 16];
                    raw.copy_from_slice(chunk);
                    dst.push(Uuid::from_bytes(raw));
                }
                off += take;
            }
            seq.advance(total)?;
        } else {
            for _ in 0..count {
                let value = self.read_value(seq)?;
                dst.push(value);
            }
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &Uuid) -> Result<()> {
        let span = w.span(16);
        shuffle_16_scalar(value.as_bytes(), &mut span[..16], &WIRE_FROM_NATIVE);
        w.advance(16);
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[Uuid]) -> Result<()> {
        let mut native = [0u8; CHUNK_BYTES];
        for chunk in values.chunks(CHUNK_BYTES / 16) {
            let bytes = chunk.len() * 16;
            for (i, value) in chunk.iter().enumerate() {
                native[i * 16..i * 16 + 16].copy_from_slice(value.as_bytes());
            }
            let span = w.span(bytes);
            shuffle_lanes_16(&self.caps, &native[..bytes], &mut span[..bytes], &WIRE_FROM_NATIVE);
            w.advance(bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::SimdTier;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_vector() {
        let ty = UuidType::new();
        let id = Uuid::parse_str("01234567-89AB-CDEF-0123-456789ABCDEF").expect("valid uuid");
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &id).expect("write");
        assert_eq!(
            w.as_slice(),
            &[
                0xCD, 0xEF, 0x89, 0xAB, 0x01, 0x23, 0x45, 0x67, 0xEF, 0xCD, 0xAB, 0x89, 0x67,
                0x45, 0x23, 0x01
            ]
        );
    }

    #[test]
    fn test_decode_then_encode_restores_wire_bytes() {
        let ty = UuidType::new();
        let wire: Vec<u8> = (0u8..=255).take(160).collect();
        let mut seq = ByteSequence::from(wire.clone());
        let mut ids = Vec::new();
        ty.read_values(&mut seq, &mut ids, 10).expect("read");

        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &ids).expect("write");
        assert_eq!(w.finish().as_ref(), &wire[..]);
    }

    #[test]
    fn test_bulk_matches_single_across_tiers() {
        let ids: Vec<Uuid> = (0u128..300).map(|i| Uuid::from_u128(i.wrapping_mul(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210))).collect();
        let mut single = ByteWriter::new();
        let scalar = UuidType::with_caps(SimdCaps::native().capped(SimdTier::Scalar));
        for id in &ids {
            scalar.write_value(&mut single, id).expect("write");
        }
        let expected = single.finish();

        for tier in [SimdTier::Ssse3, SimdTier::Avx2, SimdTier::Avx512Bw] {
            let ty = UuidType::with_caps(SimdCaps::native().capped(tier));
            let mut bulk = ByteWriter::new();
            ty.write_values(&mut bulk, &ids).expect("write");
            assert_eq!(bulk.finish(), expected, "tier {tier:?}");

            let mut seq = ByteSequence::from(expected.clone());
            let mut out = Vec::new();
            ty.read_values(&mut seq, &mut out, ids.len()).expect("read");
            assert_eq!(out, ids, "tier {tier:?}");
        }
    }

    #[test]
    fn test_split_input_matches_contiguous() {
        let ty = UuidType::new();
        let ids: Vec<Uuid> = (1u128..=5).map(Uuid::from_u128).collect();
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &ids).expect("write");
        let encoded = w.finish();

        for at in [1, 8, 16, 17, 40, 79] {
            let mut seq = ByteSequence::from_segments([
                encoded.slice(..at),
                encoded.slice(at..),
            ]);
            let mut out = Vec::new();
            ty.read_values(&mut seq, &mut out, ids.len()).expect("read");
            assert_eq!(out, ids, "split at {at}");
        }
    }
}
