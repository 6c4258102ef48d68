//! Fixed-width integer and float handlers.
//!
//! All ten are little-endian on the wire, `sizeof` bytes per value, so the
//! bulk paths are pure lane copies on little-endian hosts. Floats go through
//! the same byte-copy kernels, which preserves NaN payloads bit for bit.

use super::lane_type;

lane_type!(
    /// `Int8`: one signed byte per value.
    Int8Type, i8, 0x07, "Int8"
);
lane_type!(
    /// `Int16`: two bytes, little-endian.
    Int16Type, i16, 0x08, "Int16"
);
lane_type!(
    /// `Int32`: four bytes, little-endian.
    Int32Type, i32, 0x09, "Int32"
);
lane_type!(
    /// `Int64`: eight bytes, little-endian.
    Int64Type, i64, 0x0A, "Int64"
);
lane_type!(
    /// `UInt8`: one byte per value.
    UInt8Type, u8, 0x01, "UInt8"
);
lane_type!(
    /// `UInt16`: two bytes, little-endian.
    UInt16Type, u16, 0x02, "UInt16"
);
lane_type!(
    /// `UInt32`: four bytes, little-endian.
    UInt32Type, u32, 0x03, "UInt32"
);
lane_type!(
    /// `UInt64`: eight bytes, little-endian.
    UInt64Type, u64, 0x04, "UInt64"
);
lane_type!(
    /// `Float32`: four bytes, IEEE 754 binary32, little-endian.
    Float32Type, f32, 0x43, "Float32"
);
lane_type!(
    /// `Float64`: eight bytes, IEEE 754 binary64, little-endian.
    Float64Type, f64, 0x44, "Float64"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::io::{ByteSequence, ByteWriter};
    use crate::simd::{SimdCaps, SimdTier};
    use crate::types::ColumnType;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn round_trip_i32(values: &[i32], caps: SimdCaps) -> Vec<i32> {
        let ty = Int32Type::with_caps(caps);
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, values).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let mut out = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, values.len()).expect("read");
        assert_eq!(n, values.len());
        assert!(seq.is_empty());
        out
    }

    #[test]
    fn test_int32_boundary_values_round_trip() {
        let values = [i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX - 1, i32::MAX];
        for tier in [SimdTier::Scalar, SimdTier::Sse2, SimdTier::Avx2, SimdTier::Avx512Bw] {
            let caps = SimdCaps::native().capped(tier);
            assert_eq!(round_trip_i32(&values, caps), values);
        }
    }

    #[test]
    fn test_int32_wire_bytes_are_little_endian() {
        let ty = Int32Type::new();
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &0x0403_0201).expect("write");
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_uint64_boundary_values_round_trip() {
        let ty = UInt64Type::new();
        let values = [0u64, 1, u64::MAX - 1, u64::MAX];
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &values).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let mut out = Vec::new();
        ty.read_values(&mut seq, &mut out, 4).expect("read");
        assert_eq!(out, values);
    }

    #[test]
    fn test_float_special_values_bitwise_round_trip() {
        let ty = Float64Type::new();
        let nan_with_payload = f64::from_bits(0x7ff8_0000_dead_beef);
        let values = [
            f64::NEG_INFINITY,
            f64::INFINITY,
            nan_with_payload,
            0.0,
            -0.0,
            f64::MIN_POSITIVE,
            f64::MAX,
        ];
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &values).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let mut out = Vec::new();
        ty.read_values(&mut seq, &mut out, values.len()).expect("read");
        for (a, b) in values.iter().zip(&out) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_bulk_read_stops_at_whole_elements() {
        // 10 bytes = two whole u32 plus a ragged tail the reader must leave.
        let ty = UInt32Type::new();
        let mut seq = ByteSequence::from(vec![1, 0, 0, 0, 2, 0, 0, 0, 3, 0]);
        let mut out = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, 100).expect("read");
        assert_eq!(n, 2);
        assert_eq!(out, vec![1, 2]);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_bulk_read_respects_limit() {
        let ty = UInt8Type::new();
        let mut seq = ByteSequence::from(vec![9u8; 50]);
        let mut out = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, 3).expect("read");
        assert_eq!(n, 3);
        assert_eq!(seq.len(), 47);
    }

    #[test]
    fn test_split_input_matches_contiguous() {
        let ty = Int16Type::new();
        let values: Vec<i16> = (-300..300).collect();
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &values).expect("write");
        let encoded = w.finish();

        for at in [1, 3, 599, 1199] {
            let seq = ByteSequence::from_segments([
                encoded.slice(..at),
                encoded.slice(at..),
            ]);
            let mut seq = seq;
            let mut out = Vec::new();
            ty.read_values(&mut seq, &mut out, values.len()).expect("read");
            assert_eq!(out, values, "split at {at}");
        }
    }

    #[test]
    fn test_read_value_underrun_consumes_nothing() {
        let ty = Int64Type::new();
        let mut seq = ByteSequence::from(Bytes::from_static(&[1, 2, 3]));
        assert!(matches!(
            ty.read_value(&mut seq),
            Err(CodecError::Underrun { needed: 8, available: 3 })
        ));
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_write_values_matches_write_value_loop() {
        let values: Vec<u32> = (0u32..1000).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        let ty = UInt32Type::new();

        let mut bulk = ByteWriter::new();
        ty.write_values(&mut bulk, &values).expect("bulk");

        let mut single = ByteWriter::new();
        for v in &values {
            ty.write_value(&mut single, v).expect("single");
        }
        assert_eq!(bulk.finish(), single.finish());
    }
}
