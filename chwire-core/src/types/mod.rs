//! The per-type handler family.
//!
//! One handler struct per wire type. Every handler is a small immutable
//! value carrying its [`SimdCaps`] (and parameters, for the parametric
//! types); all stream state lives in the sequence and writer passed by
//! reference, so handlers can be shared and cloned freely.
//!
//! Fixed-width handlers share one bulk skeleton: bound the element count by
//! what the destination wants and what the input holds, take the contiguous
//! SIMD fast path when the whole payload sits in the first segment, and
//! otherwise fall back to element-by-element reads through a small stack
//! buffer. Bulk writes always have a contiguous destination (the writer
//! vends one span) and go straight through the tiered kernels.

use std::borrow::Cow;

use crate::error::Result;
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::{decode_lanes, decode_lanes_into, encode_lanes, SimdCaps, WireLane};

mod boolean;
mod decimal;
mod handler;
mod ip;
mod numeric;
mod string;
mod temporal;
mod uuid;

pub use boolean::BoolType;
pub use decimal::{Decimal128Type, Decimal32Type, Decimal64Type};
pub use handler::Handler;
pub use ip::{Ipv4Type, Ipv6Type};
pub use numeric::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
pub use string::{FixedStringType, StringType};
pub use temporal::{Date32Type, DateTime64Type, DateTimeType, DateType};
pub use self::uuid::UuidType;

/// Contract shared by every wire type handler.
///
/// `read_values` appends up to `limit` decoded elements to `dst` and returns
/// how many it appended; it never partially decodes a trailing element. A
/// bulk call that fails mid-way leaves the elements decoded before the
/// failure in `dst` and the stream positioned after them. `write_values`
/// is observationally equivalent to a loop over `write_value`.
pub trait ColumnType {
    /// Host value produced and consumed by this handler.
    type Value: Clone;

    /// One-byte wire identity.
    fn protocol_code(&self) -> u8;

    /// Printable server-side type name, tuple-form for parametric types.
    fn type_name(&self) -> Cow<'static, str>;

    /// Wire bytes per value for fixed-length types, `None` for variable.
    fn fixed_byte_length(&self) -> Option<usize>;

    /// The capability set this handler selects tiers from.
    fn simd_caps(&self) -> SimdCaps;

    /// Decode one value.
    fn read_value(&self, seq: &mut ByteSequence) -> Result<Self::Value>;

    /// Decode up to `limit` values, appending to `dst`; returns the count
    /// appended.
    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<Self::Value>,
        limit: usize,
    ) -> Result<usize>;

    /// Encode one value.
    fn write_value(&self, w: &mut ByteWriter, value: &Self::Value) -> Result<()>;

    /// Encode all of `values`.
    fn write_values(&self, w: &mut ByteWriter, values: &[Self::Value]) -> Result<()>;
}

/// Widest per-element scratch any fixed type needs (UUID, IPv6, Decimal128).
pub(crate) const MAX_LANE_SIZE: usize = 16;

/// Fill `buf` from the stream, consuming exactly `buf.len()` bytes. Fails
/// without consuming when the stream is short.
pub(crate) fn read_fixed(seq: &mut ByteSequence, buf: &mut [u8]) -> Result<()> {
    seq.copy_to(buf)?;
    seq.advance(buf.len())
}

/// Bulk decode for primitive lane elements: SIMD over the contiguous prefix,
/// scalar element-by-element across segment boundaries.
pub(crate) fn read_lane_values<T: WireLane>(
    caps: &SimdCaps,
    seq: &mut ByteSequence,
    dst: &mut Vec<T>,
    limit: usize,
) -> Result<usize> {
    let count = limit.min(seq.len() / T::SIZE);
    if count == 0 {
        return Ok(0);
    }
    let total = count * T::SIZE;
    if seq.first_span().len() >= total {
        decode_lanes(caps, &seq.first_span()[..total], dst, count);
        seq.advance(total)?;
    } else {
        let mut raw = [0u8; MAX_LANE_SIZE];
        for _ in 0..count {
            let buf = &mut raw[..T::SIZE];
            seq.copy_to(buf)?;
            seq.advance(T::SIZE)?;
            dst.push(T::from_le_slice(buf));
        }
    }
    Ok(count)
}

/// Bulk decode into a preallocated slice; the caller has already bounded
/// `dst.len()` by the stream length.
pub(crate) fn read_lanes_into<T: WireLane>(
    caps: &SimdCaps,
    seq: &mut ByteSequence,
    dst: &mut [T],
) -> Result<()> {
    let total = dst.len() * T::SIZE;
    if seq.first_span().len() >= total {
        decode_lanes_into(caps, &seq.first_span()[..total], dst);
        seq.advance(total)?;
    } else {
        let mut raw = [0u8; MAX_LANE_SIZE];
        for slot in dst.iter_mut() {
            let buf = &mut raw[..T::SIZE];
            seq.copy_to(buf)?;
            seq.advance(T::SIZE)?;
            *slot = T::from_le_slice(buf);
        }
    }
    Ok(())
}

/// Bulk encode for primitive lane elements into one writer span.
pub(crate) fn write_lane_values<T: WireLane>(
    caps: &SimdCaps,
    w: &mut ByteWriter,
    values: &[T],
) {
    let total = values.len() * T::SIZE;
    let span = w.span(total);
    encode_lanes(caps, values, &mut span[..total]);
    w.advance(total);
}

/// Define a handler for a primitive lane element type.
macro_rules! lane_type {
    ($(#[$meta:meta])* $name:ident, $value:ty, $code:literal, $tname:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            caps: $crate::simd::SimdCaps,
        }

        impl $name {
            /// Handler with the natively probed capability set.
            pub fn new() -> Self {
                Self {
                    caps: $crate::simd::SimdCaps::native(),
                }
            }

            /// Handler with an explicit capability set, for tier comparison
            /// tests and benchmarks.
            pub fn with_caps(caps: $crate::simd::SimdCaps) -> Self {
                Self { caps }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::types::ColumnType for $name {
            type Value = $value;

            fn protocol_code(&self) -> u8 {
                $code
            }

            fn type_name(&self) -> std::borrow::Cow<'static, str> {
                std::borrow::Cow::Borrowed($tname)
            }

            fn fixed_byte_length(&self) -> Option<usize> {
                Some(<$value as $crate::simd::WireLane>::SIZE)
            }

            fn simd_caps(&self) -> $crate::simd::SimdCaps {
                self.caps
            }

            fn read_value(
                &self,
                seq: &mut $crate::io::ByteSequence,
            ) -> $crate::error::Result<$value> {
                let mut raw = [0u8; <$value as $crate::simd::WireLane>::SIZE];
                $crate::types::read_fixed(seq, &mut raw)?;
                Ok(<$value as $crate::simd::WireLane>::from_le_slice(&raw))
            }

            fn read_values(
                &self,
                seq: &mut $crate::io::ByteSequence,
                dst: &mut Vec<$value>,
                limit: usize,
            ) -> $crate::error::Result<usize> {
                $crate::types::read_lane_values::<$value>(&self.caps, seq, dst, limit)
            }

            fn write_value(
                &self,
                w: &mut $crate::io::ByteWriter,
                value: &$value,
            ) -> $crate::error::Result<()> {
                const SIZE: usize = <$value as $crate::simd::WireLane>::SIZE;
                let span = w.span(SIZE);
                $crate::simd::WireLane::write_le_slice(*value, &mut span[..SIZE]);
                w.advance(SIZE);
                Ok(())
            }

            fn write_values(
                &self,
                w: &mut $crate::io::ByteWriter,
                values: &[$value],
            ) -> $crate::error::Result<()> {
                $crate::types::write_lane_values(&self.caps, w, values);
                Ok(())
            }
        }
    };
}

pub(crate) use lane_type;
