//! Decimal handlers.
//!
//! Three wire widths carrying signed little-endian unscaled integers:
//! `Decimal32(p,s)` in 4 bytes (p <= 9), `Decimal64(p,s)` in 8 bytes
//! (p <= 18), `Decimal128(p,s)` in 16 bytes (p <= 38). The wire value is
//! `host_value * 10^s`.
//!
//! Host values are [`Decimal`], which carries a 96-bit mantissa (28 decimal
//! digits). A `Decimal128` column declared with scale above 28 is decoded by
//! step-wise division down to scale 28, dropping the extra digits; encoding
//! re-multiplies with checked arithmetic and surfaces `Overflow` on
//! saturation. Values whose unscaled form exceeds the declared precision
//! are rejected with `Overflow` on write.

use std::borrow::Cow;

use rust_decimal::Decimal;

use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::SimdCaps;

use super::{read_fixed, read_lanes_into, write_lane_values, ColumnType};

/// Maximum scale the host decimal type can hold exactly.
const NATIVE_MAX_SCALE: u32 = 28;

/// Conversion chunk size for bulk paths.
const CHUNK: usize = 256;

fn pow10(exp: u32) -> i128 {
    // Precision caps keep exp <= 38, which fits i128.
    10i128.pow(exp)
}

/// Wire unscaled integer for `value` at the declared scale and precision.
fn unscaled_for(value: &Decimal, scale: u32, precision: u32, type_name: &str) -> Result<i128> {
    let normalized = value.normalize();
    if normalized.scale() > scale {
        return Err(CodecError::overflow(
            type_name,
            format!("{value} is not representable at scale {scale}"),
        ));
    }
    let mut unscaled = normalized.mantissa();
    for _ in normalized.scale()..scale {
        unscaled = unscaled.checked_mul(10).ok_or_else(|| {
            CodecError::overflow(type_name, format!("{value} saturates the unscaled range"))
        })?;
    }
    let bound = pow10(precision);
    if unscaled <= -bound || unscaled >= bound {
        return Err(CodecError::overflow(
            type_name,
            format!("{value} exceeds precision {precision}"),
        ));
    }
    Ok(unscaled)
}

/// Host decimal for a wire unscaled integer at the declared scale.
fn decimal_from_unscaled(unscaled: i128, scale: u32, type_name: &str) -> Result<Decimal> {
    let (unscaled, scale) = if scale <= NATIVE_MAX_SCALE {
        (unscaled, scale)
    } else {
        // Step-wise division beyond the native 28-digit precision; extra
        // fractional digits are dropped.
        let mut q = unscaled;
        for _ in NATIVE_MAX_SCALE..scale {
            q /= 10;
        }
        (q, NATIVE_MAX_SCALE)
    };
    Decimal::try_from_i128_with_scale(unscaled, scale).map_err(|_| {
        CodecError::overflow(
            type_name,
            format!("unscaled {unscaled} exceeds the host decimal range"),
        )
    })
}

macro_rules! decimal_type {
    ($(#[$meta:meta])* $name:ident, $raw:ty, $max_precision:literal, $code:literal, $tname:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            precision: u32,
            scale: u32,
            caps: SimdCaps,
        }

        impl $name {
            /// Largest precision this width can carry.
            pub const MAX_PRECISION: u32 = $max_precision;

            /// Handler with the declared precision and scale.
            pub fn new(precision: u32, scale: u32) -> Result<Self> {
                Self::with_caps(precision, scale, SimdCaps::native())
            }

            /// Handler with an explicit capability set.
            pub fn with_caps(precision: u32, scale: u32, caps: SimdCaps) -> Result<Self> {
                if precision == 0 || precision > Self::MAX_PRECISION {
                    return Err(CodecError::parameter(
                        $tname,
                        "precision",
                        format!("{precision} is outside 1..={}", Self::MAX_PRECISION),
                    ));
                }
                if scale > precision {
                    return Err(CodecError::parameter(
                        $tname,
                        "scale",
                        format!("{scale} exceeds precision {precision}"),
                    ));
                }
                Ok(Self { precision, scale, caps })
            }

            /// Declared precision.
            pub fn precision(&self) -> u32 {
                self.precision
            }

            /// Declared scale.
            pub fn scale(&self) -> u32 {
                self.scale
            }

            fn raw_for(&self, value: &Decimal) -> Result<$raw> {
                let name = self.type_name();
                let unscaled = unscaled_for(value, self.scale, self.precision, &name)?;
                <$raw>::try_from(unscaled).map_err(|_| {
                    CodecError::overflow(name, format!("{value} exceeds the wire width"))
                })
            }
        }

        impl ColumnType for $name {
            type Value = Decimal;

            fn protocol_code(&self) -> u8 {
                $code
            }

            fn type_name(&self) -> Cow<'static, str> {
                Cow::Owned(format!("{}({},{})", $tname, self.precision, self.scale))
            }

            fn fixed_byte_length(&self) -> Option<usize> {
                Some(std::mem::size_of::<$raw>())
            }

            fn simd_caps(&self) -> SimdCaps {
                self.caps
            }

            fn read_value(&self, seq: &mut ByteSequence) -> Result<Decimal> {
                let mut raw = [0u8; std::mem::size_of::<$raw>()];
                read_fixed(seq, &mut raw)?;
                decimal_from_unscaled(
                    i128::from(<$raw>::from_le_bytes(raw)),
                    self.scale,
                    &self.type_name(),
                )
            }

            fn read_values(
                &self,
                seq: &mut ByteSequence,
                dst: &mut Vec<Decimal>,
                limit: usize,
            ) -> Result<usize> {
                let count = limit.min(seq.len() / std::mem::size_of::<$raw>());
                let mut raw = [0 as $raw; CHUNK];
                let mut remaining = count;
                while remaining > 0 {
                    let take = remaining.min(CHUNK);
                    read_lanes_into(&self.caps, seq, &mut raw[..take])?;
                    let name = self.type_name();
                    for &unscaled in &raw[..take] {
                        dst.push(decimal_from_unscaled(
                            i128::from(unscaled),
                            self.scale,
                            &name,
                        )?);
                    }
                    remaining -= take;
                }
                Ok(count)
            }

            fn write_value(&self, w: &mut ByteWriter, value: &Decimal) -> Result<()> {
                w.put_slice(&self.raw_for(value)?.to_le_bytes());
                Ok(())
            }

            fn write_values(&self, w: &mut ByteWriter, values: &[Decimal]) -> Result<()> {
                let mut raw = [0 as $raw; CHUNK];
                for chunk in values.chunks(CHUNK) {
                    for (slot, value) in raw.iter_mut().zip(chunk) {
                        *slot = self.raw_for(value)?;
                    }
                    write_lane_values(&self.caps, w, &raw[..chunk.len()]);
                }
                Ok(())
            }
        }
    };
}

decimal_type!(
    /// `Decimal32(p,s)`: 4-byte signed unscaled integer, precision <= 9.
    Decimal32Type, i32, 9, 0x42, "Decimal32"
);
decimal_type!(
    /// `Decimal64(p,s)`: 8-byte signed unscaled integer, precision <= 18.
    Decimal64Type, i64, 18, 0x17, "Decimal64"
);
decimal_type!(
    /// `Decimal128(p,s)`: 16-byte signed unscaled integer, precision <= 38.
    Decimal128Type, i128, 38, 0x18, "Decimal128"
);
