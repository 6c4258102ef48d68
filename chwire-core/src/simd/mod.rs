//! SIMD capability probing and the tiered bulk kernels built on it.

mod caps;
mod kernels;

pub use caps::{SimdCaps, SimdTier};
pub use kernels::{
    ascii_str, copy_lanes, decode_lanes, decode_lanes_into, encode_lanes, is_ascii_lanes,
    shuffle_16_scalar, shuffle_lanes_16, WireLane,
};
