//! Print the host's SIMD tier probe and show that every tier produces the
//! same bytes for a UUID batch.

use chwire_core::types::{ColumnType, UuidType};
use chwire_core::{ByteWriter, SimdCaps, SimdTier};

fn main() {
    let native = SimdCaps::native();
    println!("native probe: {native:?}");
    println!("widest tier:  {:?}", native.max_tier());

    let ids: Vec<uuid::Uuid> = (0u128..1000).map(uuid::Uuid::from_u128).collect();
    let mut reference: Option<bytes::Bytes> = None;
    for tier in [
        SimdTier::Scalar,
        SimdTier::Ssse3,
        SimdTier::Avx2,
        SimdTier::Avx512Bw,
    ] {
        let ty = UuidType::with_caps(native.capped(tier));
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &ids).expect("encode");
        let encoded = w.finish();
        let agrees = match &reference {
            Some(bytes) => *bytes == encoded,
            None => {
                reference = Some(encoded.clone());
                true
            }
        };
        println!("{tier:?}: {} bytes, agrees with scalar: {agrees}", encoded.len());
    }
}
