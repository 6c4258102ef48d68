//! Tiered bulk kernels.
//!
//! Three kernels cover every fixed-width handler: a lane copy (the wire is
//! little-endian, so on little-endian hosts a bulk transcode is a copy), a
//! per-16-byte shuffle (UUID byte-order permutation), and an ASCII high-bit
//! probe (string fast paths). Each walks the tier ladder from the widest
//! available width down, handing the tail to the next narrower tier and
//! finally to scalar code, so every tier produces byte-identical output.
//!
//! All `unsafe` in the crate lives here. Vector paths exist only on x86_64;
//! other architectures and big-endian hosts use the scalar forms, which go
//! through explicit little-endian conversions and are correct everywhere.

use super::caps::SimdCaps;

/// Fixed-width wire element: `SIZE` little-endian bytes per value.
pub trait WireLane: Copy + Default {
    /// Wire bytes per element.
    const SIZE: usize;
    /// Decode one element from little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
    /// Encode one element as little-endian bytes.
    fn write_le_slice(self, bytes: &mut [u8]);
}

macro_rules! wire_lane {
    ($($ty:ty),* $(,)?) => {$(
        impl WireLane for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le_slice(self, bytes: &mut [u8]) {
                bytes[..std::mem::size_of::<$ty>()].copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

wire_lane!(i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, f32, f64);

/// Copy `src` into `dst` (equal lengths) using the widest tier the probe
/// and remaining length allow, then the next narrower tier for the tail.
pub fn copy_lanes(caps: &SimdCaps, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let mut off = 0;
    #[cfg(target_arch = "x86_64")]
    {
        if caps.avx512f && src.len() - off >= 64 {
            // SAFETY: AVX-512F support verified at runtime by the probe.
            off += unsafe { x86::copy_512(&src[off..], &mut dst[off..]) };
        }
        if caps.avx && src.len() - off >= 32 {
            // SAFETY: AVX support verified at runtime by the probe.
            off += unsafe { x86::copy_256(&src[off..], &mut dst[off..]) };
        }
        if caps.sse2 && src.len() - off >= 16 {
            // SAFETY: SSE2 support verified at runtime by the probe.
            off += unsafe { x86::copy_128(&src[off..], &mut dst[off..]) };
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = caps;
    dst[off..].copy_from_slice(&src[off..]);
}

/// Decode `count` elements from little-endian `src` bytes, appending to
/// `dst`.
pub fn decode_lanes<T: WireLane>(caps: &SimdCaps, src: &[u8], dst: &mut Vec<T>, count: usize) {
    debug_assert_eq!(src.len(), count * T::SIZE);
    let start = dst.len();
    dst.reserve(count);
    #[cfg(target_endian = "little")]
    {
        // SAFETY: `reserve` guarantees capacity for `count` more elements;
        // T is a primitive lane type with no padding, so the spare region is
        // exactly `src.len()` writable bytes, all of which `copy_lanes`
        // fills before `set_len` exposes them.
        unsafe {
            let spare =
                std::slice::from_raw_parts_mut(dst.as_mut_ptr().add(start).cast::<u8>(), src.len());
            copy_lanes(caps, src, spare);
            dst.set_len(start + count);
        }
    }
    #[cfg(target_endian = "big")]
    {
        let _ = (caps, start);
        for chunk in src.chunks_exact(T::SIZE) {
            dst.push(T::from_le_slice(chunk));
        }
    }
}

/// Decode exactly `dst.len()` elements from little-endian `src` bytes into
/// a preallocated slice (used by the fixed-size tick buffers).
pub fn decode_lanes_into<T: WireLane>(caps: &SimdCaps, src: &[u8], dst: &mut [T]) {
    debug_assert_eq!(src.len(), dst.len() * T::SIZE);
    #[cfg(target_endian = "little")]
    {
        // SAFETY: T is a primitive lane type with no padding; `dst` spans
        // exactly `src.len()` initialized, writable bytes.
        let raw = unsafe {
            std::slice::from_raw_parts_mut(dst.as_mut_ptr().cast::<u8>(), src.len())
        };
        copy_lanes(caps, src, raw);
    }
    #[cfg(target_endian = "big")]
    {
        let _ = caps;
        for (slot, chunk) in dst.iter_mut().zip(src.chunks_exact(T::SIZE)) {
            *slot = T::from_le_slice(chunk);
        }
    }
}

/// Encode `values` as little-endian bytes into `dst`.
pub fn encode_lanes<T: WireLane>(caps: &SimdCaps, values: &[T], dst: &mut [u8]) {
    debug_assert_eq!(dst.len(), values.len() * T::SIZE);
    #[cfg(target_endian = "little")]
    {
        // SAFETY: T is a primitive lane type with no padding; `values`
        // spans exactly `dst.len()` initialized bytes.
        let raw =
            unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), dst.len()) };
        copy_lanes(caps, raw, dst);
    }
    #[cfg(target_endian = "big")]
    {
        let _ = caps;
        for (chunk, value) in dst.chunks_exact_mut(T::SIZE).zip(values) {
            value.write_le_slice(chunk);
        }
    }
}

/// Permute each 16-byte element of `src` into `dst` through `mask`
/// (`dst[lane][i] = src[lane][mask[i]]`). Lengths are equal multiples of 16.
pub fn shuffle_lanes_16(caps: &SimdCaps, src: &[u8], dst: &mut [u8], mask: &[u8; 16]) {
    debug_assert_eq!(src.len(), dst.len());
    debug_assert_eq!(src.len() % 16, 0);
    let mut off = 0;
    #[cfg(target_arch = "x86_64")]
    {
        if caps.avx512bw && src.len() - off >= 64 {
            // SAFETY: AVX-512BW support verified at runtime by the probe.
            off += unsafe { x86::shuffle_512(&src[off..], &mut dst[off..], mask) };
        }
        if caps.avx2 && src.len() - off >= 32 {
            // SAFETY: AVX2 support verified at runtime by the probe.
            off += unsafe { x86::shuffle_256(&src[off..], &mut dst[off..], mask) };
        }
        if caps.ssse3 && src.len() - off >= 16 {
            // SAFETY: SSSE3 support verified at runtime by the probe.
            off += unsafe { x86::shuffle_128(&src[off..], &mut dst[off..], mask) };
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = caps;
    for (s, d) in src[off..].chunks_exact(16).zip(dst[off..].chunks_exact_mut(16)) {
        shuffle_16_scalar(s, d, mask);
    }
}

/// Scalar form of the 16-byte permute; ground truth for the vector masks.
#[inline]
pub fn shuffle_16_scalar(src: &[u8], dst: &mut [u8], mask: &[u8; 16]) {
    for i in 0..16 {
        dst[i] = src[mask[i] as usize];
    }
}

/// True when no byte in `bytes` has its high bit set.
pub fn is_ascii_lanes(caps: &SimdCaps, bytes: &[u8]) -> bool {
    let mut off = 0;
    #[cfg(target_arch = "x86_64")]
    {
        if caps.avx2 && bytes.len() >= 32 {
            // SAFETY: AVX2 support verified at runtime by the probe.
            let (clean, done) = unsafe { x86::ascii_256(bytes) };
            if !clean {
                return false;
            }
            off += done;
        }
        if caps.sse2 && bytes.len() - off >= 16 {
            // SAFETY: SSE2 support verified at runtime by the probe.
            let (clean, done) = unsafe { x86::ascii_128(&bytes[off..]) };
            if !clean {
                return false;
            }
            off += done;
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = caps;
    bytes[off..].iter().all(|b| b & 0x80 == 0)
}

/// ASCII fast path for text decoding: `Some` when `bytes` is pure ASCII and
/// can be exposed as `str` without a UTF-8 scan.
pub fn ascii_str<'a>(caps: &SimdCaps, bytes: &'a [u8]) -> Option<&'a str> {
    if is_ascii_lanes(caps, bytes) {
        // SAFETY: every byte is below 0x80, which is valid UTF-8.
        Some(unsafe { std::str::from_utf8_unchecked(bytes) })
    } else {
        None
    }
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::{
        __m128i, __m256i, __m512i, _mm256_loadu_si256, _mm256_movemask_epi8,
        _mm256_shuffle_epi8, _mm256_storeu_si256, _mm512_shuffle_epi8, _mm_loadu_si128,
        _mm_movemask_epi8, _mm_shuffle_epi8, _mm_storeu_si128,
    };

    /// Copy whole 64-byte lanes; returns bytes processed.
    #[target_feature(enable = "avx512f")]
    pub unsafe fn copy_512(src: &[u8], dst: &mut [u8]) -> usize {
        let lanes = src.len() / 64;
        for i in 0..lanes {
            // SAFETY: `i * 64 + 64 <= len` for both slices by the lanes
            // bound; unaligned reads and writes are explicit.
            unsafe {
                let v = src.as_ptr().add(i * 64).cast::<__m512i>().read_unaligned();
                dst.as_mut_ptr().add(i * 64).cast::<__m512i>().write_unaligned(v);
            }
        }
        lanes * 64
    }

    /// Copy whole 32-byte lanes; returns bytes processed.
    #[target_feature(enable = "avx")]
    pub unsafe fn copy_256(src: &[u8], dst: &mut [u8]) -> usize {
        let lanes = src.len() / 32;
        for i in 0..lanes {
            // SAFETY: `i * 32 + 32 <= len` for both slices by the lanes
            // bound; loadu/storeu tolerate unaligned pointers.
            unsafe {
                let v = _mm256_loadu_si256(src.as_ptr().add(i * 32).cast::<__m256i>());
                _mm256_storeu_si256(dst.as_mut_ptr().add(i * 32).cast::<__m256i>(), v);
            }
        }
        lanes * 32
    }

    /// Copy whole 16-byte lanes; returns bytes processed.
    #[target_feature(enable = "sse2")]
    pub unsafe fn copy_128(src: &[u8], dst: &mut [u8]) -> usize {
        let lanes = src.len() / 16;
        for i in 0..lanes {
            // SAFETY: `i * 16 + 16 <= len` for both slices by the lanes
            // bound; loadu/storeu tolerate unaligned pointers.
            unsafe {
                let v = _mm_loadu_si128(src.as_ptr().add(i * 16).cast::<__m128i>());
                _mm_storeu_si128(dst.as_mut_ptr().add(i * 16).cast::<__m128i>(), v);
            }
        }
        lanes * 16
    }

    /// Shuffle four 16-byte elements per 512-bit op; returns bytes processed.
    #[target_feature(enable = "avx512bw")]
    pub unsafe fn shuffle_512(src: &[u8], dst: &mut [u8], mask: &[u8; 16]) -> usize {
        let mut wide = [0u8; 64];
        for lane in 0..4 {
            wide[lane * 16..lane * 16 + 16].copy_from_slice(mask);
        }
        let lanes = src.len() / 64;
        for i in 0..lanes {
            // SAFETY: `i * 64 + 64 <= len` for both slices by the lanes
            // bound; `wide` is exactly 64 bytes; vpshufb permutes within
            // each 128-bit lane, matching the per-element scalar shuffle.
            unsafe {
                let m = wide.as_ptr().cast::<__m512i>().read_unaligned();
                let v = src.as_ptr().add(i * 64).cast::<__m512i>().read_unaligned();
                let out = _mm512_shuffle_epi8(v, m);
                dst.as_mut_ptr().add(i * 64).cast::<__m512i>().write_unaligned(out);
            }
        }
        lanes * 64
    }

    /// Shuffle two 16-byte elements per 256-bit op; returns bytes processed.
    #[target_feature(enable = "avx2")]
    pub unsafe fn shuffle_256(src: &[u8], dst: &mut [u8], mask: &[u8; 16]) -> usize {
        let mut wide = [0u8; 32];
        wide[..16].copy_from_slice(mask);
        wide[16..].copy_from_slice(mask);
        let lanes = src.len() / 32;
        for i in 0..lanes {
            // SAFETY: `i * 32 + 32 <= len` for both slices by the lanes
            // bound; `wide` is exactly 32 bytes; vpshufb permutes within
            // each 128-bit lane, matching the per-element scalar shuffle.
            unsafe {
                let m = _mm256_loadu_si256(wide.as_ptr().cast::<__m256i>());
                let v = _mm256_loadu_si256(src.as_ptr().add(i * 32).cast::<__m256i>());
                let out = _mm256_shuffle_epi8(v, m);
                _mm256_storeu_si256(dst.as_mut_ptr().add(i * 32).cast::<__m256i>(), out);
            }
        }
        lanes * 32
    }

    /// Shuffle one 16-byte element per 128-bit op; returns bytes processed.
    #[target_feature(enable = "ssse3")]
    pub unsafe fn shuffle_128(src: &[u8], dst: &mut [u8], mask: &[u8; 16]) -> usize {
        let lanes = src.len() / 16;
        for i in 0..lanes {
            // SAFETY: `i * 16 + 16 <= len` for both slices by the lanes
            // bound; `mask` is exactly 16 bytes.
            unsafe {
                let m = _mm_loadu_si128(mask.as_ptr().cast::<__m128i>());
                let v = _mm_loadu_si128(src.as_ptr().add(i * 16).cast::<__m128i>());
                let out = _mm_shuffle_epi8(v, m);
                _mm_storeu_si128(dst.as_mut_ptr().add(i * 16).cast::<__m128i>(), out);
            }
        }
        lanes * 16
    }

    /// High-bit test over whole 32-byte lanes; returns (all-ASCII, bytes
    /// processed). Stops at the first dirty lane.
    #[target_feature(enable = "avx2")]
    pub unsafe fn ascii_256(bytes: &[u8]) -> (bool, usize) {
        let lanes = bytes.len() / 32;
        for i in 0..lanes {
            // SAFETY: `i * 32 + 32 <= len` by the lanes bound.
            let dirty = unsafe {
                let v = _mm256_loadu_si256(bytes.as_ptr().add(i * 32).cast::<__m256i>());
                _mm256_movemask_epi8(v) != 0
            };
            if dirty {
                return (false, i * 32);
            }
        }
        (true, lanes * 32)
    }

    /// High-bit test over whole 16-byte lanes; returns (all-ASCII, bytes
    /// processed). Stops at the first dirty lane.
    #[target_feature(enable = "sse2")]
    pub unsafe fn ascii_128(bytes: &[u8]) -> (bool, usize) {
        let lanes = bytes.len() / 16;
        for i in 0..lanes {
            // SAFETY: `i * 16 + 16 <= len` by the lanes bound.
            let dirty = unsafe {
                let v = _mm_loadu_si128(bytes.as_ptr().add(i * 16).cast::<__m128i>());
                _mm_movemask_epi8(v) != 0
            };
            if dirty {
                return (false, i * 16);
            }
        }
        (true, lanes * 16)
    }
}
