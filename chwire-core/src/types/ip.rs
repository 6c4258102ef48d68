//! IPv4 and IPv6 handlers.
//!
//! Both carry [`IpAddr`] so a column can be built from either family and the
//! mismatch is reported as `WrongAddressFamily` instead of being a type
//! error at a distance. On the wire IPv4 is 4 bytes and IPv6 is 16 bytes,
//! both in network order, stored as-is.

use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::SimdCaps;

use super::{read_fixed, ColumnType};

/// `IPv4`: 4 bytes, network order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ipv4Type {
    caps: SimdCaps,
}

impl Ipv4Type {
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

    fn octets_for(value: &IpAddr) -> Result<[u8; 4]> {
        match value {
            IpAddr::V4(v4) => Ok(v4.octets()),
            IpAddr::V6(_) => Err(CodecError::WrongAddressFamily {
                type_name: "IPv4",
                got: "IPv6",
            }),
        }
    }
}

impl Default for Ipv4Type {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for Ipv4Type {
    type Value = IpAddr;

    fn protocol_code(&self) -> u8 {
        0x13
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("IPv4")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(4)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<IpAddr> {
        let mut raw = [0u8; 4];
        read_fixed(seq, &mut raw)?;
        Ok(IpAddr::V4(Ipv4Addr::from(raw)))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<IpAddr>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 4);
        if count == 0 {
            return Ok(0);
        }
        let total = count * 4;
        if seq.first_span().len() >= total {
            let span = seq.first_span();
            for chunk in span[..total].chunks_exact(4) {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(chunk);
                dst.push(IpAddr::V4(Ipv4Addr::from(raw)));
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

    fn write_value(&self, w: &mut ByteWriter, value: &IpAddr) -> Result<()> {
        w.put_slice(&Self::octets_for(value)?);
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[IpAddr]) -> Result<()> {
        let total = values.len() * 4;
        let span = w.span(total);
        for (i, value) in values.iter().enumerate() {
            let octets = match value {
                IpAddr::V4(v4) => v4.octets(),
                IpAddr::V6(_) => {
                    return Err(CodecError::WrongAddressFamily {
                        type_name: "IPv4",
                        got: "IPv6",
                    });
                }
            };
            span[i * 4..i * 4 + 4].copy_from_slice(&octets);
        }
        w.advance(total);
        Ok(())
    }
}

/// `IPv6`: 16 bytes, network order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ipv6Type {
    caps: SimdCaps,
}

impl Ipv6Type {
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

    fn octets_for(value: &IpAddr) -> Result<[u8; 16]> {
        match value {
            IpAddr::V6(v6) => Ok(v6.octets()),
            IpAddr::V4(_) => Err(CodecError::WrongAddressFamily {
                type_name: "IPv6",
                got: "IPv4",
            }),
        }
    }
}

impl Default for Ipv6Type {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for Ipv6Type {
    type Value = IpAddr;

    fn protocol_code(&self) -> u8 {
        0x14
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("IPv6")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(16)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<IpAddr> {
        let mut raw = [0u8; 16];
        read_fixed(seq, &mut raw)?;
        Ok(IpAddr::V6(Ipv6Addr::from(raw)))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<IpAddr>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 16);
        if count == 0 {
            return Ok(0);
        }
        let total = count * 16;
        if seq.first_span().len() >= total {
            let span = seq.first_span();
            for chunk in span[..total].chunks_exact(16) {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(chunk);
                dst.push(IpAddr::V6(Ipv6Addr::from(raw)));
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

    fn write_value(&self, w: &mut ByteWriter, value: &IpAddr) -> Result<()> {
        w.put_slice(&Self::octets_for(value)?);
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[IpAddr]) -> Result<()> {
        let total = values.len() * 16;
        let span = w.span(total);
        for (i, value) in values.iter().enumerate() {
            let octets = match value {
                IpAddr::V6(v6) => v6.octets(),
                IpAddr::V4(_) => {
                    return Err(CodecError::WrongAddressFamily {
                        type_name: "IPv6",
                        got: "IPv4",
                    });
                }
            };
            span[i * 16..i * 16 + 16].copy_from_slice(&octets);
        }
        w.advance(total);
        Ok(())
    }
}
