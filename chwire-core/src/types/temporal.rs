//! Date and timestamp handlers.
//!
//! Four wire shapes:
//! - `Date`: 2 bytes, unsigned days since 1970-01-01 (0..=65535).
//! - `Date32`: 4 bytes, signed days since 1900-01-01, covering
//!   1900-01-01..=2299-12-31.
//! - `DateTime`: 4 bytes, unsigned seconds since the Unix epoch. Sub-second
//!   components are truncated on write.
//! - `DateTime64(p)`, `p` in 0..=9: 8 bytes, signed ticks of 10^-p seconds
//!   since the Unix epoch.
//!
//! Bulk paths decode the raw lane integers through the tiered kernels into
//! a fixed 256-element buffer, then convert chunk by chunk; the buffer never
//! outlives the call.

use std::borrow::Cow;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::SimdCaps;

use super::{read_fixed, read_lanes_into, write_lane_values, ColumnType};

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
/// Days from 0001-01-01 (CE) to 1900-01-01.
const DATE32_BASE_DAYS_FROM_CE: i32 = 693_596;
/// Days from 1900-01-01 to 2299-12-31.
const DATE32_MAX_DAYS: i32 = 146_096;

/// Conversion chunk size for bulk paths.
const TICK_CHUNK: usize = 256;

const POW10: [i64; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

fn date_from_days(base: i32, days: i32, type_name: &str) -> Result<NaiveDate> {
    base.checked_add(days)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| {
            CodecError::overflow(type_name, format!("{days} days from the type epoch"))
        })
}

/// `Date`: two unsigned little-endian bytes of days since 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateType {
    caps: SimdCaps,
}

impl DateType {
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

    fn days_for(value: &NaiveDate) -> Result<u16> {
        let days = value.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE;
        u16::try_from(days).map_err(|_| {
            CodecError::overflow("Date", format!("{value} is outside 1970-01-01..=2149-06-06"))
        })
    }
}

impl Default for DateType {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for DateType {
    type Value = NaiveDate;

    fn protocol_code(&self) -> u8 {
        0x10
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Date")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(2)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<NaiveDate> {
        let mut raw = [0u8; 2];
        read_fixed(seq, &mut raw)?;
        date_from_days(
            UNIX_EPOCH_DAYS_FROM_CE,
            i32::from(u16::from_le_bytes(raw)),
            "Date",
        )
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<NaiveDate>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 2);
        let mut raw = [0u16; TICK_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(TICK_CHUNK);
            read_lanes_into(&self.caps, seq, &mut raw[..take])?;
            for &days in &raw[..take] {
                dst.push(date_from_days(
                    UNIX_EPOCH_DAYS_FROM_CE,
                    i32::from(days),
                    "Date",
                )?);
            }
            remaining -= take;
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &NaiveDate) -> Result<()> {
        w.put_slice(&Self::days_for(value)?.to_le_bytes());
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[NaiveDate]) -> Result<()> {
        let mut raw = [0u16; TICK_CHUNK];
        for chunk in values.chunks(TICK_CHUNK) {
            for (slot, value) in raw.iter_mut().zip(chunk) {
                *slot = Self::days_for(value)?;
            }
            write_lane_values(&self.caps, w, &raw[..chunk.len()]);
        }
        Ok(())
    }
}

/// `Date32`: four signed little-endian bytes of days since 1900-01-01.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Date32Type {
    caps: SimdCaps,
}

impl Date32Type {
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

    fn days_for(value: &NaiveDate) -> Result<i32> {
        let days = value.num_days_from_ce() - DATE32_BASE_DAYS_FROM_CE;
        if !(0..=DATE32_MAX_DAYS).contains(&days) {
            return Err(CodecError::overflow(
                "Date32",
                format!("{value} is outside 1900-01-01..=2299-12-31"),
            ));
        }
        Ok(days)
    }
}

impl Default for Date32Type {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for Date32Type {
    type Value = NaiveDate;

    fn protocol_code(&self) -> u8 {
        0x1E
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Date32")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(4)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<NaiveDate> {
        let mut raw = [0u8; 4];
        read_fixed(seq, &mut raw)?;
        date_from_days(DATE32_BASE_DAYS_FROM_CE, i32::from_le_bytes(raw), "Date32")
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<NaiveDate>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 4);
        let mut raw = [0i32; TICK_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(TICK_CHUNK);
            read_lanes_into(&self.caps, seq, &mut raw[..take])?;
            for &days in &raw[..take] {
                dst.push(date_from_days(DATE32_BASE_DAYS_FROM_CE, days, "Date32")?);
            }
            remaining -= take;
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &NaiveDate) -> Result<()> {
        w.put_slice(&Self::days_for(value)?.to_le_bytes());
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[NaiveDate]) -> Result<()> {
        let mut raw = [0i32; TICK_CHUNK];
        for chunk in values.chunks(TICK_CHUNK) {
            for (slot, value) in raw.iter_mut().zip(chunk) {
                *slot = Self::days_for(value)?;
            }
            write_lane_values(&self.caps, w, &raw[..chunk.len()]);
        }
        Ok(())
    }
}

/// `DateTime`: four unsigned little-endian bytes of seconds since the Unix
/// epoch. Writing truncates any sub-second component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTimeType {
    caps: SimdCaps,
}

impl DateTimeType {
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

    fn seconds_for(value: &DateTime<Utc>) -> Result<u32> {
        u32::try_from(value.timestamp()).map_err(|_| {
            CodecError::overflow(
                "DateTime",
                format!("{value} is outside the unsigned 32-bit second range"),
            )
        })
    }

    fn from_seconds(secs: u32) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(secs), 0)
            .ok_or_else(|| CodecError::overflow("DateTime", format!("{secs} seconds")))
    }
}

impl Default for DateTimeType {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnType for DateTimeType {
    type Value = DateTime<Utc>;

    fn protocol_code(&self) -> u8 {
        0x11
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("DateTime")
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(4)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<DateTime<Utc>> {
        let mut raw = [0u8; 4];
        read_fixed(seq, &mut raw)?;
        Self::from_seconds(u32::from_le_bytes(raw))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<DateTime<Utc>>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 4);
        let mut raw = [0u32; TICK_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(TICK_CHUNK);
            read_lanes_into(&self.caps, seq, &mut raw[..take])?;
            for &secs in &raw[..take] {
                dst.push(Self::from_seconds(secs)?);
            }
            remaining -= take;
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &DateTime<Utc>) -> Result<()> {
        w.put_slice(&Self::seconds_for(value)?.to_le_bytes());
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[DateTime<Utc>]) -> Result<()> {
        let mut raw = [0u32; TICK_CHUNK];
        for chunk in values.chunks(TICK_CHUNK) {
            for (slot, value) in raw.iter_mut().zip(chunk) {
                *slot = Self::seconds_for(value)?;
            }
            write_lane_values(&self.caps, w, &raw[..chunk.len()]);
        }
        Ok(())
    }
}

/// `DateTime64(p)`: eight signed little-endian bytes of 10^-p-second ticks
/// since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTime64Type {
    precision: u32,
    caps: SimdCaps,
}

impl DateTime64Type {
    /// Server-side default sub-second precision.
    pub const DEFAULT_PRECISION: u32 = 3;

    /// Handler for `DateTime64(precision)`, `precision` in 0..=9.
    pub fn new(precision: u32) -> Result<Self> {
        Self::with_caps(precision, SimdCaps::native())
    }

    /// Handler with an explicit capability set.
    pub fn with_caps(precision: u32, caps: SimdCaps) -> Result<Self> {
        if precision > 9 {
            return Err(CodecError::parameter(
                "DateTime64",
                "precision",
                format!("{precision} exceeds the maximum of 9"),
            ));
        }
        Ok(Self { precision, caps })
    }

    /// Sub-second precision this handler was built with.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    fn ticks_for(&self, value: &DateTime<Utc>) -> Result<i64> {
        let unit = POW10[self.precision as usize];
        let nanos_per_tick = POW10[(9 - self.precision) as usize];
        let sub_ticks = i64::from(value.timestamp_subsec_nanos()) / nanos_per_tick;
        value
            .timestamp()
            .checked_mul(unit)
            .and_then(|t| t.checked_add(sub_ticks))
            .ok_or_else(|| {
                CodecError::overflow(
                    self.type_name(),
                    format!("{value} exceeds the signed 64-bit tick range"),
                )
            })
    }

    fn from_ticks(&self, ticks: i64) -> Result<DateTime<Utc>> {
        let unit = POW10[self.precision as usize];
        let nanos_per_tick = POW10[(9 - self.precision) as usize];
        let secs = ticks.div_euclid(unit);
        let nanos = (ticks.rem_euclid(unit) * nanos_per_tick) as u32;
        DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
            CodecError::overflow(self.type_name(), format!("{ticks} ticks"))
        })
    }
}

impl Default for DateTime64Type {
    fn default() -> Self {
        Self {
            precision: Self::DEFAULT_PRECISION,
            caps: SimdCaps::native(),
        }
    }
}

impl ColumnType for DateTime64Type {
    type Value = DateTime<Utc>;

    fn protocol_code(&self) -> u8 {
        0x19
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("DateTime64({})", self.precision))
    }

    fn fixed_byte_length(&self) -> Option<usize> {
        Some(8)
    }

    fn simd_caps(&self) -> SimdCaps {
        self.caps
    }

    fn read_value(&self, seq: &mut ByteSequence) -> Result<DateTime<Utc>> {
        let mut raw = [0u8; 8];
        read_fixed(seq, &mut raw)?;
        self.from_ticks(i64::from_le_bytes(raw))
    }

    fn read_values(
        &self,
        seq: &mut ByteSequence,
        dst: &mut Vec<DateTime<Utc>>,
        limit: usize,
    ) -> Result<usize> {
        let count = limit.min(seq.len() / 8);
        let mut ticks = [0i64; TICK_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(TICK_CHUNK);
            read_lanes_into(&self.caps, seq, &mut ticks[..take])?;
            for &t in &ticks[..take] {
                dst.push(self.from_ticks(t)?);
            }
            remaining -= take;
        }
        Ok(count)
    }

    fn write_value(&self, w: &mut ByteWriter, value: &DateTime<Utc>) -> Result<()> {
        w.put_slice(&self.ticks_for(value)?.to_le_bytes());
        Ok(())
    }

    fn write_values(&self, w: &mut ByteWriter, values: &[DateTime<Utc>]) -> Result<()> {
        let mut ticks = [0i64; TICK_CHUNK];
        for chunk in values.chunks(TICK_CHUNK) {
            for (slot, value) in ticks.iter_mut().zip(chunk) {
                *slot = self.ticks_for(value)?;
            }
            write_lane_values(&self.caps, w, &ticks[..chunk.len()]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_date_epoch_encodes_as_zero() {
        let ty = DateType::new();
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &date(1970, 1, 1)).expect("write");
        assert_eq!(w.as_slice(), &[0x00, 0x00]);
    }

    #[test]
    fn test_date_range_endpoints_round_trip() {
        let ty = DateType::new();
        for d in [date(1970, 1, 1), date(2149, 6, 6)] {
            let mut w = ByteWriter::new();
            ty.write_value(&mut w, &d).expect("write");
            let mut seq = ByteSequence::from(w.finish());
            assert_eq!(ty.read_value(&mut seq).expect("read"), d);
        }
        // 2149-06-06 is day 65535.
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &date(2149, 6, 6)).expect("write");
        assert_eq!(w.as_slice(), &[0xff, 0xff]);
    }

    #[test]
    fn test_date_below_epoch_overflows() {
        let ty = DateType::new();
        let mut w = ByteWriter::new();
        let err = ty.write_value(&mut w, &date(1969, 12, 31)).unwrap_err();
        assert!(matches!(err, CodecError::Overflow { .. }));
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_date32_base_and_endpoints() {
        let ty = Date32Type::new();
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &date(1900, 1, 1)).expect("write");
        assert_eq!(w.as_slice(), &[0x00, 0x00, 0x00, 0x00]);

        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &date(2299, 12, 31)).expect("write");
        assert_eq!(w.as_slice(), &DATE32_MAX_DAYS.to_le_bytes());

        for d in [date(1899, 12, 31), date(2300, 1, 1)] {
            let mut w = ByteWriter::new();
            assert!(matches!(
                ty.write_value(&mut w, &d),
                Err(CodecError::Overflow { .. })
            ));
        }
    }

    #[test]
    fn test_date32_round_trip_known_day() {
        let ty = Date32Type::new();
        let d = date(1970, 1, 1);
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &d).expect("write");
        // 25567 days from 1900-01-01 to 1970-01-01.
        assert_eq!(w.as_slice(), &25_567i32.to_le_bytes());
        let mut seq = ByteSequence::from(w.finish());
        assert_eq!(ty.read_value(&mut seq).expect("read"), d);
    }

    #[test]
    fn test_datetime_second_round_trip() {
        let ty = DateTimeType::new();
        let ts = DateTime::from_timestamp(1_234_567_890, 0).expect("valid");
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &ts).expect("write");
        assert_eq!(w.as_slice(), &1_234_567_890u32.to_le_bytes());
        let mut seq = ByteSequence::from(w.finish());
        assert_eq!(ty.read_value(&mut seq).expect("read"), ts);
    }

    #[test]
    fn test_datetime_before_epoch_overflows() {
        let ty = DateTimeType::new();
        let ts = DateTime::from_timestamp(-1, 0).expect("valid");
        let mut w = ByteWriter::new();
        assert!(matches!(
            ty.write_value(&mut w, &ts),
            Err(CodecError::Overflow { .. })
        ));
    }

    #[test]
    fn test_datetime64_millisecond_vectors() {
        let ty = DateTime64Type::new(3).expect("precision in range");
        let one_milli = DateTime::from_timestamp(0, 1_000_000).expect("valid");
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &one_milli).expect("write");
        assert_eq!(w.as_slice(), &[0x01, 0, 0, 0, 0, 0, 0, 0]);

        let one_second = DateTime::from_timestamp(1, 0).expect("valid");
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &one_second).expect("write");
        assert_eq!(w.as_slice(), &[0xE8, 0x03, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_datetime64_negative_ticks_round_trip() {
        let ty = DateTime64Type::new(3).expect("precision in range");
        // One millisecond before the epoch.
        let ts = DateTime::from_timestamp(-1, 999_000_000).expect("valid");
        let mut w = ByteWriter::new();
        ty.write_value(&mut w, &ts).expect("write");
        assert_eq!(w.as_slice(), &(-1i64).to_le_bytes());
        let mut seq = ByteSequence::from(w.finish());
        assert_eq!(ty.read_value(&mut seq).expect("read"), ts);
    }

    #[test]
    fn test_datetime64_precision_validation() {
        assert!(DateTime64Type::new(0).is_ok());
        assert!(DateTime64Type::new(9).is_ok());
        assert!(matches!(
            DateTime64Type::new(10),
            Err(CodecError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_datetime64_bulk_crosses_tick_chunks() {
        let ty = DateTime64Type::new(6).expect("precision in range");
        let values: Vec<DateTime<Utc>> = (0..600)
            .map(|i| DateTime::from_timestamp(i, (i as u32 % 1000) * 1000).expect("valid"))
            .collect();
        let mut w = ByteWriter::new();
        ty.write_values(&mut w, &values).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let mut out = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, values.len()).expect("read");
        assert_eq!(n, values.len());
        assert_eq!(out, values);
    }

    #[test]
    fn test_datetime64_name_carries_precision() {
        let ty = DateTime64Type::new(7).expect("precision in range");
        assert_eq!(ty.type_name(), "DateTime64(7)");
    }
}
