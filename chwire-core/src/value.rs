//! Host-side values and column storage.
//!
//! [`Value`] is a single typed cell; [`Column`] is the parallel typed list a
//! block stores per column. Several wire types share one storage kind: both
//! date widths store [`NaiveDate`], both datetime widths store
//! [`DateTime<Utc>`], the three decimal widths store [`Decimal`], both IP
//! families store [`IpAddr`], and `String`/`FixedString` store raw
//! [`Bytes`]. The handler attached to the column decides the wire shape.
//!
//! String payloads are kept verbatim: no UTF-8 validation happens on the
//! wire path. [`Value::as_str`] converts on demand, taking an unchecked
//! path when a vectorized high-bit probe proves the payload pure ASCII and
//! a strict UTF-8 scan otherwise.

use std::net::IpAddr;
use std::str::Utf8Error;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{CodecError, Result};
use crate::simd::{ascii_str, SimdCaps};

/// One typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Decimal(Decimal),
    Uuid(Uuid),
    Ip(IpAddr),
    String(Bytes),
}

impl Value {
    /// Storage kind name, used in schema mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int8(_) => "Int8",
            Value::Int16(_) => "Int16",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::UInt8(_) => "UInt8",
            Value::UInt16(_) => "UInt16",
            Value::UInt32(_) => "UInt32",
            Value::UInt64(_) => "UInt64",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::Bool(_) => "Bool",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Decimal(_) => "Decimal",
            Value::Uuid(_) => "UUID",
            Value::Ip(_) => "IP",
            Value::String(_) => "String",
        }
    }

    /// String payload as text. ASCII payloads skip the UTF-8 scan via the
    /// vectorized high-bit probe; everything else is validated strictly.
    pub fn as_str(&self) -> Option<std::result::Result<&str, Utf8Error>> {
        match self {
            Value::String(bytes) => {
                if let Some(s) = ascii_str(&SimdCaps::native(), bytes) {
                    Some(Ok(s))
                } else {
                    Some(std::str::from_utf8(bytes))
                }
            }
            _ => None,
        }
    }

    /// Raw string payload, if this is a string value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::String(bytes) => Some(bytes),
            _ => None,
        }
    }
}

macro_rules! value_as {
    ($($fn_name:ident, $variant:ident, $ty:ty);* $(;)?) => {$(
        /// The contained value when the storage kind matches, else `None`.
        pub fn $fn_name(&self) -> Option<$ty> {
            match self {
                Value::$variant(v) => Some(*v),
                _ => None,
            }
        }
    )*};
}

impl Value {
    value_as! {
        as_i8, Int8, i8;
        as_i16, Int16, i16;
        as_i32, Int32, i32;
        as_i64, Int64, i64;
        as_u8, UInt8, u8;
        as_u16, UInt16, u16;
        as_u32, UInt32, u32;
        as_u64, UInt64, u64;
        as_f32, Float32, f32;
        as_f64, Float64, f64;
        as_bool, Bool, bool;
        as_date, Date, NaiveDate;
        as_datetime, DateTime, DateTime<Utc>;
        as_decimal, Decimal, Decimal;
        as_uuid, Uuid, Uuid;
        as_ip, Ip, IpAddr;
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )*};
}

value_from! {
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    f32 => Float32, f64 => Float64,
    bool => Bool,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
    Decimal => Decimal,
    Uuid => Uuid,
    IpAddr => Ip,
    Bytes => String,
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(v: std::net::Ipv4Addr) -> Self {
        Value::Ip(IpAddr::V4(v))
    }
}

impl From<std::net::Ipv6Addr> for Value {
    fn from(v: std::net::Ipv6Addr) -> Self {
        Value::Ip(IpAddr::V6(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Bytes::from(v.into_bytes()))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::String(Bytes::copy_from_slice(v))
    }
}

/// Typed per-column storage inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Date(Vec<NaiveDate>),
    DateTime(Vec<DateTime<Utc>>),
    Decimal(Vec<Decimal>),
    Uuid(Vec<Uuid>),
    Ip(Vec<IpAddr>),
    String(Vec<Bytes>),
}

macro_rules! column_each {
    ($self:expr, $values:ident => $e:expr) => {
        match $self {
            Column::Int8($values) => $e,
            Column::Int16($values) => $e,
            Column::Int32($values) => $e,
            Column::Int64($values) => $e,
            Column::UInt8($values) => $e,
            Column::UInt16($values) => $e,
            Column::UInt32($values) => $e,
            Column::UInt64($values) => $e,
            Column::Float32($values) => $e,
            Column::Float64($values) => $e,
            Column::Bool($values) => $e,
            Column::Date($values) => $e,
            Column::DateTime($values) => $e,
            Column::Decimal($values) => $e,
            Column::Uuid($values) => $e,
            Column::Ip($values) => $e,
            Column::String($values) => $e,
        }
    };
}

impl Column {
    /// Number of values stored.
    pub fn len(&self) -> usize {
        column_each!(self, values => values.len())
    }

    /// True when no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage kind name, used in schema mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Int8(_) => "Int8",
            Column::Int16(_) => "Int16",
            Column::Int32(_) => "Int32",
            Column::Int64(_) => "Int64",
            Column::UInt8(_) => "UInt8",
            Column::UInt16(_) => "UInt16",
            Column::UInt32(_) => "UInt32",
            Column::UInt64(_) => "UInt64",
            Column::Float32(_) => "Float32",
            Column::Float64(_) => "Float64",
            Column::Bool(_) => "Bool",
            Column::Date(_) => "Date",
            Column::DateTime(_) => "DateTime",
            Column::Decimal(_) => "Decimal",
            Column::Uuid(_) => "UUID",
            Column::Ip(_) => "IP",
            Column::String(_) => "String",
        }
    }

    /// Cell at `index` as a [`Value`], cloning cheaply (string payloads are
    /// reference-counted).
    pub fn value_at(&self, index: usize) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        Some(match self {
            Column::Int8(v) => Value::Int8(v[index]),
            Column::Int16(v) => Value::Int16(v[index]),
            Column::Int32(v) => Value::Int32(v[index]),
            Column::Int64(v) => Value::Int64(v[index]),
            Column::UInt8(v) => Value::UInt8(v[index]),
            Column::UInt16(v) => Value::UInt16(v[index]),
            Column::UInt32(v) => Value::UInt32(v[index]),
            Column::UInt64(v) => Value::UInt64(v[index]),
            Column::Float32(v) => Value::Float32(v[index]),
            Column::Float64(v) => Value::Float64(v[index]),
            Column::Bool(v) => Value::Bool(v[index]),
            Column::Date(v) => Value::Date(v[index]),
            Column::DateTime(v) => Value::DateTime(v[index]),
            Column::Decimal(v) => Value::Decimal(v[index]),
            Column::Uuid(v) => Value::Uuid(v[index]),
            Column::Ip(v) => Value::Ip(v[index]),
            Column::String(v) => Value::String(v[index].clone()),
        })
    }

    /// Append one cell, failing with a schema mismatch when the value's
    /// storage kind differs from the column's.
    pub fn push_value(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (Column::Int8(v), Value::Int8(x)) => v.push(x),
            (Column::Int16(v), Value::Int16(x)) => v.push(x),
            (Column::Int32(v), Value::Int32(x)) => v.push(x),
            (Column::Int64(v), Value::Int64(x)) => v.push(x),
            (Column::UInt8(v), Value::UInt8(x)) => v.push(x),
            (Column::UInt16(v), Value::UInt16(x)) => v.push(x),
            (Column::UInt32(v), Value::UInt32(x)) => v.push(x),
            (Column::UInt64(v), Value::UInt64(x)) => v.push(x),
            (Column::Float32(v), Value::Float32(x)) => v.push(x),
            (Column::Float64(v), Value::Float64(x)) => v.push(x),
            (Column::Bool(v), Value::Bool(x)) => v.push(x),
            (Column::Date(v), Value::Date(x)) => v.push(x),
            (Column::DateTime(v), Value::DateTime(x)) => v.push(x),
            (Column::Decimal(v), Value::Decimal(x)) => v.push(x),
            (Column::Uuid(v), Value::Uuid(x)) => v.push(x),
            (Column::Ip(v), Value::Ip(x)) => v.push(x),
            (Column::String(v), Value::String(x)) => v.push(x),
            (column, value) => {
                return Err(CodecError::schema(format!(
                    "cannot push {} value into {} column",
                    value.kind(),
                    column.kind()
                )));
            }
        }
        Ok(())
    }
}

macro_rules! column_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<Vec<$ty>> for Column {
            fn from(values: Vec<$ty>) -> Self {
                Column::$variant(values)
            }
        }
    )*};
}

column_from! {
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    f32 => Float32, f64 => Float64,
    bool => Bool,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
    Decimal => Decimal,
    Uuid => Uuid,
    IpAddr => Ip,
    Bytes => String,
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::String(
            values
                .into_iter()
                .map(|s| Bytes::copy_from_slice(s.as_bytes()))
                .collect(),
        )
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::String(values.into_iter().map(|s| Bytes::from(s.into_bytes())).collect())
    }
}
