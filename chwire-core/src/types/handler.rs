//! Type-erased handler dispatch.
//!
//! The registry and block serializers work over heterogeneous columns, so
//! they hold a [`Handler`] and dispatch to the typed impls per variant.
//! Wire types that share a storage kind share a [`Column`]/[`Value`]
//! variant (both date widths store dates, all decimal widths store
//! decimals, and so on); the handler decides the wire shape.

use std::borrow::Cow;

use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};
use crate::simd::SimdCaps;
use crate::value::{Column, Value};

use super::{
    BoolType, ColumnType, Date32Type, DateTime64Type, DateTimeType, DateType, Decimal128Type,
    Decimal32Type, Decimal64Type, FixedStringType, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, Ipv4Type, Ipv6Type, StringType, UInt16Type, UInt32Type, UInt64Type,
    UInt8Type, UuidType,
};

/// One handler per wire type, erased for registry and block use.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    Int8(Int8Type),
    Int16(Int16Type),
    Int32(Int32Type),
    Int64(Int64Type),
    UInt8(UInt8Type),
    UInt16(UInt16Type),
    UInt32(UInt32Type),
    UInt64(UInt64Type),
    Float32(Float32Type),
    Float64(Float64Type),
    Bool(BoolType),
    Date(DateType),
    Date32(Date32Type),
    DateTime(DateTimeType),
    DateTime64(DateTime64Type),
    Decimal32(Decimal32Type),
    Decimal64(Decimal64Type),
    Decimal128(Decimal128Type),
    Uuid(UuidType),
    Ipv4(Ipv4Type),
    Ipv6(Ipv6Type),
    String(StringType),
    FixedString(FixedStringType),
}

macro_rules! dispatch {
    ($self:expr, $ty:ident => $e:expr) => {
        match $self {
            Handler::Int8($ty) => $e,
            Handler::Int16($ty) => $e,
            Handler::Int32($ty) => $e,
            Handler::Int64($ty) => $e,
            Handler::UInt8($ty) => $e,
            Handler::UInt16($ty) => $e,
            Handler::UInt32($ty) => $e,
            Handler::UInt64($ty) => $e,
            Handler::Float32($ty) => $e,
            Handler::Float64($ty) => $e,
            Handler::Bool($ty) => $e,
            Handler::Date($ty) => $e,
            Handler::Date32($ty) => $e,
            Handler::DateTime($ty) => $e,
            Handler::DateTime64($ty) => $e,
            Handler::Decimal32($ty) => $e,
            Handler::Decimal64($ty) => $e,
            Handler::Decimal128($ty) => $e,
            Handler::Uuid($ty) => $e,
            Handler::Ipv4($ty) => $e,
            Handler::Ipv6($ty) => $e,
            Handler::String($ty) => $e,
            Handler::FixedString($ty) => $e,
        }
    };
}

/// Read exactly `rows` values or fail with the shortfall located.
fn read_exact<T: ColumnType>(ty: &T, seq: &mut ByteSequence, rows: usize) -> Result<Vec<T::Value>> {
    // Every value is at least one wire byte, so a row count from a hostile
    // header cannot force a larger preallocation than the input itself.
    let mut values = Vec::with_capacity(rows.min(seq.len()));
    let n = ty.read_values(seq, &mut values, rows)?;
    if n < rows {
        return Err(match ty.fixed_byte_length() {
            Some(size) => CodecError::underrun(rows * size, n * size + seq.len()),
            None => CodecError::underrun(rows, n),
        });
    }
    Ok(values)
}

impl Handler {
    /// One-byte wire identity.
    pub fn protocol_code(&self) -> u8 {
        dispatch!(self, ty => ty.protocol_code())
    }

    /// Printable server-side type name.
    pub fn type_name(&self) -> Cow<'static, str> {
        dispatch!(self, ty => ty.type_name())
    }

    /// Wire bytes per value for fixed-length types, `None` for variable.
    pub fn fixed_byte_length(&self) -> Option<usize> {
        dispatch!(self, ty => ty.fixed_byte_length())
    }

    /// The capability set the handler selects tiers from.
    pub fn simd_caps(&self) -> SimdCaps {
        dispatch!(self, ty => ty.simd_caps())
    }

    /// Empty column of this handler's storage kind.
    pub fn new_column(&self, capacity: usize) -> Column {
        match self {
            Handler::Int8(_) => Column::Int8(Vec::with_capacity(capacity)),
            Handler::Int16(_) => Column::Int16(Vec::with_capacity(capacity)),
            Handler::Int32(_) => Column::Int32(Vec::with_capacity(capacity)),
            Handler::Int64(_) => Column::Int64(Vec::with_capacity(capacity)),
            Handler::UInt8(_) => Column::UInt8(Vec::with_capacity(capacity)),
            Handler::UInt16(_) => Column::UInt16(Vec::with_capacity(capacity)),
            Handler::UInt32(_) => Column::UInt32(Vec::with_capacity(capacity)),
            Handler::UInt64(_) => Column::UInt64(Vec::with_capacity(capacity)),
            Handler::Float32(_) => Column::Float32(Vec::with_capacity(capacity)),
            Handler::Float64(_) => Column::Float64(Vec::with_capacity(capacity)),
            Handler::Bool(_) => Column::Bool(Vec::with_capacity(capacity)),
            Handler::Date(_) | Handler::Date32(_) => Column::Date(Vec::with_capacity(capacity)),
            Handler::DateTime(_) | Handler::DateTime64(_) => {
                Column::DateTime(Vec::with_capacity(capacity))
            }
            Handler::Decimal32(_) | Handler::Decimal64(_) | Handler::Decimal128(_) => {
                Column::Decimal(Vec::with_capacity(capacity))
            }
            Handler::Uuid(_) => Column::Uuid(Vec::with_capacity(capacity)),
            Handler::Ipv4(_) | Handler::Ipv6(_) => Column::Ip(Vec::with_capacity(capacity)),
            Handler::String(_) | Handler::FixedString(_) => {
                Column::String(Vec::with_capacity(capacity))
            }
        }
    }

    /// Decode one value.
    pub fn read_value(&self, seq: &mut ByteSequence) -> Result<Value> {
        Ok(match self {
            Handler::Int8(ty) => Value::Int8(ty.read_value(seq)?),
            Handler::Int16(ty) => Value::Int16(ty.read_value(seq)?),
            Handler::Int32(ty) => Value::Int32(ty.read_value(seq)?),
            Handler::Int64(ty) => Value::Int64(ty.read_value(seq)?),
            Handler::UInt8(ty) => Value::UInt8(ty.read_value(seq)?),
            Handler::UInt16(ty) => Value::UInt16(ty.read_value(seq)?),
            Handler::UInt32(ty) => Value::UInt32(ty.read_value(seq)?),
            Handler::UInt64(ty) => Value::UInt64(ty.read_value(seq)?),
            Handler::Float32(ty) => Value::Float32(ty.read_value(seq)?),
            Handler::Float64(ty) => Value::Float64(ty.read_value(seq)?),
            Handler::Bool(ty) => Value::Bool(ty.read_value(seq)?),
            Handler::Date(ty) => Value::Date(ty.read_value(seq)?),
            Handler::Date32(ty) => Value::Date(ty.read_value(seq)?),
            Handler::DateTime(ty) => Value::DateTime(ty.read_value(seq)?),
            Handler::DateTime64(ty) => Value::DateTime(ty.read_value(seq)?),
            Handler::Decimal32(ty) => Value::Decimal(ty.read_value(seq)?),
            Handler::Decimal64(ty) => Value::Decimal(ty.read_value(seq)?),
            Handler::Decimal128(ty) => Value::Decimal(ty.read_value(seq)?),
            Handler::Uuid(ty) => Value::Uuid(ty.read_value(seq)?),
            Handler::Ipv4(ty) => Value::Ip(ty.read_value(seq)?),
            Handler::Ipv6(ty) => Value::Ip(ty.read_value(seq)?),
            Handler::String(ty) => Value::String(ty.read_value(seq)?),
            Handler::FixedString(ty) => Value::String(ty.read_value(seq)?),
        })
    }

    /// Encode one value, failing with a schema mismatch when the value's
    /// storage kind is not the handler's.
    pub fn write_value(&self, w: &mut ByteWriter, value: &Value) -> Result<()> {
        match (self, value) {
            (Handler::Int8(ty), Value::Int8(v)) => ty.write_value(w, v),
            (Handler::Int16(ty), Value::Int16(v)) => ty.write_value(w, v),
            (Handler::Int32(ty), Value::Int32(v)) => ty.write_value(w, v),
            (Handler::Int64(ty), Value::Int64(v)) => ty.write_value(w, v),
            (Handler::UInt8(ty), Value::UInt8(v)) => ty.write_value(w, v),
            (Handler::UInt16(ty), Value::UInt16(v)) => ty.write_value(w, v),
            (Handler::UInt32(ty), Value::UInt32(v)) => ty.write_value(w, v),
            (Handler::UInt64(ty), Value::UInt64(v)) => ty.write_value(w, v),
            (Handler::Float32(ty), Value::Float32(v)) => ty.write_value(w, v),
            (Handler::Float64(ty), Value::Float64(v)) => ty.write_value(w, v),
            (Handler::Bool(ty), Value::Bool(v)) => ty.write_value(w, v),
            (Handler::Date(ty), Value::Date(v)) => ty.write_value(w, v),
            (Handler::Date32(ty), Value::Date(v)) => ty.write_value(w, v),
            (Handler::DateTime(ty), Value::DateTime(v)) => ty.write_value(w, v),
            (Handler::DateTime64(ty), Value::DateTime(v)) => ty.write_value(w, v),
            (Handler::Decimal32(ty), Value::Decimal(v)) => ty.write_value(w, v),
            (Handler::Decimal64(ty), Value::Decimal(v)) => ty.write_value(w, v),
            (Handler::Decimal128(ty), Value::Decimal(v)) => ty.write_value(w, v),
            (Handler::Uuid(ty), Value::Uuid(v)) => ty.write_value(w, v),
            (Handler::Ipv4(ty), Value::Ip(v)) => ty.write_value(w, v),
            (Handler::Ipv6(ty), Value::Ip(v)) => ty.write_value(w, v),
            (Handler::String(ty), Value::String(v)) => ty.write_value(w, v),
            (Handler::FixedString(ty), Value::String(v)) => ty.write_value(w, v),
            (handler, value) => Err(CodecError::schema(format!(
                "{} handler cannot write a {} value",
                handler.type_name(),
                value.kind()
            ))),
        }
    }

    /// Decode exactly `rows` values into a fresh column.
    pub fn read_column(&self, seq: &mut ByteSequence, rows: usize) -> Result<Column> {
        Ok(match self {
            Handler::Int8(ty) => Column::Int8(read_exact(ty, seq, rows)?),
            Handler::Int16(ty) => Column::Int16(read_exact(ty, seq, rows)?),
            Handler::Int32(ty) => Column::Int32(read_exact(ty, seq, rows)?),
            Handler::Int64(ty) => Column::Int64(read_exact(ty, seq, rows)?),
            Handler::UInt8(ty) => Column::UInt8(read_exact(ty, seq, rows)?),
            Handler::UInt16(ty) => Column::UInt16(read_exact(ty, seq, rows)?),
            Handler::UInt32(ty) => Column::UInt32(read_exact(ty, seq, rows)?),
            Handler::UInt64(ty) => Column::UInt64(read_exact(ty, seq, rows)?),
            Handler::Float32(ty) => Column::Float32(read_exact(ty, seq, rows)?),
            Handler::Float64(ty) => Column::Float64(read_exact(ty, seq, rows)?),
            Handler::Bool(ty) => Column::Bool(read_exact(ty, seq, rows)?),
            Handler::Date(ty) => Column::Date(read_exact(ty, seq, rows)?),
            Handler::Date32(ty) => Column::Date(read_exact(ty, seq, rows)?),
            Handler::DateTime(ty) => Column::DateTime(read_exact(ty, seq, rows)?),
            Handler::DateTime64(ty) => Column::DateTime(read_exact(ty, seq, rows)?),
            Handler::Decimal32(ty) => Column::Decimal(read_exact(ty, seq, rows)?),
            Handler::Decimal64(ty) => Column::Decimal(read_exact(ty, seq, rows)?),
            Handler::Decimal128(ty) => Column::Decimal(read_exact(ty, seq, rows)?),
            Handler::Uuid(ty) => Column::Uuid(read_exact(ty, seq, rows)?),
            Handler::Ipv4(ty) => Column::Ip(read_exact(ty, seq, rows)?),
            Handler::Ipv6(ty) => Column::Ip(read_exact(ty, seq, rows)?),
            Handler::String(ty) => Column::String(read_exact(ty, seq, rows)?),
            Handler::FixedString(ty) => Column::String(read_exact(ty, seq, rows)?),
        })
    }

    /// Encode a whole column, failing with a schema mismatch when the
    /// column's storage kind is not the handler's.
    pub fn write_column(&self, w: &mut ByteWriter, column: &Column) -> Result<()> {
        match (self, column) {
            (Handler::Int8(ty), Column::Int8(v)) => ty.write_values(w, v),
            (Handler::Int16(ty), Column::Int16(v)) => ty.write_values(w, v),
            (Handler::Int32(ty), Column::Int32(v)) => ty.write_values(w, v),
            (Handler::Int64(ty), Column::Int64(v)) => ty.write_values(w, v),
            (Handler::UInt8(ty), Column::UInt8(v)) => ty.write_values(w, v),
            (Handler::UInt16(ty), Column::UInt16(v)) => ty.write_values(w, v),
            (Handler::UInt32(ty), Column::UInt32(v)) => ty.write_values(w, v),
            (Handler::UInt64(ty), Column::UInt64(v)) => ty.write_values(w, v),
            (Handler::Float32(ty), Column::Float32(v)) => ty.write_values(w, v),
            (Handler::Float64(ty), Column::Float64(v)) => ty.write_values(w, v),
            (Handler::Bool(ty), Column::Bool(v)) => ty.write_values(w, v),
            (Handler::Date(ty), Column::Date(v)) => ty.write_values(w, v),
            (Handler::Date32(ty), Column::Date(v)) => ty.write_values(w, v),
            (Handler::DateTime(ty), Column::DateTime(v)) => ty.write_values(w, v),
            (Handler::DateTime64(ty), Column::DateTime(v)) => ty.write_values(w, v),
            (Handler::Decimal32(ty), Column::Decimal(v)) => ty.write_values(w, v),
            (Handler::Decimal64(ty), Column::Decimal(v)) => ty.write_values(w, v),
            (Handler::Decimal128(ty), Column::Decimal(v)) => ty.write_values(w, v),
            (Handler::Uuid(ty), Column::Uuid(v)) => ty.write_values(w, v),
            (Handler::Ipv4(ty), Column::Ip(v)) => ty.write_values(w, v),
            (Handler::Ipv6(ty), Column::Ip(v)) => ty.write_values(w, v),
            (Handler::String(ty), Column::String(v)) => ty.write_values(w, v),
            (Handler::FixedString(ty), Column::String(v)) => ty.write_values(w, v),
            (handler, column) => Err(CodecError::schema(format!(
                "{} handler cannot write a {} column",
                handler.type_name(),
                column.kind()
            ))),
        }
    }
}

macro_rules! handler_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Handler {
            fn from(ty: $ty) -> Self {
                Handler::$variant(ty)
            }
        }
    )*};
}

handler_from! {
    Int8Type => Int8, Int16Type => Int16, Int32Type => Int32, Int64Type => Int64,
    UInt8Type => UInt8, UInt16Type => UInt16, UInt32Type => UInt32, UInt64Type => UInt64,
    Float32Type => Float32, Float64Type => Float64,
    BoolType => Bool,
    DateType => Date, Date32Type => Date32,
    DateTimeType => DateTime, DateTime64Type => DateTime64,
    Decimal32Type => Decimal32, Decimal64Type => Decimal64, Decimal128Type => Decimal128,
    UuidType => Uuid,
    Ipv4Type => Ipv4, Ipv6Type => Ipv6,
    StringType => String, FixedStringType => FixedString,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_dispatch_round_trip() {
        let handler = Handler::from(Int32Type::new());
        let mut w = ByteWriter::new();
        handler.write_value(&mut w, &Value::Int32(-7)).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        assert_eq!(handler.read_value(&mut seq).expect("read"), Value::Int32(-7));
    }

    #[test]
    fn test_value_kind_mismatch() {
        let handler = Handler::from(Int32Type::new());
        let mut w = ByteWriter::new();
        let err = handler.write_value(&mut w, &Value::from("oops")).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn test_column_round_trip() {
        let handler = Handler::from(StringType::new());
        let column = Column::from(vec!["a", "bb", ""]);
        let mut w = ByteWriter::new();
        handler.write_column(&mut w, &column).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let back = handler.read_column(&mut seq, 3).expect("read");
        assert_eq!(back, column);
    }

    #[test]
    fn test_read_column_short_input_is_underrun() {
        let handler = Handler::from(Int64Type::new());
        let mut seq = ByteSequence::from(vec![0u8; 12]);
        assert!(matches!(
            handler.read_column(&mut seq, 2),
            Err(CodecError::Underrun { needed: 16, .. })
        ));
    }
}
