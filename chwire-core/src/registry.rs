//! Frozen type registry.
//!
//! Maps protocol codes and printable names to default handler instances.
//! Lookups are plain matches over immutable data; there is no mutable
//! global state. Parametric types are constructed from the tuple-form name
//! grammar `Name(param,param)` by [`parse_type_name`]; the code and name
//! lookups return default-parameter instances where a default exists
//! (`DateTime64(3)`, decimals at full precision and scale 0). `FixedString`
//! has no default length and is only reachable with parameters.

use crate::error::{CodecError, Result};
use crate::types::{
    BoolType, Date32Type, DateTime64Type, DateTimeType, DateType, Decimal128Type, Decimal32Type,
    Decimal64Type, FixedStringType, Float32Type, Float64Type, Handler, Int16Type, Int32Type,
    Int64Type, Int8Type, Ipv4Type, Ipv6Type, StringType, UInt16Type, UInt32Type, UInt64Type,
    UInt8Type, UuidType,
};

/// Default handler for a one-byte protocol code.
///
/// `0x01` resolves to `UInt8`; `Bool` shares that code and is reachable by
/// name only.
pub fn by_code(code: u8) -> Result<Handler> {
    Ok(match code {
        0x01 => UInt8Type::new().into(),
        0x02 => UInt16Type::new().into(),
        0x03 => UInt32Type::new().into(),
        0x04 => UInt64Type::new().into(),
        0x07 => Int8Type::new().into(),
        0x08 => Int16Type::new().into(),
        0x09 => Int32Type::new().into(),
        0x0A => Int64Type::new().into(),
        0x10 => DateType::new().into(),
        0x11 => DateTimeType::new().into(),
        0x13 => Ipv4Type::new().into(),
        0x14 => Ipv6Type::new().into(),
        0x15 => StringType::new().into(),
        0x17 => Decimal64Type::new(Decimal64Type::MAX_PRECISION, 0)?.into(),
        0x18 => Decimal128Type::new(Decimal128Type::MAX_PRECISION, 0)?.into(),
        0x19 => DateTime64Type::default().into(),
        0x1D => UuidType::new().into(),
        0x1E => Date32Type::new().into(),
        0x42 => Decimal32Type::new(Decimal32Type::MAX_PRECISION, 0)?.into(),
        0x43 => Float32Type::new().into(),
        0x44 => Float64Type::new().into(),
        other => {
            return Err(CodecError::UnknownType(format!(
                "protocol code 0x{other:02X}"
            )));
        }
    })
}

/// Default handler for a printable type name, case-insensitive.
pub fn by_name(name: &str) -> Result<Handler> {
    Ok(match name.trim().to_ascii_lowercase().as_str() {
        "int8" => Int8Type::new().into(),
        "int16" => Int16Type::new().into(),
        "int32" => Int32Type::new().into(),
        "int64" => Int64Type::new().into(),
        "uint8" => UInt8Type::new().into(),
        "uint16" => UInt16Type::new().into(),
        "uint32" => UInt32Type::new().into(),
        "uint64" => UInt64Type::new().into(),
        "float32" => Float32Type::new().into(),
        "float64" => Float64Type::new().into(),
        "bool" => BoolType::new().into(),
        "date" => DateType::new().into(),
        "date32" => Date32Type::new().into(),
        "datetime" => DateTimeType::new().into(),
        "datetime64" => DateTime64Type::default().into(),
        "decimal32" => Decimal32Type::new(Decimal32Type::MAX_PRECISION, 0)?.into(),
        "decimal64" => Decimal64Type::new(Decimal64Type::MAX_PRECISION, 0)?.into(),
        "decimal128" => Decimal128Type::new(Decimal128Type::MAX_PRECISION, 0)?.into(),
        "uuid" => UuidType::new().into(),
        "ipv4" => Ipv4Type::new().into(),
        "ipv6" => Ipv6Type::new().into(),
        "string" => StringType::new().into(),
        other => return Err(CodecError::UnknownType(other.to_string())),
    })
}

/// Handler for a full server type name, including the tuple-form parametric
/// grammar: `Decimal32/64/128(p,s)`, width-inferring `Decimal(p,s)`,
/// `DateTime64(p)`, `FixedString(n)`.
pub fn parse_type_name(name: &str) -> Result<Handler> {
    let name = name.trim();
    let Some(open) = name.find('(') else {
        return by_name(name);
    };
    if !name.ends_with(')') {
        return Err(CodecError::UnknownType(name.to_string()));
    }
    let base = name[..open].trim().to_ascii_lowercase();
    let params: Vec<&str> = name[open + 1..name.len() - 1]
        .split(',')
        .map(str::trim)
        .collect();

    let parse = |raw: &str| -> Result<u32> {
        raw.parse::<u32>()
            .map_err(|_| CodecError::UnknownType(name.to_string()))
    };

    Ok(match (base.as_str(), params.as_slice()) {
        ("datetime64", [p]) => DateTime64Type::new(parse(p)?)?.into(),
        ("fixedstring", [n]) => FixedStringType::new(parse(n)? as usize)?.into(),
        ("decimal32", [p, s]) => Decimal32Type::new(parse(p)?, parse(s)?)?.into(),
        ("decimal64", [p, s]) => Decimal64Type::new(parse(p)?, parse(s)?)?.into(),
        ("decimal128", [p, s]) => Decimal128Type::new(parse(p)?, parse(s)?)?.into(),
        ("decimal", [p, s]) => {
            let (precision, scale) = (parse(p)?, parse(s)?);
            if precision <= Decimal32Type::MAX_PRECISION {
                Decimal32Type::new(precision, scale)?.into()
            } else if precision <= Decimal64Type::MAX_PRECISION {
                Decimal64Type::new(precision, scale)?.into()
            } else {
                Decimal128Type::new(precision, scale)?.into()
            }
        }
        _ => return Err(CodecError::UnknownType(name.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_and_name_agree() {
        for code in [
            0x01, 0x02, 0x03, 0x04, 0x07, 0x08, 0x09, 0x0A, 0x10, 0x11, 0x13, 0x14, 0x15, 0x17,
            0x18, 0x19, 0x1D, 0x1E, 0x42, 0x43, 0x44,
        ] {
            let handler = by_code(code).expect("registered code");
            assert_eq!(handler.protocol_code(), code);
            let by_printable =
                parse_type_name(&handler.type_name()).expect("name resolves back");
            assert_eq!(by_printable.type_name(), handler.type_name());
        }
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        for name in ["Int32", "int32", "INT32", " int32 "] {
            assert_eq!(by_name(name).expect("known name").type_name(), "Int32");
        }
    }

    #[test]
    fn test_bool_shares_uint8_code() {
        let bool_handler = by_name("Bool").expect("known name");
        let uint8_handler = by_code(0x01).expect("registered code");
        assert_eq!(bool_handler.protocol_code(), 0x01);
        assert_eq!(uint8_handler.type_name(), "UInt8");
    }

    #[test]
    fn test_parametric_grammar() {
        let handler = parse_type_name("Decimal64(18,2)").expect("valid");
        assert_eq!(handler.type_name(), "Decimal64(18,2)");

        let handler = parse_type_name("Decimal(4, 2)").expect("valid");
        assert_eq!(handler.type_name(), "Decimal32(4,2)");

        let handler = parse_type_name("Decimal(20,5)").expect("valid");
        assert_eq!(handler.type_name(), "Decimal128(20,5)");

        let handler = parse_type_name("DateTime64(3)").expect("valid");
        assert_eq!(handler.type_name(), "DateTime64(3)");

        let handler = parse_type_name("FixedString(10)").expect("valid");
        assert_eq!(handler.type_name(), "FixedString(10)");
    }

    #[test]
    fn test_unknown_and_invalid() {
        assert!(matches!(
            by_code(0x99),
            Err(CodecError::UnknownType(_))
        ));
        assert!(matches!(
            by_name("Array(Int32)"),
            Err(CodecError::UnknownType(_))
        ));
        assert!(matches!(
            by_name("FixedString"),
            Err(CodecError::UnknownType(_))
        ));
        assert!(matches!(
            parse_type_name("FixedString(abc)"),
            Err(CodecError::UnknownType(_))
        ));
        // Grammar is fine but the parameter is out of range.
        assert!(matches!(
            parse_type_name("DateTime64(12)"),
            Err(CodecError::InvalidParameter { .. })
        ));
    }
}
