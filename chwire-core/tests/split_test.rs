//! Non-contiguous input: for every handler, split the encoded stream at
//! every possible point into two segments and confirm the decode matches
//! the contiguous case.

use bytes::Bytes;
use chwire_core::types::{
    BoolType, ColumnType, Date32Type, DateTime64Type, DateTimeType, DateType, Decimal64Type,
    FixedStringType, Float64Type, Int32Type, Ipv4Type, Ipv6Type, StringType, UInt16Type, UuidType,
};
use chwire_core::{ByteSequence, ByteWriter};
use pretty_assertions::assert_eq;

fn assert_all_splits_agree<T>(ty: &T, values: &[T::Value])
where
    T: ColumnType,
    T::Value: PartialEq + std::fmt::Debug,
{
    let mut w = ByteWriter::new();
    ty.write_values(&mut w, values).expect("encode");
    let encoded = w.finish();

    let mut seq = ByteSequence::from(encoded.clone());
    let mut expected: Vec<T::Value> = Vec::new();
    ty.read_values(&mut seq, &mut expected, values.len()).expect("contiguous decode");
    assert_eq!(&expected[..], values);

    for at in 0..encoded.len() {
        let mut seq = ByteSequence::from_segments([encoded.slice(..at), encoded.slice(at..)]);
        let mut out: Vec<T::Value> = Vec::new();
        let n = ty.read_values(&mut seq, &mut out, values.len()).expect("split decode");
        assert_eq!(n, values.len(), "split at {at}");
        assert_eq!(out, expected, "split at {at}");
        assert!(seq.is_empty(), "split at {at}");
    }
}

#[test]
fn test_int32_all_splits() {
    assert_all_splits_agree(
        &Int32Type::new(),
        &[i32::MIN, -1, 0, 1, 42, i32::MAX, 0x0403_0201],
    );
}

#[test]
fn test_uint16_all_splits() {
    assert_all_splits_agree(&UInt16Type::new(), &[0, 1, 0xfffe, 0xffff, 0x1234]);
}

#[test]
fn test_float64_all_splits() {
    assert_all_splits_agree(&Float64Type::new(), &[0.0, -1.5, 1e300, -2.25]);
}

#[test]
fn test_bool_all_splits() {
    assert_all_splits_agree(&BoolType::new(), &[true, false, true, true, false]);
}

#[test]
fn test_date_all_splits() {
    let base = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");
    let values: Vec<chrono::NaiveDate> =
        (0..5).map(|i| base + chrono::Days::new(i * 1000)).collect();
    assert_all_splits_agree(&DateType::new(), &values);
    assert_all_splits_agree(&Date32Type::new(), &values);
}

#[test]
fn test_datetime_all_splits() {
    let values: Vec<chrono::DateTime<chrono::Utc>> = (0..4)
        .map(|i| chrono::DateTime::from_timestamp(1_600_000_000 + i * 61, 0).expect("valid"))
        .collect();
    assert_all_splits_agree(&DateTimeType::new(), &values);
    let with_subsec: Vec<chrono::DateTime<chrono::Utc>> = (0..4)
        .map(|i| {
            chrono::DateTime::from_timestamp(1_600_000_000 + i, (i as u32) * 250_000_000)
                .expect("valid")
        })
        .collect();
    assert_all_splits_agree(
        &DateTime64Type::new(3).expect("valid precision"),
        &with_subsec,
    );
}

#[test]
fn test_decimal_all_splits() {
    let values: Vec<rust_decimal::Decimal> = ["0", "123.45", "-9.99", "10000.01"]
        .iter()
        .map(|s| s.parse().expect("valid decimal"))
        .collect();
    assert_all_splits_agree(&Decimal64Type::new(18, 2).expect("valid params"), &values);
}

#[test]
fn test_uuid_all_splits() {
    let ids: Vec<uuid::Uuid> = (1u128..=4).map(uuid::Uuid::from_u128).collect();
    assert_all_splits_agree(&UuidType::new(), &ids);
}

#[test]
fn test_ip_all_splits() {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    let v4: Vec<IpAddr> = (1u32..=5).map(|i| IpAddr::V4(Ipv4Addr::from(i * 0x01020304))).collect();
    assert_all_splits_agree(&Ipv4Type::new(), &v4);
    let v6: Vec<IpAddr> = (1u128..=3).map(|i| IpAddr::V6(Ipv6Addr::from(i << 17))).collect();
    assert_all_splits_agree(&Ipv6Type::new(), &v6);
}

#[test]
fn test_string_all_splits() {
    let values = vec![
        Bytes::from_static(b"hello"),
        Bytes::new(),
        Bytes::from_static("🎉 party".as_bytes()),
        Bytes::from_static(&[0xff, 0x00, 0x80]),
        Bytes::from_static(b"tail"),
    ];
    assert_all_splits_agree(&StringType::new(), &values);
}

#[test]
fn test_long_string_prefix_all_splits() {
    // A 300-byte payload forces a two-byte varint prefix.
    let values = vec![Bytes::from(vec![b'x'; 300]), Bytes::from_static(b"end")];
    assert_all_splits_agree(&StringType::new(), &values);
}

#[test]
fn test_fixed_string_all_splits() {
    let ty = FixedStringType::new(6).expect("valid length");
    let values = vec![
        Bytes::from_static(b"abc"),
        Bytes::from_static(b"sixsix"),
        Bytes::new(),
    ];
    assert_all_splits_agree(&ty, &values);
}
