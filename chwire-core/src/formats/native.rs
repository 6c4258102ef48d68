//! Native (column-oriented) framing.
//!
//! Header: `varint(column_count) varint(row_count)`; then per column:
//! `varint(name_len) name varint(type_name_len) type_name` followed by the
//! column's values as one contiguous bulk payload. Reading resolves each
//! declared type name through the registry (constructing parametric
//! handlers from the tuple-form grammar) and bulk-decodes exactly
//! `row_count` values per column.

use bytes::Bytes;

use crate::block::{Block, ColumnDescriptor};
use crate::error::{CodecError, Result};
use crate::io::{read_varint, write_varint, ByteSequence, ByteWriter};
use crate::registry;

fn write_framed_str(w: &mut ByteWriter, s: &str) {
    write_varint(w, s.len() as u64);
    w.put_slice(s.as_bytes());
}

fn read_framed_string(seq: &mut ByteSequence, what: &str) -> Result<String> {
    let len = read_varint(seq)? as usize;
    let raw: Bytes = seq.read_bytes(len)?;
    String::from_utf8(raw.to_vec())
        .map_err(|_| CodecError::schema(format!("{what} is not valid UTF-8")))
}

/// Encode `block` column-major with the Native header.
pub fn write_block(w: &mut ByteWriter, block: &Block) -> Result<()> {
    tracing::trace!(
        columns = block.column_count(),
        rows = block.row_count(),
        "encoding Native block"
    );
    write_varint(w, block.column_count() as u64);
    write_varint(w, block.row_count() as u64);
    for (descriptor, column) in block.descriptors().iter().zip(block.columns()) {
        write_framed_str(w, &descriptor.name);
        write_framed_str(w, &descriptor.handler.type_name());
        descriptor.handler.write_column(w, column)?;
    }
    Ok(())
}

/// Decode one Native block, resolving handlers from the declared type
/// names.
pub fn read_block(seq: &mut ByteSequence) -> Result<Block> {
    let column_count = read_varint(seq)? as usize;
    let row_count = read_varint(seq)? as usize;
    let mut descriptors = Vec::with_capacity(column_count.min(seq.len()));
    let mut columns = Vec::with_capacity(column_count.min(seq.len()));
    for _ in 0..column_count {
        let name = read_framed_string(seq, "column name")?;
        let type_name = read_framed_string(seq, "type name")?;
        let handler = registry::parse_type_name(&type_name)?;
        let column = handler.read_column(seq, row_count)?;
        descriptors.push(ColumnDescriptor::new(name, handler));
        columns.push(column);
    }
    Block::new(descriptors, columns)
}

/// Decode one Native block and verify it against the expected descriptors
/// (same column count, names, and type names, in order).
pub fn read_block_with(
    seq: &mut ByteSequence,
    expected: &[ColumnDescriptor],
) -> Result<Block> {
    let block = read_block(seq)?;
    if block.column_count() != expected.len() {
        return Err(CodecError::schema(format!(
            "block has {} columns, expected {}",
            block.column_count(),
            expected.len()
        )));
    }
    for (got, want) in block.descriptors().iter().zip(expected) {
        if got.name != want.name {
            return Err(CodecError::schema(format!(
                "column '{}' where '{}' was expected",
                got.name, want.name
            )));
        }
        if got.handler.type_name() != want.handler.type_name() {
            return Err(CodecError::schema(format!(
                "column '{}' is {}, expected {}",
                got.name,
                got.handler.type_name(),
                want.handler.type_name()
            )));
        }
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Int32Type, StringType};
    use crate::value::Column;
    use pretty_assertions::assert_eq;

    fn id_value_block() -> Block {
        Block::new(
            vec![
                ColumnDescriptor::new("id", Int32Type::new()),
                ColumnDescriptor::new("value", StringType::new()),
            ],
            vec![
                Column::from(vec![1i32, 2, 3]),
                Column::from(vec!["a", "bb", ""]),
            ],
        )
        .expect("valid block")
    }

    #[test]
    fn test_wire_layout_vector() {
        let mut w = ByteWriter::new();
        write_block(&mut w, &id_value_block()).expect("write");
        let mut expected: Vec<u8> = vec![0x02, 0x03]; // 2 columns, 3 rows
        expected.extend_from_slice(b"\x02id\x05Int32"); // column 1 header
        expected.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
        expected.extend_from_slice(b"\x05value\x06String"); // column 2 header
        expected.extend_from_slice(b"\x01a\x02bb\x00");
        assert_eq!(w.as_slice(), &expected[..]);
    }

    #[test]
    fn test_round_trip_resolves_handlers_from_names() {
        let block = id_value_block();
        let mut w = ByteWriter::new();
        write_block(&mut w, &block).expect("write");
        let mut seq = ByteSequence::from(w.finish());
        let back = read_block(&mut seq).expect("read");
        assert_eq!(back, block);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_read_block_with_checks_schema() {
        let block = id_value_block();
        let mut w = ByteWriter::new();
        write_block(&mut w, &block).expect("write");
        let encoded = w.finish();

        let mut seq = ByteSequence::from(encoded.clone());
        read_block_with(&mut seq, block.descriptors()).expect("matching schema");

        let wrong_name = vec![
            ColumnDescriptor::new("key", Int32Type::new()),
            ColumnDescriptor::new("value", StringType::new()),
        ];
        let mut seq = ByteSequence::from(encoded.clone());
        assert!(matches!(
            read_block_with(&mut seq, &wrong_name),
            Err(CodecError::SchemaMismatch(_))
        ));

        let wrong_count = vec![ColumnDescriptor::new("id", Int32Type::new())];
        let mut seq = ByteSequence::from(encoded);
        assert!(matches!(
            read_block_with(&mut seq, &wrong_count),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_type_name_surfaces() {
        // Header declares a type the registry cannot resolve.
        let mut w = ByteWriter::new();
        write_varint(&mut w, 1);
        write_varint(&mut w, 0);
        write_framed_str(&mut w, "c");
        write_framed_str(&mut w, "Array(Int32)");
        let mut seq = ByteSequence::from(w.finish());
        assert!(matches!(
            read_block(&mut seq),
            Err(CodecError::UnknownType(_))
        ));
    }

    #[test]
    fn test_empty_block_round_trips() {
        let block = Block::new(Vec::new(), Vec::new()).expect("valid block");
        let mut w = ByteWriter::new();
        write_block(&mut w, &block).expect("write");
        assert_eq!(w.as_slice(), &[0x00, 0x00]);
        let mut seq = ByteSequence::from(w.finish());
        let back = read_block(&mut seq).expect("read");
        assert_eq!(back.column_count(), 0);
    }
}
