//! Encode one block under both framings and hex-dump the results.

use chwire_core::formats::{native, row_binary};
use chwire_core::types::{Int32Type, StringType};
use chwire_core::{Block, ByteWriter, Column, ColumnDescriptor};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), chwire_core::CodecError> {
    let block = Block::new(
        vec![
            ColumnDescriptor::new("id", Int32Type::new()),
            ColumnDescriptor::new("value", StringType::new()),
        ],
        vec![
            Column::from(vec![1i32, 2, 3]),
            Column::from(vec!["a", "bb", ""]),
        ],
    )?;

    let mut w = ByteWriter::new();
    row_binary::write_block(&mut w, &block)?;
    println!("RowBinary ({} bytes):", w.position());
    println!("  {}", hex(w.as_slice()));

    let mut w = ByteWriter::new();
    native::write_block(&mut w, &block)?;
    println!("Native ({} bytes):", w.position());
    println!("  {}", hex(w.as_slice()));

    Ok(())
}
