//! RowBinary framing.
//!
//! No header: for each row, each column's value payload in column order.
//! Reading needs the column descriptors and the expected row count from the
//! caller, since nothing on the wire carries them.

use crate::block::{Block, ColumnDescriptor};
use crate::error::{CodecError, Result};
use crate::io::{ByteSequence, ByteWriter};
use crate::value::Column;

/// Encode `block` row-major.
pub fn write_block(w: &mut ByteWriter, block: &Block) -> Result<()> {
    tracing::trace!(
        columns = block.column_count(),
        rows = block.row_count(),
        "encoding RowBinary block"
    );
    for row in 0..block.row_count() {
        for (descriptor, column) in block.descriptors().iter().zip(block.columns()) {
            let value = column
                .value_at(row)
                .ok_or_else(|| CodecError::schema(format!("row {row} out of bounds")))?;
            descriptor.handler.write_value(w, &value)?;
        }
    }
    Ok(())
}

/// Decode `rows` rows of the described columns, row-major.
pub fn read_block(
    seq: &mut ByteSequence,
    descriptors: &[ColumnDescriptor],
    rows: usize,
) -> Result<Block> {
    let mut columns: Vec<Column> = descriptors
        .iter()
        .map(|d| d.handler.new_column(rows.min(seq.len())))
        .collect();
    for _ in 0..rows {
        for (descriptor, column) in descriptors.iter().zip(columns.iter_mut()) {
            let value = descriptor.handler.read_value(seq)?;
            column.push_value(value)?;
        }
    }
    Block::new(descriptors.to_vec(), columns)
}
