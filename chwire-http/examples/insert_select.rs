//! Round-trip a block through a running server.
//!
//! Expects a server on localhost:8123 with default credentials:
//! `cargo run --example insert_select`

use chwire_core::formats::row_binary;
use chwire_core::types::{Int32Type, StringType};
use chwire_core::{Block, ByteSequence, ByteWriter, Column, ColumnDescriptor, Transport};
use chwire_http::{ClientOptions, HttpClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpClient::new(ClientOptions::new("localhost", 8123));

    client
        .execute_non_query("CREATE TABLE IF NOT EXISTS chwire_demo (id Int32, value String) ENGINE = Memory")
        .await?;

    let descriptors = vec![
        ColumnDescriptor::new("id", Int32Type::new()),
        ColumnDescriptor::new("value", StringType::new()),
    ];
    let block = Block::new(
        descriptors.clone(),
        vec![
            Column::from(vec![3i32, 1, 2]),
            Column::from(vec!["c", "a", "b"]),
        ],
    )?;

    let mut w = ByteWriter::new();
    row_binary::write_block(&mut w, &block)?;
    client
        .send_data("INSERT INTO chwire_demo FORMAT RowBinary", w.finish())
        .await?;

    let body = client
        .query_data("SELECT id, value FROM chwire_demo ORDER BY id FORMAT RowBinary")
        .await?;
    let mut seq = ByteSequence::from(body);
    let sorted = row_binary::read_block(&mut seq, &descriptors, block.row_count())?;
    for row in 0..sorted.row_count() {
        let id = sorted.column(0).and_then(|c| c.value_at(row));
        let value = sorted.column(1).and_then(|c| c.value_at(row));
        println!("{id:?} {value:?}");
    }

    client.execute_non_query("DROP TABLE chwire_demo").await?;
    Ok(())
}
