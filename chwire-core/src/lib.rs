//! chwire core codec
//!
//! SIMD-accelerated serialization for ClickHouse's RowBinary and Native
//! wire formats: typed scalar values and column blocks to and from byte
//! streams, bit-compatible with the server.
//!
//! # Architecture
//!
//! This crate is the pure layer: no async, no I/O, no tokio. Values in,
//! bytes out.
//!
//! - [`io`] - segmented input reader, append-only span writer, varints
//! - [`simd`] - capability probe and the tiered bulk kernels
//! - [`types`] - one handler per wire type, single-value and bulk codecs
//! - [`registry`] - protocol code / type name to handler resolution
//! - [`block`] + [`formats`] - column blocks and the two framings
//! - [`transport`] - the async interface an I/O layer implements
//!
//! Handlers pick the widest available vector tier whose minimum batch
//! length is met and degrade tier by tier down to scalar code, so every
//! tier produces byte-identical output; constrained probes
//! ([`SimdCaps::capped`]) force narrower paths for tests and benchmarks.
//!
//! # Example
//!
//! ```
//! use chwire_core::{formats, Block, ByteSequence, ByteWriter, Column, ColumnDescriptor};
//! use chwire_core::types::{Int32Type, StringType};
//!
//! let block = Block::new(
//!     vec![
//!         ColumnDescriptor::new("id", Int32Type::new()),
//!         ColumnDescriptor::new("value", StringType::new()),
//!     ],
//!     vec![Column::from(vec![1i32, 2, 3]), Column::from(vec!["a", "bb", ""])],
//! )?;
//!
//! let mut w = ByteWriter::new();
//! formats::native::write_block(&mut w, &block)?;
//!
//! let mut seq = ByteSequence::from(w.finish());
//! let back = formats::native::read_block(&mut seq)?;
//! assert_eq!(back, block);
//! # Ok::<(), chwire_core::CodecError>(())
//! ```

pub mod block;
pub mod error;
pub mod formats;
pub mod io;
pub mod registry;
pub mod simd;
pub mod transport;
pub mod types;
pub mod value;

pub use block::{Block, ColumnDescriptor};
pub use error::{CodecError, Result};
pub use io::{ByteSequence, ByteWriter};
pub use simd::{SimdCaps, SimdTier};
pub use transport::{Transport, TransportError, TransportResult};
pub use types::Handler;
pub use value::{Column, Value};
