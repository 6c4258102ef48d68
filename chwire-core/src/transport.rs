//! Abstract transport consumed by callers that move codec bytes.
//!
//! The codec itself never does I/O; a transport carries encoded bodies to
//! the server and brings response bodies back. `chwire-http` provides the
//! production implementation; tests use in-memory fixtures.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::error::CodecError;

/// Failures surfaced by a transport. Codec errors pass through unmodified.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach or talk to the server.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with an error status or error text.
    #[error("server error: {0}")]
    Server(String),

    /// Underlying socket failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A codec failure re-emitted unmodified.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// The operations a transport offers the codec's callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a DDL or administrative statement, surfacing failure.
    async fn execute_non_query(&self, sql: &str) -> TransportResult<()>;

    /// POST `sql_prefix` (an `INSERT ... FORMAT <fmt>` statement) with
    /// `data` as the request body.
    async fn send_data(&self, sql_prefix: &str, data: Bytes) -> TransportResult<()>;

    /// Run a query ending in `FORMAT <fmt>` and return the raw response
    /// body.
    async fn query_data(&self, sql: &str) -> TransportResult<Bytes>;

    /// Run a query in a textual format and return the response body as
    /// text (used for scalar assertions).
    async fn execute_query(&self, sql: &str) -> TransportResult<String>;
}
