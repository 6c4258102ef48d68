//! chwire HTTP transport
//!
//! Implements [`chwire_core::Transport`] over the server's HTTP interface:
//! statements and insert bodies go out as POST requests, binary-format
//! response bodies come back verbatim for the codec to decode.
//!
//! The HTTP layer is hand-rolled over `tokio::net::TcpStream` and speaks
//! exactly the subset the server uses; there is no TLS, no keep-alive, no
//! redirect handling.
//!
//! # Example
//!
//! ```ignore
//! use chwire_core::Transport;
//! use chwire_http::{ClientOptions, HttpClient};
//!
//! let client = HttpClient::new(
//!     ClientOptions::new("localhost", 8123).credentials("default", ""),
//! );
//! client.execute_non_query("CREATE TABLE t (id Int32) ENGINE = Memory").await?;
//! client.send_data("INSERT INTO t FORMAT RowBinary", body).await?;
//! let bytes = client.query_data("SELECT id FROM t FORMAT RowBinary").await?;
//! ```

mod client;
mod http;

pub use client::{ClientOptions, HttpClient};
