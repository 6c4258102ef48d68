//! Error types for the chwire codec.

use thiserror::Error;

/// The main error type for codec operations.
///
/// Every variant carries enough context to locate the offending element:
/// the expected and actual byte counts, the wire type name, or the parameter
/// that failed validation. Bulk operations that fail mid-way leave their
/// destination holding the elements decoded before the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a fixed-size read or a declared payload completed.
    #[error("input underrun: needed {needed} bytes, {available} available")]
    Underrun { needed: usize, available: usize },

    /// A varint ran past 10 bytes without a terminating byte.
    #[error("malformed varint: no terminator within 10 bytes")]
    MalformedVarint,

    /// A value cannot be represented on the wire for its declared type.
    #[error("overflow encoding {type_name}: {detail}")]
    Overflow { type_name: String, detail: String },

    /// An IPv4 handler was given an IPv6 address, or vice versa.
    #[error("wrong address family: {type_name} cannot carry {got}")]
    WrongAddressFamily {
        type_name: &'static str,
        got: &'static str,
    },

    /// No handler is registered under the given protocol code or type name.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Block contents disagree with the provided column descriptors.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A construction-time parameter is outside its allowed range.
    #[error("invalid parameter {parameter} for {type_name}: {detail}")]
    InvalidParameter {
        type_name: &'static str,
        parameter: &'static str,
        detail: String,
    },
}

impl CodecError {
    /// Create an underrun error from an expected/actual byte count pair.
    pub fn underrun(needed: usize, available: usize) -> Self {
        Self::Underrun { needed, available }
    }

    /// Create an overflow error for the given wire type.
    pub fn overflow(type_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Overflow {
            type_name: type_name.into(),
            detail: detail.into(),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::SchemaMismatch(detail.into())
    }

    /// Create an invalid-parameter error.
    pub fn parameter(
        type_name: &'static str,
        parameter: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            type_name,
            parameter,
            detail: detail.into(),
        }
    }
}

/// Result alias used across the codec.
pub type Result<T> = std::result::Result<T, CodecError>;
