//! Block-level framings: row-oriented `RowBinary` and column-oriented
//! `Native`.

pub mod native;
pub mod row_binary;
