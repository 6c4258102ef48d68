//! Column-wise block container.
//!
//! A [`Block`] pairs an ordered list of `(name, handler)` descriptors with
//! one typed [`Column`] per descriptor and a row count. Construction
//! validates the shape once; a built block is immutable for the duration of
//! a serialize pass.

use std::collections::HashSet;

use crate::error::{CodecError, Result};
use crate::types::Handler;
use crate::value::Column;

/// Name and wire type of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name, unique within its block.
    pub name: String,
    /// Wire type handler.
    pub handler: Handler,
}

impl ColumnDescriptor {
    /// Descriptor for `name` encoded by `handler`.
    pub fn new(name: impl Into<String>, handler: impl Into<Handler>) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
        }
    }
}

/// Immutable column-wise container of typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    descriptors: Vec<ColumnDescriptor>,
    columns: Vec<Column>,
    rows: usize,
}

impl Block {
    /// Build a block, validating that every column has the same length,
    /// matches its handler's storage kind, and that names are unique.
    pub fn new(descriptors: Vec<ColumnDescriptor>, columns: Vec<Column>) -> Result<Self> {
        if descriptors.len() != columns.len() {
            return Err(CodecError::schema(format!(
                "{} descriptors for {} columns",
                descriptors.len(),
                columns.len()
            )));
        }
        let rows = columns.first().map_or(0, Column::len);
        let mut names = HashSet::new();
        for (descriptor, column) in descriptors.iter().zip(&columns) {
            if column.len() != rows {
                return Err(CodecError::schema(format!(
                    "column '{}' has {} rows, expected {rows}",
                    descriptor.name,
                    column.len()
                )));
            }
            let expected = descriptor.handler.new_column(0);
            if std::mem::discriminant(&expected) != std::mem::discriminant(column) {
                return Err(CodecError::schema(format!(
                    "column '{}' stores {} values but its handler is {}",
                    descriptor.name,
                    column.kind(),
                    descriptor.handler.type_name()
                )));
            }
            if !names.insert(descriptor.name.as_str()) {
                return Err(CodecError::schema(format!(
                    "duplicate column name '{}'",
                    descriptor.name
                )));
            }
        }
        Ok(Self {
            descriptors,
            columns,
            rows,
        })
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Descriptor of column `index`.
    pub fn descriptor(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.descriptors.get(index)
    }

    /// Values of column `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// All descriptors in column order.
    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    /// All columns in descriptor order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Int32Type, StringType};
    use pretty_assertions::assert_eq;

    fn two_column_block() -> Block {
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
    fn test_accessors() {
        let block = two_column_block();
        assert_eq!(block.column_count(), 2);
        assert_eq!(block.row_count(), 3);
        assert_eq!(block.descriptor(0).map(|d| d.name.as_str()), Some("id"));
        assert_eq!(block.column(1).map(Column::len), Some(3));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Block::new(
            vec![
                ColumnDescriptor::new("a", Int32Type::new()),
                ColumnDescriptor::new("b", Int32Type::new()),
            ],
            vec![Column::from(vec![1i32]), Column::from(vec![1i32, 2])],
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Block::new(
            vec![
                ColumnDescriptor::new("a", Int32Type::new()),
                ColumnDescriptor::new("a", Int32Type::new()),
            ],
            vec![Column::from(vec![1i32]), Column::from(vec![2i32])],
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn test_storage_kind_must_match_handler() {
        let err = Block::new(
            vec![ColumnDescriptor::new("a", Int32Type::new())],
            vec![Column::from(vec!["not an int"])],
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn test_zero_columns_is_empty_block() {
        let block = Block::new(Vec::new(), Vec::new()).expect("valid block");
        assert_eq!(block.column_count(), 0);
        assert_eq!(block.row_count(), 0);
    }
}
