//! Eagerly materialized row groups.

use crate::error::{MapperError, Result};
use arrow::datatypes::SchemaRef;
use std::collections::BTreeMap;

/// Every row group of a store, read up front and kept in storage order.
#[derive(Clone, Debug)]
pub struct RowGroups<T> {
    schema: SchemaRef,
    groups: Vec<Vec<T>>,
    key_value_metadata: BTreeMap<String, String>,
}

impl<T> RowGroups<T> {
    #[must_use]
    pub fn new(
        schema: SchemaRef,
        groups: Vec<Vec<T>>,
        key_value_metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            schema,
            groups,
            key_value_metadata,
        }
    }

    /// Schema of the store the rows were read from.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    #[must_use]
    pub fn key_value_metadata(&self) -> &BTreeMap<String, String> {
        &self.key_value_metadata
    }

    #[must_use]
    pub fn row_group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Rows of row group `index`.
    ///
    /// # Errors
    /// [`MapperError::RowGroupRange`] if `index` is past the last row group.
    pub fn row_group(&self, index: usize) -> Result<&[T]> {
        self.groups
            .get(index)
            .map(Vec::as_slice)
            .ok_or(MapperError::RowGroupRange {
                index,
                count: self.groups.len(),
            })
    }

    /// Row groups in order.
    pub fn iter(&self) -> impl Iterator<Item = &[T]> {
        self.groups.iter().map(Vec::as_slice)
    }

    /// All rows, flattened in storage order.
    #[must_use]
    pub fn into_rows(self) -> Vec<T> {
        self.groups.into_iter().flatten().collect()
    }

    #[must_use]
    pub fn into_row_groups(self) -> Vec<Vec<T>> {
        self.groups
    }
}
