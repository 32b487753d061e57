//! Columnar storage seams.
//!
//! The batch reader and writer never touch files directly; they talk to a
//! [`ColumnSource`] or [`ColumnSink`]. A source exposes its schema and row
//! group layout and hands out one column of one row group at a time. A sink
//! accepts complete row groups, one array per schema field, in schema order.
//!
//! [`parquet`] implements both traits over Parquet files. The in-memory store
//! in [`crate::testing`] implements them for tests.

use crate::error::Result;
use arrow::array::ArrayRef;
use arrow::datatypes::{Field, SchemaRef};
use std::collections::BTreeMap;

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
pub mod parquet;

/// Random access to the columns of a row-grouped store.
pub trait ColumnSource {
    /// Schema of the stored data.
    fn schema(&self) -> SchemaRef;

    /// Row count of each row group, in storage order.
    fn row_group_rows(&self) -> &[usize];

    fn row_group_count(&self) -> usize {
        self.row_group_rows().len()
    }

    fn num_rows(&self) -> usize {
        self.row_group_rows().iter().sum()
    }

    /// Read the column named by `field` from `row_group`.
    ///
    /// # Errors
    /// Implementations report storage and decoding failures, and
    /// [`MapperError::MissingColumn`](crate::MapperError::MissingColumn) when
    /// the store has no such column.
    fn read_column(&mut self, row_group: usize, field: &Field) -> Result<ArrayRef>;

    /// Footer key/value pairs, when the store has any.
    fn key_value_metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Append-only writer of row groups.
pub trait ColumnSink {
    /// Schema every row group must follow.
    fn schema(&self) -> SchemaRef;

    /// Append one row group. `columns` holds one array per schema field, in
    /// schema order, all of equal length.
    ///
    /// # Errors
    /// Implementations report storage and encoding failures.
    fn write_row_group(&mut self, columns: Vec<ArrayRef>) -> Result<()>;

    /// Flush and seal the store. No further row groups are accepted.
    ///
    /// # Errors
    /// Implementations report storage failures.
    fn finish(&mut self) -> Result<()>;
}

impl<S: ColumnSource + ?Sized> ColumnSource for &mut S {
    fn schema(&self) -> SchemaRef {
        (**self).schema()
    }

    fn row_group_rows(&self) -> &[usize] {
        (**self).row_group_rows()
    }

    fn read_column(&mut self, row_group: usize, field: &Field) -> Result<ArrayRef> {
        (**self).read_column(row_group, field)
    }

    fn key_value_metadata(&self) -> BTreeMap<String, String> {
        (**self).key_value_metadata()
    }
}

impl<S: ColumnSink + ?Sized> ColumnSink for &mut S {
    fn schema(&self) -> SchemaRef {
        (**self).schema()
    }

    fn write_row_group(&mut self, columns: Vec<ArrayRef>) -> Result<()> {
        (**self).write_row_group(columns)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
