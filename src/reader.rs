//! Batch reader: row groups in, record batches out.
//!
//! [`BatchReader::read_all`] matches the source schema against `T` up front
//! and returns [`RowGroupBatches`], a forward-only iterator yielding one
//! `Vec<T>` per row group. Records are decoded into a single reusable buffer
//! sized to the largest row group; each yielded batch is a fresh copy of the
//! filled prefix.

use crate::binding::Record;
use crate::cancel::CancellationToken;
use crate::config::NullableBinding;
use crate::error::{MapperError, Result};
use crate::io::ColumnSource;
use crate::metadata::{MetadataRegistry, TypeMetadata};
use crate::value::Value;
use arrow::datatypes::SchemaRef;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Opens row-group streams of `T` over any [`ColumnSource`].
#[derive(Debug, Clone)]
pub struct BatchReader {
    registry: Arc<MetadataRegistry>,
    nullable: NullableBinding,
    cancel: CancellationToken,
}

impl BatchReader {
    #[must_use]
    pub fn new(registry: Arc<MetadataRegistry>, nullable: NullableBinding) -> Self {
        Self {
            registry,
            nullable,
            cancel: CancellationToken::default(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Start streaming `source` as batches of `T`.
    ///
    /// # Errors
    /// Fails with [`MapperError::SchemaIncompatible`] (or another matching
    /// error) before anything is read.
    pub fn read_all<T: Record, S: ColumnSource>(&self, source: S) -> Result<RowGroupBatches<T, S>> {
        let schema = source.schema();
        let metadata = self.registry.get_or_create::<T>(Some(&schema), self.nullable)?;
        Ok(RowGroupBatches::new(source, metadata, self.cancel.clone()))
    }
}

/// Lazy sequence of row-group batches. Not restartable.
///
/// After the first error the iterator is exhausted. Batches yielded before
/// the error remain valid.
pub struct RowGroupBatches<T: Record, S> {
    source: S,
    metadata: Arc<TypeMetadata<T>>,
    row_group_rows: Vec<usize>,
    next: usize,
    buffer: Option<Vec<T>>,
    cancel: CancellationToken,
}

impl<T: Record, S: ColumnSource> RowGroupBatches<T, S> {
    fn new(source: S, metadata: Arc<TypeMetadata<T>>, cancel: CancellationToken) -> Self {
        let row_group_rows = source.row_group_rows().to_vec();
        let capacity = row_group_rows.iter().copied().max().unwrap_or(0);
        debug!(
            "reading {} row groups of {} (buffer of {capacity} rows)",
            row_group_rows.len(),
            metadata.type_tag()
        );
        Self {
            source,
            metadata,
            row_group_rows,
            next: 0,
            buffer: Some(vec![T::default(); capacity]),
            cancel,
        }
    }

    /// Schema of the underlying source.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.source.schema()
    }

    #[must_use]
    pub fn metadata(&self) -> &Arc<TypeMetadata<T>> {
        &self.metadata
    }

    #[must_use]
    pub fn row_group_count(&self) -> usize {
        self.row_group_rows.len()
    }

    #[must_use]
    pub fn row_group_rows(&self) -> &[usize] {
        &self.row_group_rows
    }

    #[must_use]
    pub fn key_value_metadata(&self) -> BTreeMap<String, String> {
        self.source.key_value_metadata()
    }

    /// Whether the reusable buffer is still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.buffer.is_some()
    }

    fn fill(&mut self, index: usize) -> Result<usize> {
        let rows = self.row_group_rows[index];
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(0);
        };

        for binding in self.metadata.bindings() {
            let field = binding.field();
            let column = self.source.read_column(index, field)?;
            if column.len() != rows {
                return Err(MapperError::ColumnLength {
                    field: field.name().clone(),
                    row_group: index,
                    expected: rows,
                    actual: column.len(),
                });
            }

            let set = binding.setter();
            for (row, slot) in buffer[..rows].iter_mut().enumerate() {
                Value::from_array(&column, row)
                    .and_then(|value| set(slot, value))
                    .map_err(|source| MapperError::Conversion {
                        field: field.name().clone(),
                        source,
                    })?;
            }
        }
        Ok(rows)
    }

    fn release(&mut self) {
        self.buffer = None;
    }
}

impl<T: Record, S: ColumnSource> Iterator for RowGroupBatches<T, S> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.as_ref()?;

        let index = self.next;
        if index >= self.row_group_rows.len() {
            self.release();
            info!(
                "read {} row groups of {}",
                self.row_group_rows.len(),
                self.metadata.type_tag()
            );
            return None;
        }

        if self.cancel.is_cancelled() {
            warn!("read of {} cancelled before row group {index}", self.metadata.type_tag());
            self.release();
            return Some(Err(MapperError::Cancelled));
        }

        match self.fill(index) {
            Ok(rows) => {
                self.next += 1;
                let batch = self.buffer.as_ref().map(|b| b[..rows].to_vec()).unwrap_or_default();
                debug!("read row group {index} ({rows} rows)");
                Some(Ok(batch))
            }
            Err(source) => {
                warn!("row group {index} of {} failed: {source}", self.metadata.type_tag());
                self.release();
                Some(Err(MapperError::RowGroupRead {
                    index,
                    source: Box::new(source),
                }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.buffer.is_none() {
            return (0, Some(0));
        }
        (0, Some(self.row_group_rows.len() - self.next))
    }
}
