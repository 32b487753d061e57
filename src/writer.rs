//! Batch writer: records in, row groups out.
//!
//! [`BatchWriter::write_all`] buffers up to `batch_size` records, turns the
//! buffer into one Arrow array per sink field and hands the row group to a
//! [`ColumnSink`]. Row groups reach the sink strictly in input order, and one
//! is fully written before the next is built.

use crate::binding::Record;
use crate::cancel::CancellationToken;
use crate::error::{MapperError, Result};
use crate::io::ColumnSink;
use crate::metadata::TypeMetadata;
use crate::schema::FieldBinding;
use crate::value::build_column;
use arrow::array::ArrayRef;
use arrow::datatypes::FieldRef;
use log::{debug, info, warn};
#[cfg(feature = "parallel-io")]
use rayon::prelude::*;
use std::sync::Arc;

/// What a completed write produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Total rows written.
    pub rows: usize,
    /// Row count of each emitted row group, in order.
    pub row_groups: Vec<usize>,
}

/// Streams records of `T` into a [`ColumnSink`].
#[derive(Debug)]
pub struct BatchWriter<T: Record> {
    metadata: Arc<TypeMetadata<T>>,
    batch_size: usize,
    cancel: CancellationToken,
}

impl<T: Record> BatchWriter<T> {
    /// A writer emitting row groups of at most `batch_size` rows. Zero is
    /// treated as one.
    #[must_use]
    pub fn new(metadata: Arc<TypeMetadata<T>>, batch_size: usize) -> Self {
        Self {
            metadata,
            batch_size: batch_size.max(1),
            cancel: CancellationToken::default(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn metadata(&self) -> &Arc<TypeMetadata<T>> {
        &self.metadata
    }

    /// Write every record of `rows` and finish the sink.
    ///
    /// Every sink field must carry a bound field of the writer's metadata,
    /// matched by name and type. Columns are emitted in sink-schema order.
    ///
    /// # Errors
    /// - [`MapperError::SchemaIncompatible`] if the sink schema and the bound schema differ.
    /// - [`MapperError::NullValue`] for a null in a non-nullable field.
    /// - [`MapperError::Cancelled`] if cancellation is observed before a row-group write,
    ///   or after one that more input follows. The sink is not finished.
    /// - Any sink error. Row groups already written stay written.
    pub fn write_all<I, S>(&self, rows: I, sink: &mut S) -> Result<WriteSummary>
    where
        I: IntoIterator<Item = T>,
        S: ColumnSink + ?Sized,
    {
        let plan = self.plan_columns(sink)?;

        let mut summary = WriteSummary::default();
        let mut rows = rows.into_iter().peekable();
        let mut buffer = Vec::new();
        loop {
            buffer.extend(rows.by_ref().take(self.batch_size));
            if buffer.is_empty() {
                break;
            }
            let index = summary.row_groups.len();
            self.check_cancelled(index)?;
            self.emit(&plan, &buffer, sink, &mut summary)?;
            buffer.clear();
            if rows.peek().is_some() {
                self.check_cancelled(index + 1)?;
            }
        }
        sink.finish()?;

        info!(
            "wrote {} rows of {} in {} row groups",
            summary.rows,
            self.metadata.type_tag(),
            summary.row_groups.len()
        );
        Ok(summary)
    }

    fn emit<S: ColumnSink + ?Sized>(
        &self,
        plan: &[Column<'_, T>],
        rows: &[T],
        sink: &mut S,
        summary: &mut WriteSummary,
    ) -> Result<()> {
        let index = summary.row_groups.len();
        let columns = build_columns(plan, rows)?;
        sink.write_row_group(columns)?;
        summary.rows += rows.len();
        summary.row_groups.push(rows.len());
        debug!("emitted row group {index} ({} rows)", rows.len());
        Ok(())
    }

    fn check_cancelled(&self, row_group: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!("write of {} cancelled at row group {row_group}", self.metadata.type_tag());
            return Err(MapperError::Cancelled);
        }
        Ok(())
    }

    /// Pair each sink field with the binding that feeds it.
    fn plan_columns<S: ColumnSink + ?Sized>(&self, sink: &S) -> Result<Vec<Column<'_, T>>> {
        let schema = sink.schema();
        let bindings = self.metadata.bindings();

        let mut plan = Vec::with_capacity(schema.fields().len());
        let mut unbound = Vec::new();
        for field in schema.fields() {
            match bindings
                .iter()
                .find(|b| b.field().name() == field.name() && b.field().data_type() == field.data_type())
            {
                Some(binding) => plan.push(Column {
                    field: Arc::clone(field),
                    binding,
                }),
                None => unbound.push(field.name().clone()),
            }
        }
        let absent = bindings
            .iter()
            .filter(|b| !plan.iter().any(|c| c.field.name() == b.field().name()))
            .map(|b| b.property().name().to_string());

        let missing: Vec<String> = absent.chain(unbound).collect();
        if missing.is_empty() {
            return Ok(plan);
        }
        Err(MapperError::SchemaIncompatible {
            schema,
            type_name: T::binding().type_name(),
            missing,
        })
    }
}

/// A sink field and the binding whose getter fills it.
struct Column<'a, T: 'static> {
    field: FieldRef,
    binding: &'a FieldBinding<T>,
}

#[cfg(feature = "parallel-io")]
fn build_columns<T: Sync + 'static>(plan: &[Column<'_, T>], rows: &[T]) -> Result<Vec<ArrayRef>> {
    plan.par_iter().map(|c| column_of(c, rows)).collect()
}

#[cfg(not(feature = "parallel-io"))]
fn build_columns<T: 'static>(plan: &[Column<'_, T>], rows: &[T]) -> Result<Vec<ArrayRef>> {
    plan.iter().map(|c| column_of(c, rows)).collect()
}

fn column_of<T: 'static>(column: &Column<'_, T>, rows: &[T]) -> Result<ArrayRef> {
    let field = &column.field;
    let get = column.binding.getter();
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let value = get(row);
        if value.is_null() && !field.is_nullable() {
            return Err(MapperError::NullValue {
                field: field.name().clone(),
            });
        }
        values.push(value);
    }
    build_column(field.data_type(), values).map_err(|source| MapperError::Conversion {
        field: field.name().clone(),
        source,
    })
}
