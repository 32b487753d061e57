//! The [`Mapper`] facade.
//!
//! A `Mapper` bundles a [`MapperConfig`] with a shared [`MetadataRegistry`]
//! and exposes the whole surface of the crate: schema construction, schema
//! comparison, and streaming reads and writes over any column store, with
//! Parquet shortcuts when the `io-parquet` feature is on.
//!
//! ```
//! use ironbind::{bind_record, Mapper, MapperConfig};
//! use ironbind::testing::MemoryStore;
//! # fn main() -> anyhow::Result<()> {
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Reading { sensor: String, value: f64 }
//! bind_record! { Reading { sensor: String, value: f64 } }
//!
//! let mapper = Mapper::new(MapperConfig::new().with_batch_size(2));
//! let schema = mapper.create_schema::<Reading>()?;
//! let mut store = MemoryStore::new(schema.into());
//!
//! let rows = vec![
//!     Reading { sensor: "a".into(), value: 1.0 },
//!     Reading { sensor: "b".into(), value: 2.0 },
//!     Reading { sensor: "c".into(), value: 3.0 },
//! ];
//! let summary = mapper.write_rows(rows.clone(), &mut store, &Default::default())?;
//! assert_eq!(summary.row_groups, vec![2, 1]);
//!
//! let back: Vec<Reading> = mapper
//!     .read_batches::<Reading, _>(&mut store, &Default::default())?
//!     .collect::<Result<Vec<_>, _>>()?
//!     .concat();
//! assert_eq!(back, rows);
//! # Ok(())
//! # }
//! ```

use crate::binding::Record;
use crate::cancel::CancellationToken;
use crate::config::MapperConfig;
use crate::data::RowGroups;
use crate::error::Result;
use crate::io::{ColumnSink, ColumnSource};
use crate::metadata::{MetadataRegistry, TypeMetadata};
use crate::reader::{BatchReader, RowGroupBatches};
use crate::schema::{self, SchemaMatch};
use crate::writer::{BatchWriter, WriteSummary};
use arrow::datatypes::{Schema, SchemaRef};
use std::sync::Arc;

#[cfg(feature = "io-parquet")]
use crate::io::parquet::{ParquetSink, ParquetSource};
#[cfg(feature = "io-parquet")]
use std::path::Path;

/// Entry point for binding records to columnar stores.
#[derive(Clone, Debug, Default)]
pub struct Mapper {
    config: MapperConfig,
    registry: Arc<MetadataRegistry>,
}

impl Mapper {
    /// A mapper with its own, empty registry.
    #[must_use]
    pub fn new(config: MapperConfig) -> Self {
        Self::with_registry(config, Arc::new(MetadataRegistry::new()))
    }

    /// A mapper sharing `registry` with other mappers.
    #[must_use]
    pub fn with_registry(config: MapperConfig, registry: Arc<MetadataRegistry>) -> Self {
        Self { config, registry }
    }

    #[must_use]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Schema derived from `T`.
    ///
    /// # Errors
    /// See [`schema::build_schema`].
    pub fn create_schema<T: Record>(&self) -> Result<Schema> {
        schema::build_schema::<T>()
    }

    /// Bind `T` to `schema` under the configured nullable policy.
    ///
    /// # Errors
    /// See [`schema::match_schema`].
    pub fn compare_schema<T: Record>(&self, schema: &SchemaRef) -> Result<SchemaMatch<T>> {
        schema::match_schema::<T>(schema, self.config.nullable)
    }

    #[must_use]
    pub fn is_schema_compatible<T: Record>(&self, schema: &SchemaRef) -> bool {
        schema::is_schema_compatible::<T>(schema, self.config.nullable)
    }

    /// Cached metadata of `T` for `schema`, or for its own schema when `None`.
    ///
    /// # Errors
    /// Propagates matching errors.
    pub fn metadata<T: Record>(&self, schema: Option<&SchemaRef>) -> Result<Arc<TypeMetadata<T>>> {
        self.registry.get_or_create::<T>(schema, self.config.nullable)
    }

    /// Stream `rows` into `sink` in row groups of the configured size.
    ///
    /// `T` is matched against the sink's schema, which must consist of
    /// exactly the fields `T` binds.
    ///
    /// # Errors
    /// See [`BatchWriter::write_all`].
    pub fn write_rows<T, I, S>(&self, rows: I, sink: &mut S, cancel: &CancellationToken) -> Result<WriteSummary>
    where
        T: Record,
        I: IntoIterator<Item = T>,
        S: ColumnSink + ?Sized,
    {
        let metadata = self.metadata::<T>(Some(&sink.schema()))?;
        BatchWriter::new(metadata, self.config.batch_size)
            .with_cancellation(cancel.clone())
            .write_all(rows, sink)
    }

    /// Stream batches of `T` out of `source`.
    ///
    /// # Errors
    /// Fails before reading if the source schema cannot carry `T`.
    pub fn read_batches<T: Record, S: ColumnSource>(
        &self,
        source: S,
        cancel: &CancellationToken,
    ) -> Result<RowGroupBatches<T, S>> {
        BatchReader::new(Arc::clone(&self.registry), self.config.nullable)
            .with_cancellation(cancel.clone())
            .read_all(source)
    }

    /// Read every row group of `source` eagerly.
    ///
    /// # Errors
    /// The first matching or row-group error.
    pub fn read_row_groups<T: Record, S: ColumnSource>(&self, source: S) -> Result<RowGroups<T>> {
        let batches = self.read_batches::<T, S>(source, &CancellationToken::default())?;
        let schema = batches.schema();
        let key_value_metadata = batches.key_value_metadata();
        let groups = batches.collect::<Result<Vec<_>>>()?;
        Ok(RowGroups::new(schema, groups, key_value_metadata))
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
impl Mapper {
    /// Write `rows` to a Parquet file at `path` with the configured settings.
    ///
    /// # Errors
    /// See [`Mapper::write_parquet_file_with`].
    pub fn write_parquet_file<T, I>(&self, rows: I, path: impl AsRef<Path>) -> Result<WriteSummary>
    where
        T: Record,
        I: IntoIterator<Item = T>,
    {
        self.write_parquet_file_with(rows, path, self.config.batch_size, &CancellationToken::default())
    }

    /// Write `rows` to a Parquet file at `path` in row groups of `batch_size`.
    ///
    /// The file schema is the bound schema of `T`.
    ///
    /// # Errors
    /// Schema, file creation, encoding and cancellation errors. A failed
    /// write leaves a partial file behind.
    pub fn write_parquet_file_with<T, I>(
        &self,
        rows: I,
        path: impl AsRef<Path>,
        batch_size: usize,
        cancel: &CancellationToken,
    ) -> Result<WriteSummary>
    where
        T: Record,
        I: IntoIterator<Item = T>,
    {
        let metadata = self.metadata::<T>(None)?;
        let config = self.config.clone().with_batch_size(batch_size);
        let mut sink = ParquetSink::create(path, Arc::clone(metadata.bound_schema()), &config)?;
        BatchWriter::new(metadata, batch_size)
            .with_cancellation(cancel.clone())
            .write_all(rows, &mut sink)
    }

    /// Stream batches of `T` out of the Parquet file at `path`.
    ///
    /// # Errors
    /// Open and matching errors.
    pub fn read_parquet_batches<T: Record>(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<RowGroupBatches<T, ParquetSource>> {
        self.read_batches(ParquetSource::open(path)?, cancel)
    }

    /// Read the Parquet file at `path` eagerly, keeping its row groups apart.
    ///
    /// # Errors
    /// Open, matching and row-group errors.
    pub fn read_parquet<T: Record>(&self, path: impl AsRef<Path>) -> Result<RowGroups<T>> {
        self.read_row_groups(ParquetSource::open(path)?)
    }
}
