//! Parquet-backed column stores.
//!
//! - [`ParquetSink`] writes every row group handed to it as exactly one
//!   Parquet row group, with the configured compression and footer metadata.
//! - [`ParquetSource`] loads the footer once and then decodes single columns
//!   of single row groups on demand, projecting away everything else.
//!
//! Output is deterministic: the same rows, schema and config produce the same
//! bytes.

use crate::config::{Compression, MapperConfig};
use crate::error::{MapperError, Result};
use crate::io::{ColumnSink, ColumnSource};
use arrow::array::{new_empty_array, ArrayRef};
use arrow::compute::concat;
use arrow::datatypes::{Field, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::{debug, trace};
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::basic::{Compression as ParquetCompression, GzipLevel, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Writer properties derived from the mapper config.
///
/// Row groups are not capped by row count: each [`ColumnSink::write_row_group`]
/// call closes its own row group.
///
/// # Errors
/// Fails on an out-of-range zstd level.
pub fn writer_properties(config: &MapperConfig) -> Result<WriterProperties> {
    let compression = match config.compression {
        Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
        Compression::Snappy => ParquetCompression::SNAPPY,
        Compression::Gzip => ParquetCompression::GZIP(GzipLevel::default()),
        Compression::Zstd(level) => ParquetCompression::ZSTD(ZstdLevel::try_new(level)?),
    };

    let key_value_metadata = (!config.key_value_metadata.is_empty()).then(|| {
        config
            .key_value_metadata
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect::<Vec<_>>()
    });

    Ok(WriterProperties::builder()
        .set_compression(compression)
        .set_max_row_group_row_count(None)
        .set_key_value_metadata(key_value_metadata)
        .build())
}

/// A [`ColumnSink`] writing Parquet to any `Write + Send` target.
pub struct ParquetSink<W: Write + Send> {
    schema: SchemaRef,
    writer: ArrowWriter<W>,
    row_groups: usize,
    finished: bool,
}

impl ParquetSink<File> {
    /// Create (or truncate) `path` and write Parquet into it.
    ///
    /// # Errors
    /// Fails if the file cannot be created or the writer cannot be set up.
    pub fn create(path: impl AsRef<Path>, schema: SchemaRef, config: &MapperConfig) -> Result<Self> {
        let path = path.as_ref();
        debug!("creating parquet file {}", path.display());
        Self::new(File::create(path)?, schema, config)
    }
}

impl<W: Write + Send> ParquetSink<W> {
    /// Write Parquet into `target`.
    ///
    /// # Errors
    /// Fails if the writer cannot be set up for `schema`.
    pub fn new(target: W, schema: SchemaRef, config: &MapperConfig) -> Result<Self> {
        let props = writer_properties(config)?;
        let writer = ArrowWriter::try_new(target, Arc::clone(&schema), Some(props))?;
        Ok(Self {
            schema,
            writer,
            row_groups: 0,
            finished: false,
        })
    }

    /// Row groups written so far.
    #[must_use]
    pub fn row_groups(&self) -> usize {
        self.row_groups
    }
}

impl<W: Write + Send> ColumnSink for ParquetSink<W> {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn write_row_group(&mut self, columns: Vec<ArrayRef>) -> Result<()> {
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        self.writer.write(&batch)?;
        self.writer.flush()?;
        trace!("wrote parquet row group {} ({} rows)", self.row_groups, batch.num_rows());
        self.row_groups += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.finished {
            self.writer.finish()?;
            self.finished = true;
        }
        Ok(())
    }
}

/// A [`ColumnSource`] over a Parquet file.
pub struct ParquetSource {
    file: File,
    metadata: ArrowReaderMetadata,
    row_group_rows: Vec<usize>,
}

impl ParquetSource {
    /// Open `path` and load its footer.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or is not valid Parquet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening parquet file {}", path.display());
        Self::from_file(File::open(path)?)
    }

    /// Load the footer of an already opened file.
    ///
    /// # Errors
    /// Fails if the file is not valid Parquet.
    pub fn from_file(file: File) -> Result<Self> {
        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::new())?;
        let row_group_rows = metadata
            .metadata()
            .row_groups()
            .iter()
            .map(|rg| usize::try_from(rg.num_rows()).unwrap_or_default())
            .collect();
        Ok(Self {
            file,
            metadata,
            row_group_rows,
        })
    }
}

impl ColumnSource for ParquetSource {
    fn schema(&self) -> SchemaRef {
        Arc::clone(self.metadata.schema())
    }

    fn row_group_rows(&self) -> &[usize] {
        &self.row_group_rows
    }

    fn read_column(&mut self, row_group: usize, field: &Field) -> Result<ArrayRef> {
        let Some(&rows) = self.row_group_rows.get(row_group) else {
            return Err(MapperError::RowGroupRange {
                index: row_group,
                count: self.row_group_rows.len(),
            });
        };
        let index = self
            .metadata
            .schema()
            .index_of(field.name())
            .map_err(|_| MapperError::MissingColumn {
                field: field.name().clone(),
            })?;
        if rows == 0 {
            return Ok(new_empty_array(field.data_type()));
        }

        let mask = ProjectionMask::roots(
            self.metadata.metadata().file_metadata().schema_descr(),
            [index],
        );
        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(
            self.file.try_clone()?,
            self.metadata.clone(),
        )
        .with_row_groups(vec![row_group])
        .with_projection(mask)
        .with_batch_size(rows)
        .build()?;

        let mut chunks = Vec::new();
        for batch in reader {
            chunks.push(Arc::clone(batch?.column(0)));
        }
        match chunks.len() {
            0 => Ok(new_empty_array(field.data_type())),
            1 => Ok(chunks.remove(0)),
            _ => {
                let parts: Vec<&dyn arrow::array::Array> = chunks.iter().map(AsRef::as_ref).collect();
                Ok(concat(&parts)?)
            }
        }
    }

    fn key_value_metadata(&self) -> BTreeMap<String, String> {
        self.metadata
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .map(|pairs| {
                pairs
                    .iter()
                    .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}
