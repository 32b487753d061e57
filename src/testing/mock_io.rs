//! Mock I/O helpers for testing without real column files.
//!
//! [`MemoryStore`] is a [`ColumnSource`] and [`ColumnSink`] that keeps row
//! groups as Arrow arrays in memory. It can be told to fail column reads at a
//! chosen row group. [`TempFilePath`] and [`TempDirPath`] give file-backed
//! tests scratch space that disappears on drop.

use crate::binding::Record;
use crate::error::{MapperError, Result};
use crate::io::{ColumnSink, ColumnSource};
use crate::schema::build_schema;
use arrow::array::ArrayRef;
use arrow::datatypes::{Field, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

/// An in-memory, row-grouped column store.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    schema: SchemaRef,
    row_groups: Vec<Vec<ArrayRef>>,
    row_group_rows: Vec<usize>,
    key_value_metadata: BTreeMap<String, String>,
    fail_reads_at: Option<usize>,
    column_reads: usize,
    finished: bool,
}

impl MemoryStore {
    /// An empty store with `schema`.
    #[must_use]
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            row_groups: Vec::new(),
            row_group_rows: Vec::new(),
            key_value_metadata: BTreeMap::new(),
            fail_reads_at: None,
            column_reads: 0,
            finished: false,
        }
    }

    /// An empty store with the schema built from `T`.
    ///
    /// # Errors
    /// See [`build_schema`].
    pub fn for_record<T: Record>() -> Result<Self> {
        Ok(Self::new(Arc::new(build_schema::<T>()?)))
    }

    /// A store pre-filled with one row group per batch.
    ///
    /// # Errors
    /// Fails if a batch's schema differs from `schema`.
    pub fn from_batches(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        let mut store = Self::new(schema);
        for batch in batches {
            store.write_row_group(batch.columns().to_vec())?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_value_metadata.insert(key.into(), value.into());
        self
    }

    /// Make every column read of `row_group` fail with an I/O error.
    #[must_use]
    pub fn fail_reads_at(mut self, row_group: usize) -> Self {
        self.fail_reads_at = Some(row_group);
        self
    }

    pub fn set_fail_reads_at(&mut self, row_group: Option<usize>) {
        self.fail_reads_at = row_group;
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Row count of each stored row group.
    #[must_use]
    pub fn row_group_rows(&self) -> &[usize] {
        &self.row_group_rows
    }

    /// Row group `index` as a record batch.
    ///
    /// # Errors
    /// [`MapperError::RowGroupRange`] for an unknown index.
    pub fn row_group(&self, index: usize) -> Result<RecordBatch> {
        let columns = self.row_groups.get(index).ok_or(MapperError::RowGroupRange {
            index,
            count: self.row_groups.len(),
        })?;
        Ok(RecordBatch::try_new(Arc::clone(&self.schema), columns.clone())?)
    }

    /// Column reads served so far, failed ones included.
    #[must_use]
    pub fn column_reads(&self) -> usize {
        self.column_reads
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ColumnSink for MemoryStore {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn write_row_group(&mut self, columns: Vec<ArrayRef>) -> Result<()> {
        if self.finished {
            return Err(MapperError::Io(io::Error::other("memory store is already finished")));
        }
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        self.row_group_rows.push(batch.num_rows());
        self.row_groups.push(batch.columns().to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

impl ColumnSource for MemoryStore {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn row_group_rows(&self) -> &[usize] {
        &self.row_group_rows
    }

    fn read_column(&mut self, row_group: usize, field: &Field) -> Result<ArrayRef> {
        self.column_reads += 1;
        if self.fail_reads_at == Some(row_group) {
            return Err(MapperError::Io(io::Error::other(format!(
                "injected failure reading `{}` from row group {row_group}",
                field.name()
            ))));
        }
        let columns = self.row_groups.get(row_group).ok_or(MapperError::RowGroupRange {
            index: row_group,
            count: self.row_groups.len(),
        })?;
        let index = self
            .schema
            .index_of(field.name())
            .map_err(|_| MapperError::MissingColumn {
                field: field.name().clone(),
            })?;
        Ok(Arc::clone(&columns[index]))
    }

    fn key_value_metadata(&self) -> BTreeMap<String, String> {
        self.key_value_metadata.clone()
    }
}

/// A temporary file that is deleted when dropped.
pub struct TempFilePath {
    _file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_extension("tmp")
    }

    /// Create a new temporary file with a specific extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = file.path().to_path_buf();
        Ok(Self { _file: file, path })
    }

    /// A temporary `.parquet` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn parquet() -> io::Result<Self> {
        Self::with_extension("parquet")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory that is deleted, with its contents, when dropped.
pub struct TempDirPath {
    _dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().to_path_buf();
        Ok(Self { _dir: dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path for `filename` inside this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}
