//! Mapper configuration.
//!
//! [`MapperConfig`] controls row-group sizing, how nullable properties are
//! matched, and how Parquet output is encoded. It is plain serde data, so it
//! can be embedded in a larger application config or loaded with
//! [`MapperConfig::from_json`].

use crate::error::{MapperError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of rows buffered per row group.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// How nullable properties take part in schema matching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullableBinding {
    /// Nullable properties are never bound, so they are neither read nor
    /// written. They are also never required.
    #[default]
    Exempt,
    /// Nullable properties bind when the schema has a compatible field and
    /// stay unbound otherwise. They are never required.
    BindIfPresent,
}

/// Column compression used by the Parquet sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
    Zstd(i32),
}

/// Configuration for a [`Mapper`](crate::Mapper).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Rows per row group when writing. Zero is treated as one.
    pub batch_size: usize,
    /// Matching policy for nullable properties.
    pub nullable: NullableBinding,
    /// Parquet column compression.
    pub compression: Compression,
    /// Key/value pairs stored in the Parquet footer of written files.
    pub key_value_metadata: BTreeMap<String, String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            nullable: NullableBinding::Exempt,
            compression: Compression::Snappy,
            key_value_metadata: BTreeMap::new(),
        }
    }
}

impl MapperConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: NullableBinding) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_value_metadata.insert(key.into(), value.into());
        self
    }

    /// Batch size with the zero case folded to one.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Parse a config from JSON. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`MapperError::Config`] if the document is not valid JSON or
    /// has fields of the wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MapperError::Config(e.to_string()))
    }
}
