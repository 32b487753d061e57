//! Error types shared by the binding engine and the row-group streams.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Nothing is
//! retried internally; retry policy belongs to the caller.

use crate::value::ValueError;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MapperError>;

/// Everything that can go wrong while binding records to a columnar schema.
#[derive(Debug, Error)]
pub enum MapperError {
    /// A rename declaration resolved to an empty or absent column name.
    #[error("property `{property}` declares a rename with an empty column name")]
    MissingName { property: String },

    /// The schema could not bind every required property of the record type.
    #[error(
        "schema [{}] is incompatible with `{type_name}` (unbound properties: {})",
        describe_schema(.schema),
        .missing.join(", ")
    )]
    SchemaIncompatible {
        schema: SchemaRef,
        type_name: &'static str,
        missing: Vec<String>,
    },

    /// Reading a specific row group failed; earlier row groups stay valid.
    #[error("failed to read row group {index}")]
    RowGroupRead {
        index: usize,
        #[source]
        source: Box<MapperError>,
    },

    /// A row group index outside the materialized range was requested.
    #[error("row group {index} is out of range ({count} row groups)")]
    RowGroupRange { index: usize, count: usize },

    /// Two properties of the same type resolve to one column name.
    #[error("`{type_name}` maps more than one property to column `{name}`")]
    DuplicateField { type_name: &'static str, name: String },

    /// More than one schema field normalizes to the name a property binds to.
    #[error("property `{property}` matches more than one column named `{name}`")]
    AmbiguousField { property: String, name: String },

    /// A null was produced for a field declared non-nullable.
    #[error("null is not a valid value for non-nullable field `{field}`")]
    NullValue { field: String },

    /// A cell could not be converted between its Arrow and Rust representation.
    #[error("cannot convert value of field `{field}`")]
    Conversion {
        field: String,
        #[source]
        source: ValueError,
    },

    /// A column came back with a row count different from its row group.
    #[error("column `{field}` has {actual} rows but row group {row_group} has {expected}")]
    ColumnLength {
        field: String,
        row_group: usize,
        expected: usize,
        actual: usize,
    },

    /// The store has no column with the requested name.
    #[error("column `{field}` does not exist in the store")]
    MissingColumn { field: String },

    /// The operation observed a cancellation request at a row-group boundary.
    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[cfg(feature = "io-parquet")]
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MapperError {
    /// Index of the row group this error is attributed to, if any.
    #[must_use]
    pub fn row_group(&self) -> Option<usize> {
        match self {
            Self::RowGroupRead { index, .. } | Self::RowGroupRange { index, .. } => Some(*index),
            Self::ColumnLength { row_group, .. } => Some(*row_group),
            _ => None,
        }
    }
}

fn describe_schema(schema: &SchemaRef) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}
