//! # ironbind
//!
//! Bind plain Rust records to columnar, schema-typed storage.
//!
//! Given a record type, `ironbind` derives an Arrow schema. Given a schema from
//! a column store, it decides whether the schema can carry the record type and
//! pairs each property with its field. It then streams records into and out of
//! the store one row group at a time.
//!
//! ## Key Features
//!
//! - **Compile-time bindings** - [`bind_record!`] generates the property list and
//!   accessors of a type; nothing is discovered by reflection at runtime
//! - **Attribute-driven names** - rename, ignore, and case/separator-insensitive matching
//! - **Exact schema matching** - fields bind by name and exact Arrow type
//! - **Cached metadata** - bindings are computed once per (type, schema) and shared
//! - **Row-group streaming** - fixed-size batched writes and lazy per-row-group reads
//! - **Parquet** - a ready-made column store backed by the `parquet` crate
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironbind::{bind_record, Mapper, MapperConfig};
//! # fn main() -> anyhow::Result<()> {
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Order {
//!     id: i64,
//!     customer: String,
//!     total: f64,
//! }
//!
//! bind_record! {
//!     Order { id: i64, customer: String, total: f64 }
//! }
//!
//! let mapper = Mapper::new(MapperConfig::new().with_batch_size(10_000));
//! let orders = vec![Order { id: 1, customer: "ada".into(), total: 9.5 }];
//! mapper.write_parquet_file(orders.clone(), "orders.parquet")?;
//!
//! let back = mapper.read_parquet::<Order>("orders.parquet")?;
//! assert_eq!(back.into_rows(), orders);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Bindings
//!
//! A [`TypeBinding`] is the per-type list of [`Property`] descriptions: name,
//! Arrow type, nullability (`Option<_>` fields are nullable), attributes and
//! accessors. It is built once per process.
//!
//! ### Names
//!
//! The [`naming`] module turns a property and its attributes into the column
//! name it binds to. `#[ignore]` removes a property, `#[rename("x")]` replaces
//! its name, and `#[ignore_casing]` makes comparisons ignore case and
//! separators (`-`, `_`, space) on both sides.
//!
//! ### Schemas
//!
//! [`schema::build_schema`] derives the schema of a type, and
//! [`schema::match_schema`] binds a type to a foreign schema. Every non-ignored,
//! non-nullable property must find a field; nullable properties follow the
//! configured [`NullableBinding`] policy.
//!
//! ### Streaming
//!
//! [`BatchWriter`] buffers records into row groups, and [`BatchReader`] yields
//! one `Vec<T>` per row group through [`RowGroupBatches`]. Both work against
//! the [`ColumnSource`]/[`ColumnSink`] traits and honor a
//! [`CancellationToken`] at row-group boundaries.
//!
//! ## Feature Flags
//!
//! - `io-parquet` - Parquet column store and the `*_parquet*` methods on [`Mapper`]
//! - `parallel-io` - Build the columns of a row group in parallel with Rayon
//!
//! Both are enabled by default.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod attributes;
pub mod binding;
pub mod cancel;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod mapper;
pub mod metadata;
pub mod naming;
pub mod reader;
pub mod schema;
pub mod testing;
pub mod type_token;
pub mod value;
pub mod writer;

pub use attributes::{Attribute, PropertyAttributes, Separators, TypeAttributes};
pub use binding::{Getter, Property, Record, Setter, TypeBinding};
pub use cancel::CancellationToken;
pub use config::{Compression, MapperConfig, NullableBinding, DEFAULT_BATCH_SIZE};
pub use data::RowGroups;
pub use error::{MapperError, Result};
pub use io::{ColumnSink, ColumnSource};
pub use mapper::Mapper;
pub use metadata::{MetadataRegistry, TypeMetadata};
pub use naming::ResolvedName;
pub use reader::{BatchReader, RowGroupBatches};
pub use schema::{FieldBinding, SchemaMatch};
pub use value::{ColumnType, Value, ValueError};
pub use writer::{BatchWriter, WriteSummary};

#[cfg(feature = "io-parquet")]
pub use io::parquet::{ParquetSink, ParquetSource};
