//! Cached per-type binding metadata.
//!
//! [`TypeMetadata`] is the result of matching a record type against a schema,
//! flattened for the hot path: the bound fields in order, each carrying the
//! property's read and write accessors, plus the schema those bound fields form.
//!
//! [`MetadataRegistry`] keeps one entry per (type, schema, nullable policy).
//! The registry is append-only. Lookups take a read lock; a miss builds the
//! entry without holding any lock and then inserts it if still absent, so two
//! racing callers may both build, but only the first insert is retained and
//! both receive equivalent metadata. Failed matches are never cached.

use crate::binding::Record;
use crate::config::NullableBinding;
use crate::error::Result;
use crate::schema::{build_schema, match_schema, FieldBinding};
use crate::type_token::TypeTag;
use arrow::datatypes::{DataType, Schema, SchemaRef};
use log::debug;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Bindings and accessors of a record type against one schema.
pub struct TypeMetadata<T: 'static> {
    type_tag: TypeTag,
    schema: SchemaRef,
    bound_schema: SchemaRef,
    bindings: Vec<FieldBinding<T>>,
}

impl<T: Record> TypeMetadata<T> {
    /// Match `T` against `schema`, or against its own built schema when `None`.
    ///
    /// # Errors
    /// Propagates schema construction and matching errors.
    pub fn create(schema: Option<&SchemaRef>, nullable: NullableBinding) -> Result<Self> {
        let schema = match schema {
            Some(schema) => Arc::clone(schema),
            None => Arc::new(build_schema::<T>()?),
        };
        let bindings = match_schema::<T>(&schema, nullable)?.into_bindings();
        let bound_schema = Arc::new(Schema::new(
            bindings.iter().map(|b| Arc::clone(b.field())).collect::<Vec<_>>(),
        ));

        Ok(Self {
            type_tag: TypeTag::of::<T>(),
            schema,
            bound_schema,
            bindings,
        })
    }
}

impl<T: 'static> TypeMetadata<T> {
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// The schema the type was matched against.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// The fields that are actually read and written, in property order.
    #[must_use]
    pub fn bound_schema(&self) -> &SchemaRef {
        &self.bound_schema
    }

    #[must_use]
    pub fn bindings(&self) -> &[FieldBinding<T>] {
        &self.bindings
    }

    #[must_use]
    pub fn binding(&self, field: &str) -> Option<&FieldBinding<T>> {
        self.bindings.iter().find(|b| b.field().name() == field)
    }

    /// Names of the bound fields, in binding order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.field().name().as_str()).collect()
    }
}

impl<T: 'static> fmt::Debug for TypeMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("type", &self.type_tag.name)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MetadataKey {
    tag: TypeTag,
    /// Name, type and nullability of every field, in order.
    schema: Option<Vec<(String, DataType, bool)>>,
    nullable: NullableBinding,
}

impl MetadataKey {
    fn new<T: 'static>(schema: Option<&SchemaRef>, nullable: NullableBinding) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            schema: schema.map(|s| {
                s.fields()
                    .iter()
                    .map(|f| (f.name().clone(), f.data_type().clone(), f.is_nullable()))
                    .collect()
            }),
            nullable,
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Process-lifetime cache of [`TypeMetadata`], shared by reference.
#[derive(Default)]
pub struct MetadataRegistry {
    entries: RwLock<HashMap<MetadataKey, Entry>>,
}

impl MetadataRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the metadata of `T` for `schema` (or its built schema), creating
    /// it on first use.
    ///
    /// # Errors
    /// Propagates matching errors. Nothing is cached on failure, so a later
    /// call retries.
    pub fn get_or_create<T: Record>(
        &self,
        schema: Option<&SchemaRef>,
        nullable: NullableBinding,
    ) -> Result<Arc<TypeMetadata<T>>> {
        let key = MetadataKey::new::<T>(schema, nullable);
        if let Some(hit) = self.entries.read().get(&key).cloned() {
            if let Ok(metadata) = hit.downcast::<TypeMetadata<T>>() {
                return Ok(metadata);
            }
        }

        let created = Arc::new(TypeMetadata::<T>::create(schema, nullable)?);
        debug!(
            "built metadata for {} ({} bound fields)",
            created.type_tag(),
            created.bindings().len()
        );

        let retained = {
            let mut entries = self.entries.write();
            Arc::clone(
                entries
                    .entry(key)
                    .or_insert_with(|| Arc::clone(&created) as Entry),
            )
        };
        Ok(retained.downcast::<TypeMetadata<T>>().unwrap_or(created))
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached entry. Metadata already handed out stays valid.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
