//! Schema construction and schema/type matching.
//!
//! - [`build_schema`] derives an Arrow schema from a record's binding context.
//! - [`match_schema`] decides whether an external schema can carry a record
//!   type and, if so, pairs every bindable property with its field.
//!
//! Fields are compared by resolved name and exact [`DataType`](arrow::datatypes::DataType);
//! there is no implicit widening or narrowing.

use crate::attributes::TypeAttributes;
use crate::binding::{Getter, Property, Record, Setter};
use crate::config::NullableBinding;
use crate::error::{MapperError, Result};
use crate::naming::{comparison_name, resolve};
use arrow::datatypes::{Field, FieldRef, Schema, SchemaRef};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Build the output schema of `T`: one field per non-ignored property, in
/// declaration order, named by the resolution rules.
///
/// # Errors
/// [`MapperError::MissingName`] for an empty rename and
/// [`MapperError::DuplicateField`] when two properties resolve to one name.
pub fn build_schema<T: Record>() -> Result<Schema> {
    let binding = T::binding();
    let owner = binding.attributes();
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(binding.properties().len());

    for property in binding.properties() {
        let resolved = resolve(owner, property.name(), property.attributes(), property.name())?;
        let Some(name) = resolved.as_column() else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            return Err(MapperError::DuplicateField {
                type_name: binding.type_name(),
                name: name.to_string(),
            });
        }
        fields.push(Field::new(name, property.data_type().clone(), property.nullable()));
    }

    Ok(Schema::new(fields))
}

/// A schema field bound to a record property, with the property's accessors.
pub struct FieldBinding<T: 'static> {
    field: FieldRef,
    property: &'static Property<T>,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T: 'static> FieldBinding<T> {
    fn new(field: FieldRef, property: &'static Property<T>) -> Self {
        Self {
            field,
            get: property.getter(),
            set: property.setter(),
            property,
        }
    }

    #[must_use]
    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    #[must_use]
    pub fn property(&self) -> &'static Property<T> {
        self.property
    }

    /// Read accessor of the bound property.
    #[must_use]
    pub fn getter(&self) -> Getter<T> {
        self.get
    }

    /// Write accessor of the bound property.
    #[must_use]
    pub fn setter(&self) -> Setter<T> {
        self.set
    }
}

impl<T: 'static> Clone for FieldBinding<T> {
    fn clone(&self) -> Self {
        Self {
            field: Arc::clone(&self.field),
            property: self.property,
            get: self.get,
            set: self.set,
        }
    }
}

impl<T: 'static> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.field.name())
            .field("property", &self.property.name())
            .finish()
    }
}

/// The field↔property pairing produced by [`match_schema`].
pub struct SchemaMatch<T: 'static> {
    schema: SchemaRef,
    bindings: Vec<FieldBinding<T>>,
}

impl<T: 'static> SchemaMatch<T> {
    /// The schema the type was matched against.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Bindings in property declaration order.
    #[must_use]
    pub fn bindings(&self) -> &[FieldBinding<T>] {
        &self.bindings
    }

    #[must_use]
    pub fn into_bindings(self) -> Vec<FieldBinding<T>> {
        self.bindings
    }

    /// Binding for the field called `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldBinding<T>> {
        self.bindings.iter().find(|b| b.field.name() == field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Field name → property name.
    #[must_use]
    pub fn field_map(&self) -> BTreeMap<String, &'static str> {
        self.bindings
            .iter()
            .map(|b| (b.field.name().clone(), b.property.name()))
            .collect()
    }
}

impl<T: 'static> fmt::Debug for SchemaMatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|b| (b.field.name(), b.property.name())))
            .finish()
    }
}

/// Match `schema` against record type `T`.
///
/// Ignored properties never bind. Non-nullable properties must bind. Nullable
/// properties follow `nullable`: with [`NullableBinding::Exempt`] they are left
/// out entirely, with [`NullableBinding::BindIfPresent`] they bind when a
/// compatible field exists.
///
/// # Errors
/// - [`MapperError::MissingName`] for a malformed rename, even on a nullable property.
/// - [`MapperError::AmbiguousField`] if several fields fold to the same name.
/// - [`MapperError::DuplicateField`] if two properties bind the same field.
/// - [`MapperError::SchemaIncompatible`] if a required property stays unbound.
pub fn match_schema<T: Record>(schema: &SchemaRef, nullable: NullableBinding) -> Result<SchemaMatch<T>> {
    let binding = T::binding();
    let owner = binding.attributes();
    let mut bindings: Vec<FieldBinding<T>> = Vec::new();
    let mut missing = Vec::new();

    for property in binding.properties() {
        let resolved = resolve(owner, property.name(), property.attributes(), property.name())?;
        let Some(candidate) = resolved.as_column() else {
            continue;
        };
        let required = !property.nullable();
        if !required && nullable == NullableBinding::Exempt {
            continue;
        }

        match find_field(schema, owner, property, candidate)? {
            Some(field) => {
                if bindings.iter().any(|b| b.field.name() == field.name()) {
                    return Err(MapperError::DuplicateField {
                        type_name: binding.type_name(),
                        name: field.name().clone(),
                    });
                }
                bindings.push(FieldBinding::new(field, property));
            }
            None if required => missing.push(property.name().to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(MapperError::SchemaIncompatible {
            schema: Arc::clone(schema),
            type_name: binding.type_name(),
            missing,
        });
    }

    Ok(SchemaMatch {
        schema: Arc::clone(schema),
        bindings,
    })
}

/// Whether `schema` can carry `T`. Any matching error counts as incompatible.
#[must_use]
pub fn is_schema_compatible<T: Record>(schema: &SchemaRef, nullable: NullableBinding) -> bool {
    match_schema::<T>(schema, nullable).is_ok()
}

fn find_field<T>(
    schema: &SchemaRef,
    owner: &TypeAttributes,
    property: &Property<T>,
    candidate: &str,
) -> Result<Option<FieldRef>> {
    let mut named = schema
        .fields()
        .iter()
        .filter(|field| comparison_name(owner, property.attributes(), field.name()) == candidate);

    let Some(first) = named.next() else {
        return Ok(None);
    };
    if named.next().is_some() {
        return Err(MapperError::AmbiguousField {
            property: property.name().to_string(),
            name: candidate.to_string(),
        });
    }

    Ok((first.data_type() == property.data_type()).then(|| Arc::clone(first)))
}
