//! Type binding contexts: the per-type snapshot of bindable properties.
//!
//! A [`TypeBinding`] lists a record's properties in declaration order. Each
//! [`Property`] carries its declared Arrow type, nullability, attributes and a
//! pair of accessors generated at compile time. The [`bind_record!`] macro
//! writes the [`Record`] impl that builds the binding once and hands out a
//! `'static` reference to it.
//!
//! ```
//! use ironbind::{bind_record, Record};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Trade {
//!     id: i64,
//!     label: String,
//!     note: Option<String>,
//!     scratch: u32,
//! }
//!
//! bind_record! {
//!     #[ignore_casing]
//!     Trade {
//!         id: i64,
//!         #[rename("name")]
//!         label: String,
//!         note: Option<String>,
//!         #[ignore]
//!         scratch: u32,
//!     }
//! }
//!
//! let binding = Trade::binding();
//! assert_eq!(binding.properties().len(), 4);
//! assert!(binding.property("note").unwrap().nullable());
//! ```

use crate::attributes::{PropertyAttributes, TypeAttributes};
use crate::value::{ColumnType, Value, ValueError};
use arrow::datatypes::DataType;
use std::fmt;

/// Read accessor: record → cell.
pub type Getter<T> = fn(&T) -> Value;

/// Write accessor: (record, cell) → unit.
pub type Setter<T> = fn(&mut T, Value) -> Result<(), ValueError>;

/// A record type that can be bound to a columnar schema.
///
/// Implemented by [`bind_record!`]. `Default` provides the blank instances the
/// reader fills in; `Clone` lets the reader hand out owned batches while it
/// keeps reusing its buffer.
pub trait Record: Default + Clone + Send + Sync + 'static {
    /// The binding context of this type, built on first call.
    fn binding() -> &'static TypeBinding<Self>;
}

/// One bindable property of `T`.
pub struct Property<T> {
    name: &'static str,
    data_type: DataType,
    nullable: bool,
    attributes: PropertyAttributes,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T> Property<T> {
    /// Describe a property whose Rust type is `F`.
    #[must_use]
    pub fn new<F: ColumnType>(
        name: &'static str,
        attributes: PropertyAttributes,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            data_type: F::data_type(),
            nullable: F::NULLABLE,
            attributes,
            get,
            set,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    #[must_use]
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn attributes(&self) -> &PropertyAttributes {
        &self.attributes
    }

    #[must_use]
    pub fn getter(&self) -> Getter<T> {
        self.get
    }

    #[must_use]
    pub fn setter(&self) -> Setter<T> {
        self.set
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("nullable", &self.nullable)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Immutable per-type snapshot of properties and attributes.
pub struct TypeBinding<T> {
    type_name: &'static str,
    attributes: TypeAttributes,
    properties: Vec<Property<T>>,
}

impl<T> TypeBinding<T> {
    #[must_use]
    pub fn new(type_name: &'static str, attributes: TypeAttributes, properties: Vec<Property<T>>) -> Self {
        Self {
            type_name,
            attributes,
            properties,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn attributes(&self) -> &TypeAttributes {
        &self.attributes
    }

    /// Properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl<T> fmt::Debug for TypeBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type_name", &self.type_name)
            .field("attributes", &self.attributes)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Implement [`Record`] for a struct by listing its bindable fields.
///
/// Type-level markers go before the type name, property markers before each
/// field:
///
/// - `#[ignore_casing]` / `#[ignore_casing_with(Separators::HYPHEN)]` (type or field)
/// - `#[rename("column")]`, `#[rename_opt(None)]`
/// - `#[ignore]`, `#[ignore_when(false)]`
///
/// The listed field types must match the struct's; a mismatch is a compile error.
#[macro_export]
macro_rules! bind_record {
    (
        $( #[ $tattr:ident $( ( $( $targ:expr ),* ) )? ] )*
        $name:ident {
            $(
                $( #[ $pattr:ident $( ( $( $parg:expr ),* ) )? ] )*
                $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        impl $crate::Record for $name {
            fn binding() -> &'static $crate::TypeBinding<Self> {
                static BINDING: ::std::sync::OnceLock<$crate::TypeBinding<$name>> =
                    ::std::sync::OnceLock::new();
                BINDING.get_or_init(|| {
                    $crate::TypeBinding::new(
                        stringify!($name),
                        $crate::TypeAttributes::new() $( .$tattr( $( $( $targ ),* )? ) )*,
                        vec![
                            $(
                                $crate::Property::<$name>::new::<$fty>(
                                    stringify!($field),
                                    $crate::PropertyAttributes::new() $( .$pattr( $( $( $parg ),* )? ) )*,
                                    |record: &$name| $crate::ColumnType::to_value(&record.$field),
                                    |record: &mut $name, value: $crate::Value|
                                        -> ::std::result::Result<(), $crate::ValueError> {
                                        record.$field = <$fty as $crate::ColumnType>::from_value(value)?;
                                        ::std::result::Result::Ok(())
                                    },
                                ),
                            )*
                        ],
                    )
                })
            }
        }
    };
}
