//! Cell values and the conversions between Rust fields and Arrow columns.
//!
//! Record accessors exchange [`Value`]s: a read accessor turns a field of a
//! record into a `Value`, a write accessor stores a `Value` back into the
//! field. [`ColumnType`] is implemented for every Rust type a bound field may
//! have, and decides the Arrow [`DataType`] the field is declared with.
//!
//! Columns are built from a `Vec<Value>` with [`build_column`] and read one
//! cell at a time with [`Value::from_array`].

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int8Array,
    Int16Array, Int32Array, Int64Array, StringArray, UInt8Array, UInt16Array, UInt32Array,
    UInt64Array,
};
use arrow::datatypes::DataType;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A single dynamically typed cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
}

/// A value did not have the shape the receiving side expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueError {
    pub expected: String,
    pub found: String,
}

impl ValueError {
    pub(crate) fn mismatch(expected: impl fmt::Display, found: &Value) -> Self {
        Self {
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt8(_) => "uint8",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Utf8(_) => "utf8",
            Self::Binary(_) => "binary",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Read the cell at `row` of `array`.
    ///
    /// # Errors
    /// Returns an error if the array's data type is not one of the supported
    /// column types, or the array does not downcast to its declared type.
    pub fn from_array(array: &ArrayRef, row: usize) -> Result<Self, ValueError> {
        if array.is_null(row) {
            return Ok(Self::Null);
        }

        macro_rules! cell {
            ($array_ty:ty, $variant:ident) => {{
                let typed = array.as_any().downcast_ref::<$array_ty>().ok_or_else(|| {
                    ValueError {
                        expected: stringify!($array_ty).to_string(),
                        found: array.data_type().to_string(),
                    }
                })?;
                Ok(Self::$variant(typed.value(row).to_owned()))
            }};
        }

        match array.data_type() {
            DataType::Boolean => cell!(BooleanArray, Boolean),
            DataType::Int8 => cell!(Int8Array, Int8),
            DataType::Int16 => cell!(Int16Array, Int16),
            DataType::Int32 => cell!(Int32Array, Int32),
            DataType::Int64 => cell!(Int64Array, Int64),
            DataType::UInt8 => cell!(UInt8Array, UInt8),
            DataType::UInt16 => cell!(UInt16Array, UInt16),
            DataType::UInt32 => cell!(UInt32Array, UInt32),
            DataType::UInt64 => cell!(UInt64Array, UInt64),
            DataType::Float32 => cell!(Float32Array, Float32),
            DataType::Float64 => cell!(Float64Array, Float64),
            DataType::Utf8 => cell!(StringArray, Utf8),
            DataType::Binary => cell!(BinaryArray, Binary),
            other => Err(ValueError {
                expected: "a supported column type".to_string(),
                found: other.to_string(),
            }),
        }
    }
}

/// Build an Arrow array of `data_type` from a column of values.
///
/// `Value::Null` becomes an Arrow null slot; nullability of the target field is
/// checked by the caller.
///
/// # Errors
/// Returns an error if a value does not match `data_type`, or `data_type` is
/// not a supported column type.
pub fn build_column(data_type: &DataType, values: Vec<Value>) -> Result<ArrayRef, ValueError> {
    macro_rules! column {
        ($array_ty:ty, $variant:ident) => {{
            let mut cells = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::Null => cells.push(None),
                    Value::$variant(v) => cells.push(Some(v)),
                    other => return Err(ValueError::mismatch(data_type, &other)),
                }
            }
            Arc::new(cells.into_iter().collect::<$array_ty>()) as ArrayRef
        }};
    }

    let array = match data_type {
        DataType::Boolean => column!(BooleanArray, Boolean),
        DataType::Int8 => column!(Int8Array, Int8),
        DataType::Int16 => column!(Int16Array, Int16),
        DataType::Int32 => column!(Int32Array, Int32),
        DataType::Int64 => column!(Int64Array, Int64),
        DataType::UInt8 => column!(UInt8Array, UInt8),
        DataType::UInt16 => column!(UInt16Array, UInt16),
        DataType::UInt32 => column!(UInt32Array, UInt32),
        DataType::UInt64 => column!(UInt64Array, UInt64),
        DataType::Float32 => column!(Float32Array, Float32),
        DataType::Float64 => column!(Float64Array, Float64),
        DataType::Utf8 => column!(StringArray, Utf8),
        DataType::Binary => column!(BinaryArray, Binary),
        other => {
            return Err(ValueError {
                expected: "a supported column type".to_string(),
                found: other.to_string(),
            });
        }
    };
    Ok(array)
}

/// A Rust type that can be stored in a bound column.
///
/// `Option<T>` is the nullable form of any implementor.
pub trait ColumnType: Sized {
    /// Whether the field accepts nulls.
    const NULLABLE: bool = false;

    /// Arrow type the field is declared with.
    fn data_type() -> DataType;

    fn to_value(&self) -> Value;

    /// # Errors
    /// Returns an error if `value` does not hold this type.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! impl_column_type {
    ($($ty:ty => $variant:ident, $data_type:expr);* $(;)?) => {
        $(
            impl ColumnType for $ty {
                fn data_type() -> DataType {
                    $data_type
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ValueError::mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

impl_column_type! {
    bool => Boolean, DataType::Boolean;
    i8 => Int8, DataType::Int8;
    i16 => Int16, DataType::Int16;
    i32 => Int32, DataType::Int32;
    i64 => Int64, DataType::Int64;
    u8 => UInt8, DataType::UInt8;
    u16 => UInt16, DataType::UInt16;
    u32 => UInt32, DataType::UInt32;
    u64 => UInt64, DataType::UInt64;
    f32 => Float32, DataType::Float32;
    f64 => Float64, DataType::Float64;
    String => Utf8, DataType::Utf8;
    Vec<u8> => Binary, DataType::Binary;
}

impl<T: ColumnType> ColumnType for Option<T> {
    const NULLABLE: bool = true;

    fn data_type() -> DataType {
        T::data_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ColumnType::to_value)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_roundtrip_keeps_nulls() {
        let values = vec![Value::Int32(1), Value::Null, Value::Int32(3)];
        let array = build_column(&DataType::Int32, values.clone()).unwrap();
        assert_eq!(array.len(), 3);
        let back: Vec<Value> = (0..3).map(|i| Value::from_array(&array, i).unwrap()).collect();
        assert_eq!(back, values);
    }

    #[test]
    fn build_column_rejects_mismatched_value() {
        let err = build_column(&DataType::Utf8, vec![Value::Int64(7)]).unwrap_err();
        assert_eq!(err.found, "int64");
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::Utf8("x".into())).unwrap(),
            Some("x".to_string())
        );
        assert!(<Option<u16> as ColumnType>::NULLABLE);
        assert_eq!(<Option<u16> as ColumnType>::data_type(), DataType::UInt16);
    }

    #[test]
    fn binary_cells_are_owned() {
        let array = build_column(&DataType::Binary, vec![Value::Binary(vec![1, 2])]).unwrap();
        assert_eq!(Value::from_array(&array, 0).unwrap(), Value::Binary(vec![1, 2]));
    }
}
