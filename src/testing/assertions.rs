//! Assertion functions for row groups and schemas.

use arrow::datatypes::Schema;
use std::fmt::Debug;

/// Assert that two row sequences are equal in order and content.
///
/// # Panics
///
/// Panics if the sequences differ in length or at any position.
///
/// # Example
///
/// ```
/// use ironbind::testing::assert_rows_equal;
///
/// assert_rows_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_rows_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a, e, "Row mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}");
    }
}

/// Assert the row count of every row group, in order.
///
/// # Panics
///
/// Panics if the layouts differ.
pub fn assert_row_group_sizes(actual: &[usize], expected: &[usize]) {
    assert_eq!(
        actual, expected,
        "Row group layout mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that batches, concatenated, equal `expected`, and that each batch
/// has the matching size from `sizes`.
///
/// # Panics
///
/// Panics on any size or content mismatch.
pub fn assert_batches<T: Debug + PartialEq>(batches: &[Vec<T>], sizes: &[usize], expected: &[T]) {
    let actual_sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_row_group_sizes(&actual_sizes, sizes);
    let flat: Vec<&T> = batches.iter().flatten().collect();
    let want: Vec<&T> = expected.iter().collect();
    assert_rows_equal(&flat, &want);
}

/// Assert a schema's field names, in order.
///
/// # Panics
///
/// Panics if the names differ.
///
/// # Example
///
/// ```
/// use arrow::datatypes::{DataType, Field, Schema};
/// use ironbind::testing::assert_field_names;
///
/// let schema = Schema::new(vec![Field::new("id", DataType::Int64, false)]);
/// assert_field_names(&schema, &["id"]);
/// ```
pub fn assert_field_names(schema: &Schema, expected: &[&str]) {
    let actual: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        actual, expected,
        "Field name mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}
