//! Utilities for working with Arrow arrays.
//!
//! The derived dataset stores every feature as either `Float64` or `Utf8`,
//! so extraction reduces to two typed accessors plus row selection.

use arrow::array::{Array, ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;

use crate::error::{DashboardError, Result};

/// Downcast a column to a specific array type with clear error messages
///
/// # Type Parameters
///
/// * `A` - The target array type to downcast to
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected` - A human-readable name of the expected kind (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected: &'static str,
) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| DashboardError::ColumnType {
            column: column_name.to_string(),
            expected,
        })
}

/// Get the column index by name from a record batch
///
/// # Errors
/// Returns [`DashboardError::MissingColumn`] if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| DashboardError::missing_column(column_name))
}

/// Get a column from a record batch by name
pub fn get_column_by_name<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(batch.column(idx))
}

/// Borrow a numeric column as `Float64Array`
pub fn float_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a Float64Array> {
    downcast_array::<Float64Array>(get_column_by_name(batch, column_name)?, column_name, "numeric")
}

/// Borrow a categorical column as `StringArray`
pub fn string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a StringArray> {
    downcast_array::<StringArray>(
        get_column_by_name(batch, column_name)?,
        column_name,
        "categorical",
    )
}

/// Non-null values of a numeric array in row order
#[must_use]
pub fn float_values(array: &Float64Array) -> Vec<f64> {
    array.iter().flatten().collect()
}

/// Gather the given rows of a batch, preserving the index order
pub fn take_rows(batch: &RecordBatch, rows: &[u32]) -> Result<RecordBatch> {
    let indices = UInt32Array::from(rows.to_vec());
    Ok(take_record_batch(batch, &indices)?)
}
