//! Type normalization of raw input batches.
//!
//! The engine works on two physical types only: numbers as `Float64` and
//! categories as `Utf8`. The identifier column is cast to text so that it is
//! never mistaken for a feature.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, new_null_array};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::Result;
use crate::schema::{columns, is_numeric};

/// Cast every column of a raw batch to `Float64` or `Utf8`
///
/// # Arguments
/// * `batch` - The raw batch as read from CSV or Parquet
///
/// # Returns
/// A batch with the same column order and row count, nullable fields only
///
/// # Errors
/// Returns an error if an Arrow cast fails
pub fn normalize_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut arrays = Vec::with_capacity(schema.fields().len());

    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let (data_type, converted) = if name == columns::SK_ID_CURR {
            (DataType::Utf8, to_text(array)?)
        } else if matches!(array.data_type(), DataType::Null) {
            (DataType::Float64, new_null_array(&DataType::Float64, array.len()))
        } else if is_numeric(array.data_type()) {
            (DataType::Float64, cast::cast(array, &DataType::Float64)?)
        } else {
            (DataType::Utf8, to_text(array)?)
        };

        if array.data_type() != &data_type {
            debug!("Normalized column '{name}' from {:?} to {data_type:?}", array.data_type());
        }

        fields.push(Field::new(name, data_type, true));
        arrays.push(converted);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Cast to `Utf8`, turning empty strings into nulls
fn to_text(array: &ArrayRef) -> Result<ArrayRef> {
    let cast_array = cast::cast(array, &DataType::Utf8)?;
    let Some(strings) = cast_array.as_any().downcast_ref::<StringArray>() else {
        return Ok(cast_array);
    };

    if !strings.iter().any(|v| v.is_some_and(str::is_empty)) {
        return Ok(cast_array);
    }

    let cleaned: StringArray = strings
        .iter()
        .map(|v| v.filter(|s| !s.is_empty()))
        .collect();
    Ok(Arc::new(cleaned))
}
