//! CSV reading with schema inference.

use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::schema::columns;

/// Read a CSV file with a header row, inferring the schema
///
/// Integer columns are widened to `Float64` after inference so that a
/// fractional value past the inference window cannot fail the read.
///
/// # Arguments
/// * `path` - Path to the CSV file
/// * `batch_size` - Rows per decoded batch
/// * `inference_rows` - Records sampled for schema inference
pub fn read_csv(path: &Path, batch_size: usize, inference_rows: usize) -> Result<RecordBatch> {
    let mut file = safe_open_file(path, "application table")?;

    let format = Format::default().with_header(true);
    let (inferred, sampled) = format.infer_schema(&mut file, Some(inference_rows))?;
    debug!(
        "Inferred {} CSV columns from {sampled} records of {}",
        inferred.fields().len(),
        path.display()
    );
    file.rewind()?;

    let schema = widen_integers(&inferred);
    read_csv_with_schema(file, schema, batch_size)
}

/// Read CSV with a header row using a known schema
///
/// Used to reload exported views with the dataset's own schema.
pub fn read_csv_with_schema<R: Read>(
    reader: R,
    schema: SchemaRef,
    batch_size: usize,
) -> Result<RecordBatch> {
    let csv_reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_batch_size(batch_size.max(1))
        .build(reader)?;

    let batches = csv_reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn widen_integers(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Int64 if field.name() != columns::SK_ID_CURR => {
                Field::new(field.name(), DataType::Float64, true)
            }
            _ => Field::new(field.name(), field.data_type().clone(), true),
        })
        .collect();
    Arc::new(Schema::new(fields))
}
