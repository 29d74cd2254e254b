//! Parquet reading
//!
//! Synchronous counterpart of [`crate::async_io::read_parquet_async`].

use std::path::Path;

use arrow::compute::concat_batches;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::Result;
use crate::error::util::safe_open_file;

/// Read a Parquet file into a single record batch
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `batch_size` - Rows per decoded batch
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<RecordBatch> {
    let file = safe_open_file(path, "application table")?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(batch_size.max(1)).build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    Ok(concat_batches(&schema, &batches)?)
}
