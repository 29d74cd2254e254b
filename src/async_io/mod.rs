//! Async loading of the application table
//!
//! Parquet input streams through the async Parquet reader; CSV decoding is
//! CPU-bound and runs on tokio's blocking pool.

use std::path::Path;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::ParquetRecordBatchStreamBuilder;
use tokio::fs::File;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::utils::io::{InputFormat, read_csv};
use crate::utils::logging::{log_read_start, log_table_read};

/// Read a Parquet file asynchronously into a single record batch
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `batch_size` - Rows per decoded batch
pub async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<RecordBatch> {
    let file = File::open(path).await?;

    let builder = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size.max(1));
    let schema = builder.schema().clone();

    let stream = builder.build()?;
    let batches = stream.try_collect::<Vec<_>>().await?;

    Ok(concat_batches(&schema, &batches)?)
}

/// Load a CSV or Parquet file without blocking the async runtime
///
/// # Errors
/// Returns an error if the format is unsupported or reading fails
pub async fn load_batch_async(path: &Path, config: &DashboardConfig) -> Result<RecordBatch> {
    let start = Instant::now();
    log_read_start(path, true);

    let batch = match InputFormat::detect(path)? {
        InputFormat::Parquet => read_parquet_async(path, config.csv_batch_size).await?,
        InputFormat::Csv => {
            let owned = path.to_path_buf();
            let batch_size = config.csv_batch_size;
            let inference_rows = config.schema_inference_rows;
            tokio::task::spawn_blocking(move || read_csv(&owned, batch_size, inference_rows))
                .await
                .map_err(std::io::Error::other)??
        }
    };

    log_table_read(path, &batch, start.elapsed());
    Ok(batch)
}
