//! IO utilities for reading the application table and exporting views.
//!
//! Input is one CSV or Parquet file; output is CSV (the download format) or
//! Parquet.

pub mod csv;
pub mod export;
pub mod parquet;

use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::utils::logging::{log_read_start, log_table_read};

pub use csv::{read_csv, read_csv_with_schema};
pub use export::{write_csv, write_parquet};
pub use parquet::read_parquet;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl InputFormat {
    /// Detect the format from a file extension
    pub fn detect(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet" | "pq") => Ok(Self::Parquet),
            _ => Err(DashboardError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read a whole input file into a single record batch
///
/// # Arguments
/// * `path` - Path to a `.csv` or `.parquet` file
/// * `config` - Batch size and schema inference settings
///
/// # Errors
/// Returns an error if the format is unsupported or reading fails
pub fn load_batch(path: &Path, config: &DashboardConfig) -> Result<RecordBatch> {
    let start = Instant::now();
    log_read_start(path, false);

    let batch = match InputFormat::detect(path)? {
        InputFormat::Csv => read_csv(path, config.csv_batch_size, config.schema_inference_rows)?,
        InputFormat::Parquet => read_parquet(path, config.csv_batch_size)?,
    };

    log_table_read(path, &batch, start.elapsed());
    Ok(batch)
}
