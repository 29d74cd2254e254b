//! Export of a batch as CSV or Parquet bytes.

use std::io::Write;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::error::Result;

/// Write a batch as CSV with a header row
pub fn write_csv<W: Write>(batch: &RecordBatch, writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().with_header(true).build(writer);
    csv_writer.write(batch)?;
    Ok(())
}

/// Write a batch as a single Parquet file
pub fn write_parquet<W: Write + Send>(batch: &RecordBatch, writer: W) -> Result<()> {
    let mut parquet_writer = ArrowWriter::try_new(writer, batch.schema(), None)?;
    parquet_writer.write(batch)?;
    parquet_writer.close()?;
    Ok(())
}
