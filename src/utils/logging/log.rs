//! Log lines for the load and derivation milestones.
//!
//! Reading the table and deriving the dataset happen once per session, so
//! their messages share one format and always carry row and column counts.

use std::path::Path;
use std::time::Duration;

use arrow::record_batch::RecordBatch;

use crate::derive::DerivationReport;

/// Announce that the application table is being read
pub fn log_read_start(path: &Path, asynchronous: bool) {
    let mode = if asynchronous { " (async)" } else { "" };
    log::info!("Reading application table{mode}: {}", path.display());
}

/// Report the raw table shape after reading
pub fn log_table_read(path: &Path, batch: &RecordBatch, elapsed: Duration) {
    log::info!(
        "Read {} rows x {} columns from {} in {elapsed:?}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );
}

/// Report the derived dataset shape and what derivation dropped or filled
pub fn log_derivation(batch: &RecordBatch, report: &DerivationReport, elapsed: Duration) {
    log::info!(
        "Derived dataset with {} rows and {} columns ({} excluded, {} imputed) in {elapsed:?}",
        batch.num_rows(),
        batch.num_columns(),
        report.excluded_columns.len(),
        report.imputations.len()
    );
}

/// Warn about a column left out of every metric and chart
pub fn log_excluded_column(column: &str, missing_pct: f64, limit_pct: f64) {
    log::warn!("Excluding column '{column}': {missing_pct:.1}% missing exceeds {limit_pct:.0}%");
}
