//! Error handling for the dashboard engine.
//!
//! Only conditions that halt processing are errors here. Invalid ratio
//! operands and empty views degrade to sentinel values instead and never
//! reach this type.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, deriving and querying a dataset
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by an Arrow kernel, reader or writer
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error reading a JSON configuration or writing a JSON report
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A column required by derivation is absent from the raw input
    #[error("Schema error: required column '{column}' is missing from the input")]
    MissingColumn {
        /// Name of the missing column
        column: String,
    },

    /// A column exists but carries an unexpected type
    #[error("Schema error: column '{column}' is not a {expected} column")]
    ColumnType {
        /// Name of the offending column
        column: String,
        /// Human readable expected kind
        expected: &'static str,
    },

    /// A filter predicate was rejected and left unapplied
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// No metric is registered under this name
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    /// No chart is registered under this name
    #[error("Unknown chart '{0}'")]
    UnknownChart(String),

    /// No page is registered under this number
    #[error("Unknown page {0} (pages are numbered 1 to 5)")]
    UnknownPage(usize),

    /// Input file extension is neither CSV nor Parquet
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl DashboardError {
    /// Create a missing-column schema error
    #[must_use]
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create an invalid-filter error
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
