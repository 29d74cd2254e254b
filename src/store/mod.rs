//! Dataset Store: the derived table, loaded and derived once, then shared
//! read-only by every session.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::info;

use crate::async_io::load_batch_async;
use crate::config::DashboardConfig;
use crate::derive::{self, DerivationReport};
use crate::error::Result;
use crate::schema::ColumnKind;
use crate::utils::arrow::{float_column, string_column};
use crate::utils::io::load_batch;

/// The immutable derived dataset
#[derive(Debug)]
pub struct Dataset {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
    report: DerivationReport,
    config: DashboardConfig,
}

impl Dataset {
    /// Derive a dataset from an in-memory raw batch
    ///
    /// # Errors
    /// Returns a schema error if a required raw column is absent
    pub fn from_raw(raw: &RecordBatch, config: DashboardConfig) -> Result<Self> {
        let derived = derive::derive(raw, &config)?;
        let schema = derived.batch.schema();
        let kinds = schema
            .fields()
            .iter()
            .map(|f| ColumnKind::classify(f.name(), f.data_type()))
            .collect();
        Ok(Self {
            batch: derived.batch,
            kinds,
            report: derived.report,
            config,
        })
    }

    /// The derived record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The derivation audit report
    #[must_use]
    pub const fn report(&self) -> &DerivationReport {
        &self.report
    }

    /// Configuration the dataset was derived with
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Role of a column, if present
    #[must_use]
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        let idx = self.batch.schema().index_of(column).ok()?;
        self.kinds.get(idx).copied()
    }

    /// Whether a column is present and not excluded for missingness
    #[must_use]
    pub fn is_available(&self, column: &str) -> bool {
        self.kind(column).is_some() && !self.report.is_excluded(column)
    }

    /// Available numeric columns in schema order, `TARGET` included
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_where(ColumnKind::is_numeric)
    }

    /// Available categorical columns in schema order
    #[must_use]
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_where(|k| k == ColumnKind::Categorical)
    }

    fn columns_where(&self, keep: impl Fn(ColumnKind) -> bool) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .zip(&self.kinds)
            .filter(|(f, k)| keep(**k) && !self.report.is_excluded(f.name()))
            .map(|(f, _)| f.name().clone())
            .collect()
    }

    /// Borrow a numeric column of the full dataset
    pub fn float(&self, column: &str) -> Result<&Float64Array> {
        float_column(&self.batch, column)
    }

    /// Borrow a categorical column of the full dataset
    pub fn strings(&self, column: &str) -> Result<&StringArray> {
        string_column(&self.batch, column)
    }
}

/// Shared handle on a loaded dataset
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dataset: Arc<Dataset>,
}

impl DatasetStore {
    /// Load and derive a CSV or Parquet file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or derivation fails
    pub fn load(path: &Path, config: DashboardConfig) -> Result<Self> {
        let raw = load_batch(path, &config)?;
        Self::from_raw(&raw, config)
    }

    /// Load and derive a file on the tokio runtime
    pub async fn load_async(path: &Path, config: DashboardConfig) -> Result<Self> {
        let raw = load_batch_async(path, &config).await?;
        Self::from_raw(&raw, config)
    }

    /// Derive a store from a batch already in memory
    pub fn from_raw(raw: &RecordBatch, config: DashboardConfig) -> Result<Self> {
        let dataset = Dataset::from_raw(raw, config)?;
        info!(
            "Dataset store ready: {} rows, {} columns",
            dataset.num_rows(),
            dataset.batch().num_columns()
        );
        Ok(Self {
            dataset: Arc::new(dataset),
        })
    }

    /// A shared reference to the dataset
    #[must_use]
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }
}
