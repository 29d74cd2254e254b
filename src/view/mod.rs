//! Views: read-only row subsets of the shared dataset.
//!
//! A view holds the dataset handle and the matching row indices, never a
//! copy of the data. Column accessors gather values for the view's rows in
//! dataset order.

use std::io::Write;
use std::sync::Arc;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::schema::columns;
use crate::store::Dataset;
use crate::utils::arrow::take_rows;
use crate::utils::io::{write_csv, write_parquet};

/// Rows of the dataset matching a filter state
#[derive(Debug, Clone)]
pub struct View {
    dataset: Arc<Dataset>,
    rows: Arc<[u32]>,
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.dataset, &other.dataset) && self.rows == other.rows
    }
}

impl View {
    #[must_use]
    pub fn new(dataset: Arc<Dataset>, rows: Vec<u32>) -> Self {
        Self {
            dataset,
            rows: rows.into(),
        }
    }

    /// A view over every row
    #[must_use]
    pub fn all(dataset: Arc<Dataset>) -> Self {
        let rows = (0..dataset.num_rows() as u32).collect();
        Self::new(dataset, rows)
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Row indices into the dataset, ascending
    #[must_use]
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the unfiltered dataset
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.dataset.num_rows()
    }

    /// Whether a column is present and not excluded
    #[must_use]
    pub fn has(&self, column: &str) -> bool {
        self.dataset.is_available(column)
    }

    /// Numeric values of a column for every view row
    pub fn numbers(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let array = self.dataset.float(column)?;
        Ok(self
            .rows
            .iter()
            .map(|&r| {
                let r = r as usize;
                (!array.is_null(r)).then(|| array.value(r))
            })
            .collect())
    }

    /// Non-missing numeric values of a column
    pub fn values(&self, column: &str) -> Result<Vec<f64>> {
        Ok(self.numbers(column)?.into_iter().flatten().collect())
    }

    /// Labels of a categorical column for every view row
    pub fn labels(&self, column: &str) -> Result<Vec<Option<&str>>> {
        let array = self.dataset.strings(column)?;
        Ok(self
            .rows
            .iter()
            .map(|&r| {
                let r = r as usize;
                (!array.is_null(r)).then(|| array.value(r))
            })
            .collect())
    }

    /// Default flags for every view row
    pub fn target(&self) -> Result<Vec<Option<f64>>> {
        self.numbers(columns::TARGET)
    }

    /// Pairs of `(value, default flag)` where both are present
    pub fn with_target(&self, column: &str) -> Result<Vec<(f64, bool)>> {
        let values = self.numbers(column)?;
        let target = self.target()?;
        Ok(values
            .into_iter()
            .zip(target)
            .filter_map(|(v, t)| Some((v?, t? >= 0.5)))
            .collect())
    }

    /// Non-missing values of a column split into `(repaid, defaulted)`
    pub fn split_by_target(&self, column: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let (defaulted, repaid): (Vec<_>, Vec<_>) =
            self.with_target(column)?.into_iter().partition(|(_, d)| *d);
        Ok((
            repaid.into_iter().map(|(v, _)| v).collect(),
            defaulted.into_iter().map(|(v, _)| v).collect(),
        ))
    }

    /// Materialize the view's rows as a batch with the dataset schema
    pub fn to_batch(&self) -> Result<RecordBatch> {
        take_rows(self.dataset.batch(), &self.rows)
    }

    /// Write the view as CSV with a header row
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv(&self.to_batch()?, writer)
    }

    /// Write the view as Parquet
    pub fn export_parquet<W: Write + Send>(&self, writer: W) -> Result<()> {
        write_parquet(&self.to_batch()?, writer)
    }
}
