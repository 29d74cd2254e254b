//! Correlation matrices over the numeric columns of a view.
//!
//! Columns qualify when they are numeric, not excluded, have more than two
//! non-missing values in the view and a non-zero standard deviation. Each
//! pair uses the rows where both columns are present.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::stats;
use crate::view::View;

/// Correlation coefficient used by matrices and rankings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CorrelationMethod {
    /// Rank correlation with averaged ties
    #[default]
    Spearman,
    Pearson,
}

impl CorrelationMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spearman => "spearman",
            Self::Pearson => "pearson",
        }
    }

    /// Correlation of paired observations
    #[must_use]
    pub fn correlate(self, x: &[f64], y: &[f64]) -> Option<f64> {
        match self {
            Self::Spearman => stats::spearman(x, y),
            Self::Pearson => stats::pearson(x, y),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CorrelationMethod {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spearman" => Ok(Self::Spearman),
            "pearson" => Ok(Self::Pearson),
            other => Err(DashboardError::invalid_filter(format!(
                "unknown correlation method '{other}'"
            ))),
        }
    }
}

/// Symmetric correlation matrix; `None` where a pair has too few
/// overlapping observations or no variance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of the given columns over the view
    ///
    /// # Errors
    /// Returns an error if a column is absent or not numeric
    pub fn compute(view: &View, columns: &[String], method: CorrelationMethod) -> Result<Self> {
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|c| view.numbers(c))
            .collect::<Result<_>>()?;

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n).tuple_combinations().collect();
        let coefficients: Vec<Option<f64>> = pairs
            .par_iter()
            .map(|&(i, j)| pairwise(&data[i], &data[j], method))
            .collect();

        let mut values = vec![vec![None; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = Some(1.0);
        }
        for (&(i, j), r) in pairs.iter().zip(coefficients) {
            values[i][j] = r;
            values[j][i] = r;
        }

        debug!("Computed {method} correlation matrix over {n} columns and {} rows", view.len());
        Ok(Self {
            method,
            columns: columns.to_vec(),
            values,
        })
    }

    /// Matrix over every eligible numeric column of the view
    pub fn for_view(view: &View, method: CorrelationMethod) -> Result<Self> {
        Self::compute(view, &eligible_columns(view)?, method)
    }

    fn index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Coefficient of one pair
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.values[self.index(a)?][self.index(b)?]
    }

    /// Defined correlations of one column with every other column
    #[must_use]
    pub fn with_column(&self, column: &str) -> Vec<(String, f64)> {
        let Some(i) = self.index(column) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(j, name)| self.values[i][j].map(|r| (name.clone(), r)))
            .collect()
    }
}

/// Correlation over the rows where both series are present
#[must_use]
pub fn pairwise(x: &[Option<f64>], y: &[Option<f64>], method: CorrelationMethod) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 3 {
        return None;
    }
    method.correlate(&xs, &ys)
}

/// Numeric columns that can take part in a correlation over this view
pub fn eligible_columns(view: &View) -> Result<Vec<String>> {
    let mut eligible = Vec::new();
    for column in view.dataset().numeric_columns() {
        let values = view.values(&column)?;
        if values.len() > 2 && stats::std_dev(&values).is_some_and(|sd| sd > 0.0) {
            eligible.push(column);
        }
    }
    Ok(eligible)
}

/// Sort `(name, value)` entries by value descending, name ascending on ties
pub fn rank_desc(entries: &mut [(String, f64)]) {
    entries.sort_by(|a, b| stats::by_value_desc_then_name((a.0.as_str(), a.1), (b.0.as_str(), b.1)));
}

/// Sort `(name, value)` entries by value ascending, name ascending on ties
pub fn rank_asc(entries: &mut [(String, f64)]) {
    entries.sort_by(|a, b| stats::by_value_asc_then_name((a.0.as_str(), a.1), (b.0.as_str(), b.1)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_drops_incomplete_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), None, Some(10.0)];
        let r = pairwise(&x, &y, CorrelationMethod::Pearson).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(pairwise(&x[..2], &y[..2], CorrelationMethod::Spearman).is_none());
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("Pearson".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Pearson);
        assert!("kendall".parse::<CorrelationMethod>().is_err());
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let mut entries = vec![("b".to_string(), 0.5), ("a".to_string(), 0.5), ("c".to_string(), 0.9)];
        rank_desc(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        rank_asc(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
