//! Audit record of everything the derivation engine did to the raw table.

use serde::Serialize;

/// Missing-value percentage of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingShare {
    pub column: String,
    /// Percentage in `[0, 100]`
    pub percent: f64,
}

/// Fill value used for a column's missing entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillValue {
    Median(f64),
    Mode(String),
}

/// One imputed column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub value: FillValue,
    /// Number of entries that were filled
    pub filled: usize,
}

/// Winsorization bounds applied to one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinsorBounds {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    /// Number of values moved onto a bound
    pub clipped: usize,
}

/// Categories of one column relabeled as "Other"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RareCollapse {
    pub column: String,
    /// Collapsed labels, sorted
    pub labels: Vec<String>,
}

/// Everything derivation computed once from the full, unfiltered table
#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivationReport {
    pub rows: usize,
    pub missingness_before: Vec<MissingShare>,
    pub missingness_after: Vec<MissingShare>,
    pub excluded_columns: Vec<String>,
    pub imputations: Vec<Imputation>,
    pub winsor_bounds: Vec<WinsorBounds>,
    pub rare_collapses: Vec<RareCollapse>,
    /// First and third quartile of the winsorized income
    pub income_quartiles: Option<(f64, f64)>,
    pub notes: Vec<String>,
}

impl DerivationReport {
    /// Whether a column was excluded for excessive missingness
    #[must_use]
    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_columns.iter().any(|c| c == column)
    }

    /// Pre-imputation missing percentage of a column
    #[must_use]
    pub fn missing_before(&self, column: &str) -> Option<f64> {
        self.missingness_before
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.percent)
    }

    /// The `n` columns with the highest pre-imputation missingness
    #[must_use]
    pub fn top_missing(&self, n: usize) -> &[MissingShare] {
        &self.missingness_before[..n.min(self.missingness_before.len())]
    }
}
