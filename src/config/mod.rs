//! Configuration for the derivation engine and the metric/chart catalogs.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::error::util::safe_read_to_string;
use crate::schema::columns;

/// Environment variable overriding the CSV batch size
pub const BATCH_SIZE_ENV: &str = "CREDIT_LENS_BATCH_SIZE";

/// Configuration for deriving the dataset and shaping its summaries
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Divisor turning day counts into years
    pub days_per_year: f64,
    /// `DAYS_EMPLOYED` value meaning "not employed"
    pub unemployed_sentinel: f64,
    /// Columns missing above this fraction are excluded downstream
    pub missing_exclusion_threshold: f64,
    /// Categories below this population share collapse into "Other"
    pub rare_category_share: f64,
    /// Lower winsorization percentile
    pub winsor_lower: f64,
    /// Upper winsorization percentile
    pub winsor_upper: f64,
    /// Numeric columns clipped at the winsorization bounds
    pub winsorized_columns: Vec<String>,
    /// Upper bound on histogram bins
    pub max_histogram_bins: usize,
    /// Bins per axis of the joint density grid
    pub density_grid_bins: usize,
    /// Maximum rows kept for scatter-style charts
    pub sample_size: usize,
    /// Seed for sampling and jitter
    pub sample_seed: u64,
    /// Credit amount above which an application counts as high credit
    pub high_credit_threshold: f64,
    /// Loan-to-income level flagged in narrative insights
    pub lti_risk_threshold: f64,
    /// Debt-to-income level flagged in narrative insights
    pub dti_risk_threshold: f64,
    /// Absolute correlation counted as strong
    pub strong_correlation: f64,
    /// Rows per batch when reading CSV
    pub csv_batch_size: usize,
    /// Records sampled for CSV schema inference
    pub schema_inference_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            days_per_year: 365.25,
            unemployed_sentinel: 365_243.0,
            missing_exclusion_threshold: 0.60,
            rare_category_share: 0.01,
            winsor_lower: 0.01,
            winsor_upper: 0.99,
            winsorized_columns: [
                columns::AMT_INCOME_TOTAL,
                columns::AMT_CREDIT,
                columns::AMT_ANNUITY,
                columns::AMT_GOODS_PRICE,
                columns::DTI,
                columns::LOAN_TO_INCOME,
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            max_histogram_bins: 50,
            density_grid_bins: 40,
            sample_size: 50_000,
            sample_seed: 42,
            high_credit_threshold: 1_000_000.0,
            lti_risk_threshold: 6.0,
            dti_risk_threshold: 0.35,
            strong_correlation: 0.5,
            csv_batch_size: 8192,
            schema_inference_rows: 1000,
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "dashboard configuration")?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config.with_env_overrides())
    }

    /// Apply environment overrides on top of this configuration
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(batch_size) = get_batch_size() {
            self.csv_batch_size = batch_size;
        }
        self
    }
}

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var(BATCH_SIZE_ENV)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "sample_size": 10, "winsor_upper": 0.95 }"#).unwrap();
        assert_eq!(config.sample_size, 10);
        assert!((config.winsor_upper - 0.95).abs() < f64::EPSILON);
        assert!((config.days_per_year - 365.25).abs() < f64::EPSILON);
        assert_eq!(config.winsorized_columns.len(), 6);
    }
}
