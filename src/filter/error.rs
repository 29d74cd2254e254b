//! Error helpers for the filter module
//!
//! Every rejection surfaces as [`DashboardError::InvalidFilter`] so callers
//! can tell a refused predicate apart from a load failure.

use crate::error::{DashboardError, Result};

/// Create a filter error with the given message
///
/// # Arguments
/// * `message` - The error message
pub fn filter_err<T>(message: impl AsRef<str>) -> Result<T> {
    Err(DashboardError::invalid_filter(message.as_ref()))
}

/// Create a column not found error
///
/// # Arguments
/// * `column_name` - The name of the column that was not found
pub fn column_not_found<T>(column_name: &str) -> Result<T> {
    filter_err(format!("column '{column_name}' is not in the dataset"))
}

/// Create a column type error
///
/// # Arguments
/// * `column_name` - The name of the column
/// * `expected_type` - The kind of column the predicate needs
pub fn column_type_error<T>(column_name: &str, expected_type: &str) -> Result<T> {
    filter_err(format!(
        "column '{column_name}' is not a {expected_type} column"
    ))
}

/// Create an error for a column excluded for missingness
pub fn column_excluded<T>(column_name: &str) -> Result<T> {
    filter_err(format!(
        "column '{column_name}' is excluded for excessive missing values"
    ))
}

/// Create an invalid range error
///
/// # Arguments
/// * `column_name` - The range column
/// * `min` - The rejected lower bound
/// * `max` - The rejected upper bound
pub fn invalid_range<T>(column_name: &str, min: f64, max: f64) -> Result<T> {
    filter_err(format!(
        "range [{min}, {max}] on '{column_name}' must have finite bounds with min <= max"
    ))
}
