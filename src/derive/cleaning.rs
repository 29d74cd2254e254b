//! Column cleaning steps: missingness, imputation, rare-category collapsing,
//! winsorization and income brackets.
//!
//! Each step takes one column and returns the rewritten column together with
//! the parameters it used, so the caller can record them in the report.

use std::collections::BTreeSet;

use arrow::array::{Array, Float64Array, StringArray};
use rustc_hash::FxHashMap;

use crate::schema::columns::{INCOME_BRACKETS, OTHER_LABEL, UNKNOWN_LABEL, XNA_LABEL};
use crate::stats;

/// Percentage of null entries in an array
#[must_use]
pub fn missing_percent(array: &dyn Array) -> f64 {
    if array.is_empty() {
        return 0.0;
    }
    array.null_count() as f64 / array.len() as f64 * 100.0
}

/// Fill nulls with the median of the non-null values
///
/// Returns `None` when the column has no observed value to take a median of.
#[must_use]
pub fn impute_median(array: &Float64Array) -> Option<(Float64Array, f64)> {
    let median = stats::median(&crate::utils::arrow::float_values(array))?;
    let filled = array.iter().map(|v| Some(v.unwrap_or(median))).collect();
    Some((filled, median))
}

/// Most frequent label, ties resolved by the lexicographically smallest label
#[must_use]
pub fn mode(array: &StringArray) -> Option<String> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for value in array.iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(label, _)| label.to_string())
}

/// Fill nulls with the column mode, or `"Unknown"` when nothing is observed
#[must_use]
pub fn impute_mode(array: &StringArray) -> (StringArray, String) {
    let fill = mode(array).unwrap_or_else(|| UNKNOWN_LABEL.to_string());
    let filled = array
        .iter()
        .map(|v| Some(v.unwrap_or(fill.as_str())))
        .collect();
    (filled, fill)
}

/// Relabel categories whose share of the non-null entries is below
/// `min_share` as `"Other"`; `"XNA"` is never collapsed
///
/// Returns `None` if no category is rare.
#[must_use]
pub fn collapse_rare(array: &StringArray, min_share: f64) -> Option<(StringArray, Vec<String>)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for value in array.iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return None;
    }

    let rare: BTreeSet<&str> = counts
        .iter()
        .filter(|(label, count)| {
            **label != XNA_LABEL && **label != OTHER_LABEL && (**count as f64 / total as f64) < min_share
        })
        .map(|(label, _)| *label)
        .collect();
    if rare.is_empty() {
        return None;
    }

    let collapsed = array
        .iter()
        .map(|v| v.map(|s| if rare.contains(s) { OTHER_LABEL } else { s }))
        .collect();
    Some((collapsed, rare.into_iter().map(ToString::to_string).collect()))
}

/// Clip values to the `lower`/`upper` percentiles of the non-null values
///
/// Returns the clipped column, both bounds and how many values moved.
#[must_use]
pub fn winsorize(array: &Float64Array, lower: f64, upper: f64) -> Option<(Float64Array, f64, f64, usize)> {
    let sorted = stats::sorted(&crate::utils::arrow::float_values(array));
    let lo = stats::quantile_sorted(&sorted, lower)?;
    let hi = stats::quantile_sorted(&sorted, upper)?;

    let mut clipped = 0;
    let out = array
        .iter()
        .map(|v| {
            v.map(|x| {
                let c = x.clamp(lo, hi);
                if c != x {
                    clipped += 1;
                }
                c
            })
        })
        .collect();
    Some((out, lo, hi, clipped))
}

/// Assign `Low` (at or below Q1), `High` (above Q3) or `Mid` from the global
/// quartiles of the income column
#[must_use]
pub fn income_brackets(income: &Float64Array) -> (StringArray, Option<(f64, f64)>) {
    let sorted = stats::sorted(&crate::utils::arrow::float_values(income));
    let quartiles = stats::quantile_sorted(&sorted, 0.25).zip(stats::quantile_sorted(&sorted, 0.75));
    let [low, mid, high] = INCOME_BRACKETS;

    let brackets = income
        .iter()
        .map(|v| {
            let (q1, q3) = quartiles?;
            v.map(|x| {
                if x <= q1 {
                    low
                } else if x > q3 {
                    high
                } else {
                    mid
                }
            })
        })
        .collect();
    (brackets, quartiles)
}
