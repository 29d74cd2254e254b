//! Aggregates over a view shared by metrics, charts and insights.

use arrow::array::Array;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::Result;
use crate::stats;
use crate::view::View;

/// Default percentage and size of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub label: String,
    pub default_pct: f64,
    pub count: usize,
}

/// Percentage of view rows with a known outcome that defaulted
pub fn default_rate(view: &View) -> Result<Option<f64>> {
    let target: Vec<f64> = view.target()?.into_iter().flatten().collect();
    Ok(stats::mean(&target).map(|m| m * 100.0))
}

/// Number of defaulted rows
pub fn default_count(view: &View) -> Result<usize> {
    Ok(view
        .target()?
        .into_iter()
        .filter(|t| t.is_some_and(|t| t >= 0.5))
        .count())
}

/// Default percentage per category, highest rate first, ties by label
///
/// Rows missing either the label or the outcome are left out.
pub fn rate_by_category(view: &View, column: &str) -> Result<Vec<GroupRate>> {
    let labels = view.labels(column)?;
    let target = view.target()?;

    let mut groups: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
    for (label, t) in labels.into_iter().zip(target) {
        if let (Some(label), Some(t)) = (label, t) {
            let entry = groups.entry(label).or_default();
            entry.0 += 1;
            if t >= 0.5 {
                entry.1 += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(label, (count, defaults))| GroupRate {
            label: label.to_string(),
            default_pct: defaults as f64 / count as f64 * 100.0,
            count,
        })
        .sorted_by(|a, b| {
            stats::by_value_desc_then_name((a.label.as_str(), a.default_pct), (b.label.as_str(), b.default_pct))
        })
        .collect())
}

/// Label frequencies, most frequent first, ties by label
pub fn value_counts(view: &View, column: &str) -> Result<Vec<(String, usize)>> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for label in view.labels(column)?.into_iter().flatten() {
        *counts.entry(label).or_default() += 1;
    }
    Ok(counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(label, count)| (label.to_string(), count))
        .collect())
}

/// Percentage of all view rows whose numeric value satisfies `keep`;
/// missing values count as not satisfying it
pub fn share_where(view: &View, column: &str, keep: impl Fn(f64) -> bool) -> Result<Option<f64>> {
    if view.is_empty() {
        return Ok(None);
    }
    let hits = view
        .numbers(column)?
        .into_iter()
        .filter(|v| v.is_some_and(&keep))
        .count();
    Ok(Some(hits as f64 / view.len() as f64 * 100.0))
}

/// Percentage of all view rows carrying one of the labels
pub fn label_share(view: &View, column: &str, wanted: &[&str]) -> Result<Option<f64>> {
    if view.is_empty() {
        return Ok(None);
    }
    let hits = view
        .labels(column)?
        .into_iter()
        .filter(|l| l.is_some_and(|l| wanted.contains(&l)))
        .count();
    Ok(Some(hits as f64 / view.len() as f64 * 100.0))
}

/// Mean of a column among defaulted (`true`) or repaid (`false`) rows
pub fn conditional_mean(view: &View, column: &str, defaulted: bool) -> Result<Option<f64>> {
    let (repaid, defaults) = view.split_by_target(column)?;
    Ok(stats::mean(if defaulted { &defaults } else { &repaid }))
}

/// Default percentage of the rows selected by `mask` and of the rest
pub fn segment_default_rates(target: &[Option<f64>], mask: &[bool]) -> (Option<f64>, Option<f64>) {
    let (inside, outside): (Vec<_>, Vec<_>) = target
        .iter()
        .zip(mask)
        .filter_map(|(t, m)| t.map(|t| (t, *m)))
        .partition(|(_, m)| *m);
    let rate = |rows: Vec<(f64, bool)>| {
        let values: Vec<f64> = rows.into_iter().map(|(t, _)| t).collect();
        stats::mean(&values).map(|m| m * 100.0)
    };
    (rate(inside), rate(outside))
}

/// Missing percentage of a column over the view rows
pub fn missing_percent(view: &View, column: &str) -> Result<f64> {
    if view.is_empty() {
        return Ok(0.0);
    }
    let array = crate::utils::arrow::get_column_by_name(view.dataset().batch(), column)?;
    let missing = view
        .rows()
        .iter()
        .filter(|&&r| array.is_null(r as usize))
        .count();
    Ok(missing as f64 / view.len() as f64 * 100.0)
}
