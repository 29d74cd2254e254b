//! Filter State: the conjunction of active predicates plus the per-page view
//! options, owned by one session.
//!
//! Every mutation validates first and leaves the state untouched when it
//! fails. An empty state admits every row.

pub mod controls;
pub mod error;
pub mod predicate;
pub mod resolve;

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use log::debug;
use rustc_hash::FxHasher;
use serde::Serialize;

use crate::correlation::CorrelationMethod;
use crate::error::{DashboardError, Result};
use crate::store::Dataset;
use crate::utils::arrow::float_values;

pub use controls::{CategoryControl, FilterControls, RangeControl, filter_controls};
pub use predicate::{Predicate, Selection};
pub use resolve::resolve;

/// Smallest and largest accepted correlation top-N
pub const TOP_N_RANGE: std::ops::RangeInclusive<usize> = 5..=40;
/// Default number of features in the target-correlation bar chart
pub const DEFAULT_TOP_N: usize = 20;

/// Display options that shape charts without narrowing the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewOptions {
    pub method: CorrelationMethod,
    pub top_n: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// The active predicates, at most one per column, and the view options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    predicates: BTreeMap<String, Predicate>,
    options: ViewOptions,
}

impl FilterState {
    /// An empty state admitting every row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active predicates ordered by column name
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.values()
    }

    /// The predicate on a column, if any
    #[must_use]
    pub fn predicate(&self, column: &str) -> Option<&Predicate> {
        self.predicates.get(column)
    }

    /// Number of active predicates
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether no predicate is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub const fn options(&self) -> ViewOptions {
        self.options
    }

    /// Validate and install a predicate, replacing any prior one on its column
    ///
    /// An unconstrained predicate (empty selection) removes the column's
    /// predicate instead.
    ///
    /// # Errors
    /// Returns [`crate::DashboardError::InvalidFilter`] and leaves the state
    /// unchanged if validation fails
    pub fn set(&mut self, dataset: &Dataset, predicate: Predicate) -> Result<()> {
        if let Err(e) = predicate.validate(dataset) {
            log::warn!("Rejected filter: {e}");
            return Err(e);
        }
        let column = predicate.column().to_string();
        if predicate.is_unconstrained() {
            self.predicates.remove(&column);
        } else {
            debug!("Filter on '{column}' set to {predicate:?}");
            self.predicates.insert(column, predicate);
        }
        Ok(())
    }

    /// Select categories of a column; an empty selection clears it
    pub fn set_categories<I, S>(&mut self, dataset: &Dataset, column: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(dataset, Predicate::membership(column, values))
    }

    /// Restrict a numeric column to `[min, max]`
    ///
    /// An existing range keeps its missing-value switch; a new one starts
    /// from [`predicate::missing_passes_by_default`].
    pub fn set_range(&mut self, dataset: &Dataset, column: &str, min: f64, max: f64) -> Result<()> {
        let predicate = match self.predicates.get(column) {
            Some(Predicate::Range {
                include_missing, ..
            }) => Predicate::Range {
                column: column.to_string(),
                min,
                max,
                include_missing: *include_missing,
            },
            _ => Predicate::range(column, min, max),
        };
        self.set(dataset, predicate)
    }

    /// Let rows with a missing value in a range column through or not
    ///
    /// Without an existing range on the column, the range spans the
    /// column's observed values.
    pub fn set_include_missing(&mut self, dataset: &Dataset, column: &str, include: bool) -> Result<()> {
        let (min, max) = match self.predicates.get(column) {
            Some(Predicate::Range { min, max, .. }) => (*min, *max),
            _ => {
                let values = dataset
                    .float(column)
                    .map(float_values)
                    .map_err(|_| {
                        DashboardError::invalid_filter(format!("column '{column}' cannot take a range"))
                    })?;
                crate::stats::min_max(&values).unwrap_or((0.0, 0.0))
            }
        };
        self.set(
            dataset,
            Predicate::Range {
                column: column.to_string(),
                min,
                max,
                include_missing: include,
            },
        )
    }

    /// Add the label to the column's selection, or remove it if present
    pub fn toggle_category(&mut self, dataset: &Dataset, column: &str, value: &str) -> Result<()> {
        let mut selection: Selection = match self.predicates.get(column) {
            Some(Predicate::Membership { values, .. }) => values.clone(),
            _ => Selection::new(),
        };
        if let Some(pos) = selection.iter().position(|v| v == value) {
            selection.remove(pos);
        } else {
            selection.push(value.to_string());
        }
        self.set(dataset, Predicate::membership(column, selection))
    }

    /// Drop the predicate on one column
    pub fn clear(&mut self, column: &str) -> bool {
        self.predicates.remove(column).is_some()
    }

    /// Return to the no-constraint state with default view options
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Choose the correlation method
    pub fn set_method(&mut self, method: CorrelationMethod) {
        self.options.method = method;
    }

    /// Choose how many features the target-correlation chart shows
    ///
    /// # Errors
    /// Returns [`crate::DashboardError::InvalidFilter`] outside `5..=40`
    pub fn set_top_n(&mut self, top_n: usize) -> Result<()> {
        if !TOP_N_RANGE.contains(&top_n) {
            return error::filter_err(format!(
                "top-N must be between {} and {}, got {top_n}",
                TOP_N_RANGE.start(),
                TOP_N_RANGE.end()
            ));
        }
        self.options.top_n = top_n;
        Ok(())
    }

    /// Stable hash of the predicates alone, which determine row membership
    #[must_use]
    pub fn predicate_fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.predicates.len().hash(&mut hasher);
        for predicate in self.predicates.values() {
            predicate.hash_into(&mut hasher);
        }
        hasher.finish()
    }

    /// Stable hash of the whole state, used as a memoization key
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.predicate_fingerprint().hash(&mut hasher);
        self.options.hash(&mut hasher);
        hasher.finish()
    }
}
