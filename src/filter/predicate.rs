//! Filter predicates and their evaluation into boolean row masks.

use std::hash::{Hash, Hasher};

use arrow::array::{Array, BooleanArray, Float64Array};
use arrow::compute::kernels::cmp::{gt_eq, lt_eq};
use arrow::compute::{and, is_null, or, prep_null_mask_filter};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;

use crate::error::Result;
use crate::filter::error::{column_excluded, column_not_found, column_type_error, invalid_range};
use crate::schema::{ColumnKind, columns};
use crate::store::Dataset;
use crate::utils::arrow::{float_column, string_column};

/// Selected labels of a membership predicate
pub type Selection = SmallVec<[String; 4]>;

/// A constraint over one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Row's label is one of `values`; an empty selection constrains nothing
    Membership { column: String, values: Selection },
    /// `min <= value <= max`; missing values pass when `include_missing`
    Range {
        column: String,
        min: f64,
        max: f64,
        include_missing: bool,
    },
}

/// Whether a range on `column` admits missing values until told otherwise
///
/// Only employment tenure does: a missing tenure means "not employed", which
/// the dashboard shows unless the unemployed switch is turned off.
#[must_use]
pub fn missing_passes_by_default(column: &str) -> bool {
    column == columns::EMPLOYMENT_YEARS
}

impl Predicate {
    /// Membership predicate with the labels sorted and deduplicated
    #[must_use]
    pub fn membership<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Selection = values.into_iter().map(Into::into).collect();
        values.sort_unstable();
        values.dedup();
        Self::Membership {
            column: column.into(),
            values,
        }
    }

    /// Inclusive range predicate with the column's default missing-value rule
    #[must_use]
    pub fn range(column: impl Into<String>, min: f64, max: f64) -> Self {
        let column = column.into();
        let include_missing = missing_passes_by_default(&column);
        Self::Range {
            column,
            min,
            max,
            include_missing,
        }
    }

    /// The column this predicate constrains
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Membership { column, .. } | Self::Range { column, .. } => column,
        }
    }

    /// Whether the predicate admits every row
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Membership { values, .. } if values.is_empty())
    }

    /// Check the predicate against the dataset schema
    ///
    /// # Errors
    /// Returns [`crate::DashboardError::InvalidFilter`] if the column is
    /// unknown, excluded, of the wrong kind, or the range is not finite and
    /// ordered
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        let column = self.column();
        let Some(kind) = dataset.kind(column) else {
            return column_not_found(column);
        };
        if dataset.report().is_excluded(column) {
            return column_excluded(column);
        }

        match self {
            Self::Membership { .. } if kind != ColumnKind::Categorical => {
                column_type_error(column, "categorical")
            }
            Self::Range { .. } if !kind.is_numeric() => column_type_error(column, "numeric"),
            Self::Range { min, max, .. } if !(min.is_finite() && max.is_finite() && min <= max) => {
                invalid_range(column, *min, *max)
            }
            _ => Ok(()),
        }
    }

    /// Evaluate the predicate into a null-free row mask
    ///
    /// # Errors
    /// Returns an error if the column is missing or has the wrong type
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        match self {
            Self::Membership { column, values } => {
                let labels = string_column(batch, column)?;
                if values.is_empty() {
                    return Ok(BooleanArray::from(vec![true; labels.len()]));
                }
                let wanted: FxHashSet<&str> = values.iter().map(String::as_str).collect();
                Ok(labels
                    .iter()
                    .map(|v| Some(v.is_some_and(|s| wanted.contains(s))))
                    .collect())
            }
            Self::Range {
                column,
                min,
                max,
                include_missing,
            } => {
                let numbers = float_column(batch, column)?;
                let lower = gt_eq(numbers, &Float64Array::new_scalar(*min))?;
                let upper = lt_eq(numbers, &Float64Array::new_scalar(*max))?;
                let in_range = prep_null_mask_filter(&and(&lower, &upper)?);
                if *include_missing && numbers.null_count() > 0 {
                    Ok(or(&in_range, &is_null(numbers)?)?)
                } else {
                    Ok(in_range)
                }
            }
        }
    }

    /// Feed a stable representation of the predicate into a hasher
    pub fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Membership { column, values } => {
                0u8.hash(state);
                column.hash(state);
                values.hash(state);
            }
            Self::Range {
                column,
                min,
                max,
                include_missing,
            } => {
                1u8.hash(state);
                column.hash(state);
                min.to_bits().hash(state);
                max.to_bits().hash(state);
                include_missing.hash(state);
            }
        }
    }
}
