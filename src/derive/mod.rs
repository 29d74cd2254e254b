//! Derivation engine: turns the raw application table into the immutable
//! dataset every view is resolved against.
//!
//! Derivation runs exactly once per load. Imputation values, rare-category
//! mappings, winsorization bounds and income quartiles are all computed from
//! the full table here and never recomputed for a filtered view.

pub mod cleaning;
pub mod features;
pub mod report;

use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::schema::columns::{self, REQUIRED_RAW};
use crate::schema::{ColumnKind, normalize_batch, require_columns, require_numeric};
use crate::utils::arrow::downcast_array;
use crate::utils::logging::{log_derivation, log_excluded_column};

pub use report::{DerivationReport, FillValue, Imputation, MissingShare, RareCollapse, WinsorBounds};

/// Output of a derivation run
#[derive(Debug, Clone)]
pub struct Derivation {
    pub batch: RecordBatch,
    pub report: DerivationReport,
}

/// Mutable column table used while derivation rewrites columns
struct ColumnTable {
    names: Vec<String>,
    arrays: Vec<ArrayRef>,
}

impl ColumnTable {
    fn from_batch(batch: &RecordBatch) -> Self {
        Self {
            names: batch.schema().fields().iter().map(|f| f.name().clone()).collect(),
            arrays: batch.columns().to_vec(),
        }
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| DashboardError::missing_column(name))
    }

    fn float(&self, name: &str) -> Result<&Float64Array> {
        downcast_array::<Float64Array>(&self.arrays[self.index(name)?], name, "numeric")
    }

    /// Replace a column in place, or append it if absent
    fn set(&mut self, name: &str, array: ArrayRef) {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => self.arrays[idx] = array,
            None => {
                self.names.push(name.to_string());
                self.arrays.push(array);
            }
        }
    }

    fn kind(&self, idx: usize) -> ColumnKind {
        ColumnKind::classify(&self.names[idx], self.arrays[idx].data_type())
    }

    fn missingness(&self) -> Vec<MissingShare> {
        self.names
            .iter()
            .zip(&self.arrays)
            .map(|(name, array)| MissingShare {
                column: name.clone(),
                percent: cleaning::missing_percent(array.as_ref()),
            })
            .sorted_by(|a, b| {
                b.percent
                    .total_cmp(&a.percent)
                    .then_with(|| a.column.cmp(&b.column))
            })
            .collect()
    }

    fn into_batch(self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .names
            .iter()
            .zip(&self.arrays)
            .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
            .collect();
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), self.arrays)?)
    }
}

/// Derive the analysis dataset from a raw batch
///
/// # Arguments
/// * `raw` - The application table as loaded from disk
/// * `config` - Thresholds and constants for cleaning
///
/// # Returns
/// The derived batch (raw columns cleaned, derived columns appended) and the
/// report of every parameter derivation computed
///
/// # Errors
/// Returns [`DashboardError::MissingColumn`] naming the first required column
/// absent from the input, or [`DashboardError::ColumnType`] if one of them is
/// not numeric
pub fn derive(raw: &RecordBatch, config: &DashboardConfig) -> Result<Derivation> {
    let start = Instant::now();
    require_columns(&raw.schema(), &REQUIRED_RAW)?;

    let normalized = normalize_batch(raw)?;
    for column in REQUIRED_RAW {
        require_numeric(&normalized.schema(), column)?;
    }

    let mut table = ColumnTable::from_batch(&normalized);
    let mut report = DerivationReport {
        rows: normalized.num_rows(),
        ..DerivationReport::default()
    };

    add_features(&mut table, config, &mut report)?;
    report.missingness_before = table.missingness();

    exclude_sparse_columns(&table, config, &mut report);
    impute(&mut table, &mut report)?;
    collapse_rare(&mut table, config, &mut report)?;
    winsorize(&mut table, config, &mut report)?;

    let (brackets, quartiles) = cleaning::income_brackets(table.float(columns::AMT_INCOME_TOTAL)?);
    table.set(columns::INCOME_BRACKET, Arc::new(brackets));
    report.income_quartiles = quartiles;
    if let Some((q1, q3)) = quartiles {
        debug!("Income bracket cut points: Q1 = {q1:.2}, Q3 = {q3:.2}");
    }

    report.missingness_after = table.missingness();
    let batch = table.into_batch()?;

    log_derivation(&batch, &report, start.elapsed());
    Ok(Derivation { batch, report })
}

fn add_features(
    table: &mut ColumnTable,
    config: &DashboardConfig,
    report: &mut DerivationReport,
) -> Result<()> {
    let age = features::age_years(table.float(columns::DAYS_BIRTH)?, config.days_per_year);

    let days_employed = table.float(columns::DAYS_EMPLOYED)?;
    let sentinel_rows = days_employed
        .iter()
        .filter(|d| *d == Some(config.unemployed_sentinel))
        .count();
    let cleaned = features::clean_days_employed(days_employed, config.unemployed_sentinel);
    let employment = features::employment_years(&cleaned, config.days_per_year);

    let income = table.float(columns::AMT_INCOME_TOTAL)?;
    let credit = table.float(columns::AMT_CREDIT)?;
    let annuity = table.float(columns::AMT_ANNUITY)?;
    let dti = features::guarded_ratio(annuity, income);
    let lti = features::guarded_ratio(credit, income);
    let atc = features::guarded_ratio(annuity, credit);

    for (name, array) in [(columns::DTI, &dti), (columns::LOAN_TO_INCOME, &lti), (columns::ANNUITY_TO_CREDIT, &atc)] {
        debug!("Derived {name}: {} missing", features::null_count(array));
    }
    if sentinel_rows > 0 {
        report.notes.push(format!(
            "{sentinel_rows} rows carry the unemployed marker in {}; their tenure is missing",
            columns::DAYS_EMPLOYED
        ));
    }

    table.set(columns::DAYS_EMPLOYED, Arc::new(cleaned));
    table.set(columns::AGE_YEARS, Arc::new(age));
    table.set(columns::EMPLOYMENT_YEARS, Arc::new(employment));
    table.set(columns::DTI, Arc::new(dti));
    table.set(columns::LOAN_TO_INCOME, Arc::new(lti));
    table.set(columns::ANNUITY_TO_CREDIT, Arc::new(atc));
    Ok(())
}

fn exclude_sparse_columns(table: &ColumnTable, config: &DashboardConfig, report: &mut DerivationReport) {
    let limit = config.missing_exclusion_threshold * 100.0;
    report.excluded_columns = report
        .missingness_before
        .iter()
        .filter(|m| m.percent > limit && m.column != columns::TARGET && m.column != columns::SK_ID_CURR)
        .map(|m| m.column.clone())
        .sorted()
        .collect();

    for column in &report.excluded_columns {
        log_excluded_column(column, report.missing_before(column).unwrap_or(100.0), limit);
    }
    debug!("{} of {} columns kept", table.names.len() - report.excluded_columns.len(), table.names.len());
}

/// Columns eligible for imputation: kept raw features
fn imputable(table: &ColumnTable, report: &DerivationReport) -> Vec<usize> {
    (0..table.names.len())
        .filter(|&idx| {
            let name = &table.names[idx];
            matches!(table.kind(idx), ColumnKind::Numeric | ColumnKind::Categorical)
                && !columns::is_derived(name)
                && !report.is_excluded(name)
                && table.arrays[idx].null_count() > 0
        })
        .collect()
}

fn impute(table: &mut ColumnTable, report: &mut DerivationReport) -> Result<()> {
    let targets = imputable(table, report);

    let filled: Vec<Option<(usize, ArrayRef, Imputation)>> = targets
        .par_iter()
        .map(|&idx| -> Result<Option<(usize, ArrayRef, Imputation)>> {
            let name = &table.names[idx];
            let array = &table.arrays[idx];
            let missing = array.null_count();
            let result = match table.kind(idx) {
                ColumnKind::Numeric => {
                    let values = downcast_array::<Float64Array>(array, name, "numeric")?;
                    cleaning::impute_median(values).map(|(out, median)| {
                        (Arc::new(out) as ArrayRef, FillValue::Median(median))
                    })
                }
                _ => {
                    let values = downcast_array::<StringArray>(array, name, "categorical")?;
                    let (out, label) = cleaning::impute_mode(values);
                    Some((Arc::new(out) as ArrayRef, FillValue::Mode(label)))
                }
            };
            Ok(result.map(|(out, value)| {
                (
                    idx,
                    out,
                    Imputation {
                        column: name.clone(),
                        value,
                        filled: missing,
                    },
                )
            }))
        })
        .collect::<Result<_>>()?;

    for (idx, array, imputation) in filled.into_iter().flatten() {
        debug!(
            "Imputed {} missing values in '{}' with {:?}",
            imputation.filled, imputation.column, imputation.value
        );
        table.arrays[idx] = array;
        report.imputations.push(imputation);
    }
    Ok(())
}

fn collapse_rare(
    table: &mut ColumnTable,
    config: &DashboardConfig,
    report: &mut DerivationReport,
) -> Result<()> {
    let candidates: Vec<usize> = (0..table.names.len())
        .filter(|&idx| {
            table.kind(idx) == ColumnKind::Categorical
                && table.names[idx] != columns::INCOME_BRACKET
                && !report.is_excluded(&table.names[idx])
        })
        .collect();

    let collapsed: Vec<Option<(usize, StringArray, Vec<String>)>> = candidates
        .par_iter()
        .map(|&idx| -> Result<Option<(usize, StringArray, Vec<String>)>> {
            let name = &table.names[idx];
            let values = downcast_array::<StringArray>(&table.arrays[idx], name, "categorical")?;
            Ok(cleaning::collapse_rare(values, config.rare_category_share)
                .map(|(out, labels)| (idx, out, labels)))
        })
        .collect::<Result<_>>()?;

    for (idx, array, labels) in collapsed.into_iter().flatten() {
        let column = table.names[idx].clone();
        debug!("Collapsed {} rare categories of '{column}' into Other", labels.len());
        table.arrays[idx] = Arc::new(array);
        report.rare_collapses.push(RareCollapse { column, labels });
    }
    Ok(())
}

fn winsorize(
    table: &mut ColumnTable,
    config: &DashboardConfig,
    report: &mut DerivationReport,
) -> Result<()> {
    for column in &config.winsorized_columns {
        let Ok(idx) = table.index(column) else {
            continue;
        };
        if report.is_excluded(column) || !table.kind(idx).is_numeric() {
            continue;
        }

        let values = downcast_array::<Float64Array>(&table.arrays[idx], column, "numeric")?;
        let Some((out, lower, upper, clipped)) =
            cleaning::winsorize(values, config.winsor_lower, config.winsor_upper)
        else {
            continue;
        };
        debug!("Winsorized '{column}' to [{lower:.4}, {upper:.4}], {clipped} values clipped");
        table.arrays[idx] = Arc::new(out);
        report.winsor_bounds.push(WinsorBounds {
            column: column.clone(),
            lower,
            upper,
            clipped,
        });
    }
    Ok(())
}
