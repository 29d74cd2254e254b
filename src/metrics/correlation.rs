//! Correlation and driver metrics.
//!
//! All of them read the view's correlation matrix, computed once per
//! evaluation context. A column is never ranked against itself.

use crate::correlation::{rank_asc, rank_desc};
use crate::error::Result;
use crate::metrics::{EvalContext, Measure, MetricDefinition, MetricValue, RankedEntry};
use crate::schema::columns;

/// Entries in the top positive / negative driver lists
pub const TOP_DRIVERS: usize = 5;

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "top5_positive_corr",
        label: "Top 5 +Corr with TARGET",
        definition: "Five features with the highest signed correlation with TARGET",
        required: &[columns::TARGET],
        compute: top_positive,
    },
    MetricDefinition {
        name: "top5_negative_corr",
        label: "Top 5 -Corr with TARGET",
        definition: "Five features with the lowest signed correlation with TARGET, lowest first",
        required: &[columns::TARGET],
        compute: top_negative,
    },
    MetricDefinition {
        name: "most_corr_with_income",
        label: "Most correlated with Income",
        definition: "Column with the largest |corr| with AMT_INCOME_TOTAL",
        required: &[columns::AMT_INCOME_TOTAL],
        compute: most_with_income,
    },
    MetricDefinition {
        name: "most_corr_with_credit",
        label: "Most correlated with Credit",
        definition: "Column with the largest |corr| with AMT_CREDIT",
        required: &[columns::AMT_CREDIT],
        compute: most_with_credit,
    },
    MetricDefinition {
        name: "corr_income_credit",
        label: "Corr(Income, Credit)",
        definition: "Correlation of AMT_INCOME_TOTAL and AMT_CREDIT",
        required: &[columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT],
        compute: corr_income_credit,
    },
    MetricDefinition {
        name: "corr_age_target",
        label: "Corr(Age, TARGET)",
        definition: "Correlation of AGE_YEARS with TARGET",
        required: &[columns::TARGET, columns::AGE_YEARS],
        compute: corr_age_target,
    },
    MetricDefinition {
        name: "corr_employment_target",
        label: "Corr(Employment Yrs, TARGET)",
        definition: "Correlation of EMPLOYMENT_YEARS with TARGET",
        required: &[columns::TARGET, columns::EMPLOYMENT_YEARS],
        compute: corr_employment_target,
    },
    MetricDefinition {
        name: "corr_family_size_target",
        label: "Corr(Family Size, TARGET)",
        definition: "Correlation of CNT_FAM_MEMBERS with TARGET",
        required: &[columns::TARGET, columns::CNT_FAM_MEMBERS],
        compute: corr_family_target,
    },
    MetricDefinition {
        name: "top5_abs_corr_share",
        label: "Variance Explained by Top 5 |corr| (%)",
        definition: "Heuristic: sum of the five largest |corr(feature, TARGET)| over the sum of all of them",
        required: &[columns::TARGET],
        compute: top5_abs_share,
    },
    MetricDefinition {
        name: "strong_corr_count",
        label: "|corr(feature, TARGET)| > threshold (count)",
        definition: "Features whose |corr| with TARGET exceeds the strong-correlation threshold",
        required: &[columns::TARGET],
        compute: strong_count,
    },
];

fn entries(ranked: &[(String, f64)], n: usize) -> Vec<RankedEntry> {
    ranked
        .iter()
        .take(n)
        .map(|(name, value)| RankedEntry::new(name.clone(), *value))
        .collect()
}

fn top_positive(ctx: &EvalContext<'_>) -> Result<Measure> {
    let mut ranked = ctx.target_correlations()?;
    rank_desc(&mut ranked);
    Ok(MetricValue::list(entries(&ranked, TOP_DRIVERS)).into())
}

fn top_negative(ctx: &EvalContext<'_>) -> Result<Measure> {
    let mut ranked = ctx.target_correlations()?;
    rank_asc(&mut ranked);
    Ok(MetricValue::list(entries(&ranked, TOP_DRIVERS)).into())
}

/// Other column with the largest absolute correlation, ties by name
fn most_correlated(ctx: &EvalContext<'_>, column: &str) -> Result<Measure> {
    let matrix = ctx.correlations()?;
    let mut by_abs: Vec<(String, f64)> = matrix
        .with_column(column)
        .into_iter()
        .map(|(name, r)| (name, r.abs()))
        .collect();
    rank_desc(&mut by_abs);
    let best = by_abs
        .first()
        .and_then(|(name, _)| matrix.get(name, column).map(|r| RankedEntry::new(name.clone(), r)));
    Ok(MetricValue::list(best.into_iter().collect()).into())
}

fn most_with_income(ctx: &EvalContext<'_>) -> Result<Measure> {
    most_correlated(ctx, columns::AMT_INCOME_TOTAL)
}

fn most_with_credit(ctx: &EvalContext<'_>) -> Result<Measure> {
    most_correlated(ctx, columns::AMT_CREDIT)
}

fn pair(ctx: &EvalContext<'_>, a: &str, b: &str) -> Result<Measure> {
    Ok(MetricValue::number(ctx.correlations()?.get(a, b)).into())
}

fn corr_income_credit(ctx: &EvalContext<'_>) -> Result<Measure> {
    pair(ctx, columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT)
}

fn corr_age_target(ctx: &EvalContext<'_>) -> Result<Measure> {
    pair(ctx, columns::AGE_YEARS, columns::TARGET)
}

fn corr_employment_target(ctx: &EvalContext<'_>) -> Result<Measure> {
    pair(ctx, columns::EMPLOYMENT_YEARS, columns::TARGET)
}

fn corr_family_target(ctx: &EvalContext<'_>) -> Result<Measure> {
    pair(ctx, columns::CNT_FAM_MEMBERS, columns::TARGET)
}

fn top5_abs_share(ctx: &EvalContext<'_>) -> Result<Measure> {
    let mut magnitudes: Vec<f64> = ctx
        .target_correlations()?
        .into_iter()
        .map(|(_, r)| r.abs())
        .collect();
    magnitudes.sort_by(|a, b| b.total_cmp(a));
    let total: f64 = magnitudes.iter().sum();
    if total <= 0.0 {
        return Ok(MetricValue::NotAvailable.into());
    }
    let top: f64 = magnitudes.iter().take(TOP_DRIVERS).sum();
    Ok(MetricValue::percent(Some(100.0 * top / total)).into())
}

fn strong_count(ctx: &EvalContext<'_>) -> Result<Measure> {
    let correlations = ctx.target_correlations()?;
    if correlations.is_empty() {
        return Ok(MetricValue::NotAvailable.into());
    }
    let threshold = ctx.config().strong_correlation;
    let count = correlations.iter().filter(|(_, r)| r.abs() > threshold).count();
    Ok(MetricValue::Count(count as u64).into())
}
