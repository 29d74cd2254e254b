//! Overview & data quality metrics.

use crate::error::Result;
use crate::metrics::aggregate::{default_rate, missing_percent};
use crate::metrics::{EvalContext, Measure, MetricDefinition, MetricValue};
use crate::schema::columns;
use crate::stats;

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "total_applicants",
        label: "Total Applicants",
        definition: "Number of rows in the current view",
        required: &[],
        compute: total_applicants,
    },
    MetricDefinition {
        name: "default_rate",
        label: "Default Rate (%)",
        definition: "Share of applicants with TARGET = 1",
        required: &[columns::TARGET],
        compute: default_rate_metric,
    },
    MetricDefinition {
        name: "repaid_rate",
        label: "Repaid Rate (%)",
        definition: "Share of applicants with TARGET = 0",
        required: &[columns::TARGET],
        compute: repaid_rate,
    },
    MetricDefinition {
        name: "total_features",
        label: "Total Features",
        definition: "Columns in the dataset, excluding columns dropped for missingness",
        required: &[],
        compute: total_features,
    },
    MetricDefinition {
        name: "avg_missing_per_feature",
        label: "Avg Missing per Feature (%)",
        definition: "Mean over kept columns of the missing percentage within the view",
        required: &[],
        compute: avg_missing_per_feature,
    },
    MetricDefinition {
        name: "numeric_feature_count",
        label: "# Numerical Features",
        definition: "Kept numeric columns, TARGET included",
        required: &[],
        compute: numeric_feature_count,
    },
    MetricDefinition {
        name: "categorical_feature_count",
        label: "# Categorical Features",
        definition: "Kept categorical columns, identifier excluded",
        required: &[],
        compute: categorical_feature_count,
    },
    MetricDefinition {
        name: "median_age",
        label: "Median Age (Years)",
        definition: "Median of AGE_YEARS",
        required: &[columns::AGE_YEARS],
        compute: median_age,
    },
    MetricDefinition {
        name: "median_income",
        label: "Median Annual Income",
        definition: "Median of AMT_INCOME_TOTAL (winsorized)",
        required: &[columns::AMT_INCOME_TOTAL],
        compute: median_income,
    },
    MetricDefinition {
        name: "avg_credit",
        label: "Average Credit Amount",
        definition: "Mean of AMT_CREDIT (winsorized)",
        required: &[columns::AMT_CREDIT],
        compute: avg_credit,
    },
];

fn total_applicants(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::Count(ctx.view().len() as u64).into())
}

fn default_rate_metric(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(default_rate(ctx.view())?).into())
}

fn repaid_rate(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(default_rate(ctx.view())?.map(|r| 100.0 - r)).into())
}

/// Kept columns of the dataset
fn kept_columns(ctx: &EvalContext<'_>) -> Vec<String> {
    let dataset = ctx.view().dataset();
    dataset
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .filter(|name| !dataset.report().is_excluded(name))
        .collect()
}

fn total_features(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::Count(kept_columns(ctx).len() as u64).into())
}

fn avg_missing_per_feature(ctx: &EvalContext<'_>) -> Result<Measure> {
    let percents = kept_columns(ctx)
        .iter()
        .map(|c| missing_percent(ctx.view(), c))
        .collect::<Result<Vec<f64>>>()?;
    Ok(MetricValue::percent(stats::mean(&percents)).into())
}

fn numeric_feature_count(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::Count(ctx.view().dataset().numeric_columns().len() as u64).into())
}

fn categorical_feature_count(ctx: &EvalContext<'_>) -> Result<Measure> {
    let count = ctx.view().dataset().categorical_columns().len();
    Ok(MetricValue::Count(count as u64).into())
}

fn median_age(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(stats::median(&ctx.view().values(columns::AGE_YEARS)?)).into())
}

fn median_income(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(stats::median(&ctx.view().values(columns::AMT_INCOME_TOTAL)?)).into())
}

fn avg_credit(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(stats::mean(&ctx.view().values(columns::AMT_CREDIT)?)).into())
}
