//! Target & risk segmentation metrics.

use crate::error::Result;
use crate::metrics::aggregate::{conditional_mean, default_count, rate_by_category};
use crate::metrics::{EvalContext, Measure, MetricDefinition, MetricValue};
use crate::schema::columns;

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "total_defaults",
        label: "Total Defaults",
        definition: "Number of rows with TARGET = 1",
        required: &[columns::TARGET],
        compute: total_defaults,
    },
    MetricDefinition {
        name: "max_default_rate_gender",
        label: "Default Rate by Gender (max)",
        definition: "Highest default rate among gender groups",
        required: &[columns::TARGET, columns::CODE_GENDER],
        compute: max_rate_gender,
    },
    MetricDefinition {
        name: "max_default_rate_education",
        label: "Default Rate by Education (max)",
        definition: "Highest default rate among education groups",
        required: &[columns::TARGET, columns::NAME_EDUCATION_TYPE],
        compute: max_rate_education,
    },
    MetricDefinition {
        name: "max_default_rate_family",
        label: "Default Rate by Family (max)",
        definition: "Highest default rate among family status groups",
        required: &[columns::TARGET, columns::NAME_FAMILY_STATUS],
        compute: max_rate_family,
    },
    MetricDefinition {
        name: "max_default_rate_housing",
        label: "Default Rate by Housing (max)",
        definition: "Highest default rate among housing type groups",
        required: &[columns::TARGET, columns::NAME_HOUSING_TYPE],
        compute: max_rate_housing,
    },
    MetricDefinition {
        name: "avg_income_defaulters",
        label: "Avg Income - Defaulters",
        definition: "Mean AMT_INCOME_TOTAL among defaulters",
        required: &[columns::TARGET, columns::AMT_INCOME_TOTAL],
        compute: avg_income_defaulters,
    },
    MetricDefinition {
        name: "avg_credit_defaulters",
        label: "Avg Credit - Defaulters",
        definition: "Mean AMT_CREDIT among defaulters",
        required: &[columns::TARGET, columns::AMT_CREDIT],
        compute: avg_credit_defaulters,
    },
    MetricDefinition {
        name: "avg_annuity_defaulters",
        label: "Avg Annuity - Defaulters",
        definition: "Mean AMT_ANNUITY among defaulters",
        required: &[columns::TARGET, columns::AMT_ANNUITY],
        compute: avg_annuity_defaulters,
    },
    MetricDefinition {
        name: "avg_employment_years_defaulters",
        label: "Avg Employment Years - Defaulters",
        definition: "Mean EMPLOYMENT_YEARS among employed defaulters",
        required: &[columns::TARGET, columns::EMPLOYMENT_YEARS],
        compute: avg_employment_defaulters,
    },
];

fn total_defaults(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::Count(default_count(ctx.view())? as u64).into())
}

/// Highest group default rate, with the group label and size as detail
fn max_rate(ctx: &EvalContext<'_>, column: &str) -> Result<Measure> {
    let groups = rate_by_category(ctx.view(), column)?;
    Ok(match groups.first() {
        Some(top) => Measure {
            value: MetricValue::percent(Some(top.default_pct)),
            detail: Some(format!("{} | n={}", top.label, top.count)),
        },
        None => MetricValue::NotAvailable.into(),
    })
}

fn max_rate_gender(ctx: &EvalContext<'_>) -> Result<Measure> {
    max_rate(ctx, columns::CODE_GENDER)
}

fn max_rate_education(ctx: &EvalContext<'_>) -> Result<Measure> {
    max_rate(ctx, columns::NAME_EDUCATION_TYPE)
}

fn max_rate_family(ctx: &EvalContext<'_>) -> Result<Measure> {
    max_rate(ctx, columns::NAME_FAMILY_STATUS)
}

fn max_rate_housing(ctx: &EvalContext<'_>) -> Result<Measure> {
    max_rate(ctx, columns::NAME_HOUSING_TYPE)
}

fn defaulter_mean(ctx: &EvalContext<'_>, column: &str) -> Result<Measure> {
    Ok(MetricValue::number(conditional_mean(ctx.view(), column, true)?).into())
}

fn avg_income_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    defaulter_mean(ctx, columns::AMT_INCOME_TOTAL)
}

fn avg_credit_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    defaulter_mean(ctx, columns::AMT_CREDIT)
}

fn avg_annuity_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    defaulter_mean(ctx, columns::AMT_ANNUITY)
}

fn avg_employment_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    defaulter_mean(ctx, columns::EMPLOYMENT_YEARS)
}
