//! Demographics & household metrics.

use crate::error::Result;
use crate::metrics::aggregate::{conditional_mean, label_share, share_where, value_counts};
use crate::metrics::{EvalContext, Measure, MetricDefinition, MetricValue};
use crate::schema::columns;
use crate::stats;

/// Education levels counted as higher education
pub const HIGHER_EDUCATION: [&str; 2] = ["Higher education", "Academic degree"];
pub const MARRIED: &str = "Married";
pub const SINGLE: &str = "Single / not married";
pub const WITH_PARENTS: &str = "With parents";

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "gender_split",
        label: "Gender Split",
        definition: "Share of M and F among applicants with a recorded gender",
        required: &[columns::CODE_GENDER],
        compute: gender_split,
    },
    MetricDefinition {
        name: "avg_age_defaulters",
        label: "Avg Age - Defaulters",
        definition: "Mean AGE_YEARS among defaulters",
        required: &[columns::TARGET, columns::AGE_YEARS],
        compute: avg_age_defaulters,
    },
    MetricDefinition {
        name: "avg_age_non_defaulters",
        label: "Avg Age - Non-Defaulters",
        definition: "Mean AGE_YEARS among repaid applicants",
        required: &[columns::TARGET, columns::AGE_YEARS],
        compute: avg_age_non_defaulters,
    },
    MetricDefinition {
        name: "pct_with_children",
        label: "% With Children",
        definition: "Share of applicants with CNT_CHILDREN > 0",
        required: &[columns::CNT_CHILDREN],
        compute: pct_with_children,
    },
    MetricDefinition {
        name: "avg_family_size",
        label: "Avg Family Size",
        definition: "Mean CNT_FAM_MEMBERS",
        required: &[columns::CNT_FAM_MEMBERS],
        compute: avg_family_size,
    },
    MetricDefinition {
        name: "married_vs_single",
        label: "Married vs Single",
        definition: "Share of married and of single applicants",
        required: &[columns::NAME_FAMILY_STATUS],
        compute: married_vs_single,
    },
    MetricDefinition {
        name: "pct_higher_education",
        label: "% Higher Education (Bachelor+)",
        definition: "Share with higher education or an academic degree",
        required: &[columns::NAME_EDUCATION_TYPE],
        compute: pct_higher_education,
    },
    MetricDefinition {
        name: "pct_living_with_parents",
        label: "% Living With Parents",
        definition: "Share with housing type 'With parents'",
        required: &[columns::NAME_HOUSING_TYPE],
        compute: pct_living_with_parents,
    },
    MetricDefinition {
        name: "pct_currently_working",
        label: "% Currently Working",
        definition: "Share with a positive employment tenure; unemployed rows count as not working",
        required: &[columns::EMPLOYMENT_YEARS],
        compute: pct_currently_working,
    },
    MetricDefinition {
        name: "avg_employment_years",
        label: "Avg Employment Years",
        definition: "Mean EMPLOYMENT_YEARS among employed applicants",
        required: &[columns::EMPLOYMENT_YEARS],
        compute: avg_employment_years,
    },
];

fn gender_split(ctx: &EvalContext<'_>) -> Result<Measure> {
    let counts = value_counts(ctx.view(), columns::CODE_GENDER)?;
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Ok(MetricValue::NotAvailable.into());
    }
    let share = |label: &str| {
        let n = counts.iter().find(|(l, _)| l == label).map_or(0, |(_, n)| *n);
        n as f64 / total as f64 * 100.0
    };
    Ok(MetricValue::Text(format!("M {:.1}% | F {:.1}%", share("M"), share("F"))).into())
}

fn avg_age_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(conditional_mean(ctx.view(), columns::AGE_YEARS, true)?).into())
}

fn avg_age_non_defaulters(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(conditional_mean(ctx.view(), columns::AGE_YEARS, false)?).into())
}

fn pct_with_children(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(share_where(ctx.view(), columns::CNT_CHILDREN, |n| n > 0.0)?).into())
}

fn avg_family_size(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(stats::mean(&ctx.view().values(columns::CNT_FAM_MEMBERS)?)).into())
}

fn married_vs_single(ctx: &EvalContext<'_>) -> Result<Measure> {
    let view = ctx.view();
    let married = label_share(view, columns::NAME_FAMILY_STATUS, &[MARRIED])?;
    let single = label_share(view, columns::NAME_FAMILY_STATUS, &[SINGLE])?;
    Ok(match married.zip(single) {
        Some((m, s)) => MetricValue::Text(format!("{m:.1}% | {s:.1}%")).into(),
        None => MetricValue::NotAvailable.into(),
    })
}

fn pct_higher_education(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(label_share(ctx.view(), columns::NAME_EDUCATION_TYPE, &HIGHER_EDUCATION)?).into())
}

fn pct_living_with_parents(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(label_share(ctx.view(), columns::NAME_HOUSING_TYPE, &[WITH_PARENTS])?).into())
}

fn pct_currently_working(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::percent(share_where(ctx.view(), columns::EMPLOYMENT_YEARS, |y| y > 0.0)?).into())
}

fn avg_employment_years(ctx: &EvalContext<'_>) -> Result<Measure> {
    Ok(MetricValue::number(stats::mean(&ctx.view().values(columns::EMPLOYMENT_YEARS)?)).into())
}
