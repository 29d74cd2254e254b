//! Financial health & affordability metrics.

use crate::error::Result;
use crate::metrics::aggregate::{conditional_mean, share_where};
use crate::metrics::{EvalContext, Measure, MetricDefinition, MetricValue};
use crate::schema::columns;
use crate::stats;

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "avg_income",
        label: "Avg Annual Income",
        definition: "Mean AMT_INCOME_TOTAL (winsorized)",
        required: &[columns::AMT_INCOME_TOTAL],
        compute: avg_income,
    },
    MetricDefinition {
        name: "avg_annuity",
        label: "Avg Annuity",
        definition: "Mean AMT_ANNUITY (winsorized)",
        required: &[columns::AMT_ANNUITY],
        compute: avg_annuity,
    },
    MetricDefinition {
        name: "avg_goods_price",
        label: "Avg Goods Price",
        definition: "Mean AMT_GOODS_PRICE (winsorized)",
        required: &[columns::AMT_GOODS_PRICE],
        compute: avg_goods_price,
    },
    MetricDefinition {
        name: "avg_dti",
        label: "Avg DTI",
        definition: "Mean of AMT_ANNUITY / AMT_INCOME_TOTAL over rows where it is defined",
        required: &[columns::DTI],
        compute: avg_dti,
    },
    MetricDefinition {
        name: "avg_lti",
        label: "Avg LTI",
        definition: "Mean of AMT_CREDIT / AMT_INCOME_TOTAL over rows where it is defined",
        required: &[columns::LOAN_TO_INCOME],
        compute: avg_lti,
    },
    MetricDefinition {
        name: "income_gap",
        label: "Income Gap (Non-def - Def)",
        definition: "Mean income of repaid applicants minus mean income of defaulters",
        required: &[columns::TARGET, columns::AMT_INCOME_TOTAL],
        compute: income_gap,
    },
    MetricDefinition {
        name: "credit_gap",
        label: "Credit Gap (Non-def - Def)",
        definition: "Mean credit of repaid applicants minus mean credit of defaulters",
        required: &[columns::TARGET, columns::AMT_CREDIT],
        compute: credit_gap,
    },
    MetricDefinition {
        name: "pct_high_credit",
        label: "% High Credit",
        definition: "Share of applicants with AMT_CREDIT above the high-credit threshold",
        required: &[columns::AMT_CREDIT],
        compute: pct_high_credit,
    },
];

fn mean_of(ctx: &EvalContext<'_>, column: &str) -> Result<Measure> {
    Ok(MetricValue::number(stats::mean(&ctx.view().values(column)?)).into())
}

fn avg_income(ctx: &EvalContext<'_>) -> Result<Measure> {
    mean_of(ctx, columns::AMT_INCOME_TOTAL)
}

fn avg_annuity(ctx: &EvalContext<'_>) -> Result<Measure> {
    mean_of(ctx, columns::AMT_ANNUITY)
}

fn avg_goods_price(ctx: &EvalContext<'_>) -> Result<Measure> {
    mean_of(ctx, columns::AMT_GOODS_PRICE)
}

fn avg_dti(ctx: &EvalContext<'_>) -> Result<Measure> {
    mean_of(ctx, columns::DTI)
}

fn avg_lti(ctx: &EvalContext<'_>) -> Result<Measure> {
    mean_of(ctx, columns::LOAN_TO_INCOME)
}

/// Difference of the repaid and defaulted conditional means
fn gap(ctx: &EvalContext<'_>, column: &str) -> Result<Measure> {
    let repaid = conditional_mean(ctx.view(), column, false)?;
    let defaulted = conditional_mean(ctx.view(), column, true)?;
    let value = repaid.zip(defaulted).map(|(r, d)| r - d);
    Ok(MetricValue::number(value).into())
}

fn income_gap(ctx: &EvalContext<'_>) -> Result<Measure> {
    gap(ctx, columns::AMT_INCOME_TOTAL)
}

fn credit_gap(ctx: &EvalContext<'_>) -> Result<Measure> {
    gap(ctx, columns::AMT_CREDIT)
}

fn pct_high_credit(ctx: &EvalContext<'_>) -> Result<Measure> {
    let threshold = ctx.config().high_credit_threshold;
    let share = share_where(ctx.view(), columns::AMT_CREDIT, |c| c > threshold)?;
    Ok(Measure {
        value: MetricValue::percent(share),
        detail: Some(format!("threshold {threshold:.0}")),
    })
}
