//! Narrative insights: short bullet strings describing the current view.
//!
//! Every page has its own set of observations. Observations whose columns
//! are unavailable are skipped, and a page with nothing to say gets a
//! fallback line so the list is never empty.

use crate::correlation::{CorrelationMethod, pairwise, rank_asc, rank_desc};
use crate::error::{DashboardError, Result};
use crate::metrics::EvalContext;
use crate::metrics::aggregate::{default_rate, rate_by_category, segment_default_rates};
use crate::schema::columns;
use crate::stats;
use crate::view::View;

/// Notice returned for a view without rows
pub const NO_ROWS: &str = "No rows match the current filters.";

const SEGMENT_COLUMNS: [&str; 4] = [
    columns::CODE_GENDER,
    columns::NAME_EDUCATION_TYPE,
    columns::NAME_FAMILY_STATUS,
    columns::NAME_HOUSING_TYPE,
];

/// Narrative bullets for one page over the context's view
///
/// # Errors
/// Returns [`DashboardError::UnknownPage`] for a page outside 1..=5
pub fn page_insights(page: usize, ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    if !(1..=5).contains(&page) {
        return Err(DashboardError::UnknownPage(page));
    }
    if ctx.view().is_empty() {
        return Ok(vec![NO_ROWS.to_string()]);
    }

    let (mut bullets, fallback) = match page {
        1 => (overview(ctx)?, "Dataset loaded and filtered; no additional notes."),
        2 => (segmentation(ctx)?, "No categorical risk hotspots under current filters."),
        3 => (demographics(ctx)?, "No strong demographic or household signals under current filters."),
        4 => (affordability(ctx)?, "Affordability thresholds show no strong divergence under current filters."),
        _ => (drivers(ctx)?, "No dominant drivers under current filters."),
    };
    if bullets.is_empty() {
        bullets.push(fallback.to_string());
    }
    Ok(bullets)
}

fn overview(ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    let view = ctx.view();
    let mut out = Vec::new();

    if view.has(columns::TARGET) {
        if let Some(rate) = default_rate(view)? {
            out.push(format!("Portfolio default rate under current filters is {rate:.2}%."));
        }
    }

    if view.has(columns::AMT_INCOME_TOTAL) {
        if let Some(skew) = stats::skewness(&view.values(columns::AMT_INCOME_TOTAL)?) {
            let shape = if skew > 1.0 {
                "right-skewed"
            } else if skew < -1.0 {
                "left-skewed"
            } else {
                "roughly symmetric"
            };
            out.push(format!(
                "Income distribution appears {shape} (skew={skew:.2}); values are winsorized at the tails."
            ));
        }
    }

    let top = view.dataset().report().top_missing(3);
    if !top.is_empty() {
        let listed = top
            .iter()
            .map(|m| format!("{} ({:.1}%)", m.column, m.percent))
            .collect::<Vec<_>>()
            .join(", ");
        out.push(format!(
            "Highest pre-imputation missingness: {listed}. These were imputed or excluded."
        ));
    }
    Ok(out)
}

fn segmentation(ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    let view = ctx.view();
    let mut out = Vec::new();
    if !view.has(columns::TARGET) {
        return Ok(out);
    }

    for column in SEGMENT_COLUMNS {
        if !view.has(column) {
            continue;
        }
        if let Some(top) = rate_by_category(view, column)?.first() {
            out.push(format!(
                "Highest default in {column} = {} at {:.2}% (n={}).",
                top.label, top.default_pct, top.count
            ));
        }
    }
    Ok(out)
}

fn demographics(ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    let view = ctx.view();
    let mut out = Vec::new();
    if !view.has(columns::TARGET) {
        return Ok(out);
    }

    if view.has(columns::AGE_YEARS) {
        let (repaid, defaulted) = view.split_by_target(columns::AGE_YEARS)?;
        if let (Some(def), Some(rep)) = (stats::median(&defaulted), stats::median(&repaid)) {
            let direction = if rep - def > 0.0 { "younger" } else { "older" };
            out.push(format!(
                "Defaulters skew {direction} (median age: default {def:.1} vs repaid {rep:.1})."
            ));
        }
    }

    if view.has(columns::CNT_CHILDREN) && view.has(columns::CNT_FAM_MEMBERS) {
        let target = view.target()?;
        let children = view.numbers(columns::CNT_CHILDREN)?;
        let family = view.numbers(columns::CNT_FAM_MEMBERS)?;
        let method = CorrelationMethod::Spearman;
        if let (Some(c), Some(f)) = (
            pairwise(&children, &target, method),
            pairwise(&family, &target, method),
        ) {
            out.push(format!(
                "Correlation with default: children ({c:.2}) and family size ({f:.2})."
            ));
        }
    }

    if view.has(columns::EMPLOYMENT_YEARS) {
        let working = view
            .numbers(columns::EMPLOYMENT_YEARS)?
            .into_iter()
            .filter(|v| v.is_some_and(|v| v > 0.0))
            .count();
        let rate = working as f64 / view.len() as f64 * 100.0;
        out.push(format!("About {rate:.1}% show active employment tenure."));
    }
    Ok(out)
}

/// Default rates inside and outside the rows where `column > threshold`
fn threshold_segment(view: &View, column: &str, threshold: f64) -> Result<Option<(f64, Option<f64>)>> {
    let mask: Vec<bool> = view
        .numbers(column)?
        .into_iter()
        .map(|v| v.is_some_and(|v| v > threshold))
        .collect();
    if !mask.contains(&true) {
        return Ok(None);
    }
    let (inside, outside) = segment_default_rates(&view.target()?, &mask);
    Ok(inside.map(|i| (i, outside)))
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "N/A".to_string(), |r| format!("{r:.2}%"))
}

fn affordability(ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    let view = ctx.view();
    let config = ctx.config();
    let mut out = Vec::new();
    if !view.has(columns::TARGET) {
        return Ok(out);
    }

    if view.has(columns::LOAN_TO_INCOME) {
        let threshold = config.lti_risk_threshold;
        if let Some((high, rest)) = threshold_segment(view, columns::LOAN_TO_INCOME, threshold)? {
            out.push(format!(
                "LTI > {threshold} segment default rate {high:.2}% vs {}.",
                fmt_rate(rest)
            ));
        }
    }

    if view.has(columns::DTI) {
        let threshold = config.dti_risk_threshold;
        if let Some((high, rest)) = threshold_segment(view, columns::DTI, threshold)? {
            out.push(format!(
                "DTI > {threshold} segment default rate {high:.2}% vs {}.",
                fmt_rate(rest)
            ));
        }
    }

    if view.has(columns::AMT_CREDIT) && view.has(columns::AMT_INCOME_TOTAL) {
        let low_income: Vec<bool> = if view.has(columns::INCOME_BRACKET) {
            view.labels(columns::INCOME_BRACKET)?
                .into_iter()
                .map(|l| l == Some(columns::INCOME_BRACKETS[0]))
                .collect()
        } else {
            above_or_below(view, columns::AMT_INCOME_TOTAL, 0.25, false)?
        };
        let high_credit = above_or_below(view, columns::AMT_CREDIT, 0.75, true)?;
        let mask: Vec<bool> = low_income.iter().zip(&high_credit).map(|(a, b)| *a && *b).collect();
        if mask.contains(&true) {
            if let (Some(rate), _) = segment_default_rates(&view.target()?, &mask) {
                out.push(format!("Low income x high credit cohort has default rate {rate:.2}%."));
            }
        }
    }
    Ok(out)
}

/// Rows strictly above (or at most) the view quantile `q` of a column
fn above_or_below(view: &View, column: &str, q: f64, above: bool) -> Result<Vec<bool>> {
    let numbers = view.numbers(column)?;
    let values: Vec<f64> = numbers.iter().flatten().copied().collect();
    let Some(cut) = stats::quantile(&values, q) else {
        return Ok(vec![false; numbers.len()]);
    };
    Ok(numbers
        .into_iter()
        .map(|v| v.is_some_and(|v| if above { v > cut } else { v <= cut }))
        .collect())
}

fn drivers(ctx: &EvalContext<'_>) -> Result<Vec<String>> {
    let view = ctx.view();
    let mut out = Vec::new();
    if !view.has(columns::TARGET) {
        return Ok(out);
    }

    let correlations = ctx.target_correlations()?;
    let mut positive = correlations.clone();
    rank_desc(&mut positive);
    if let Some((name, r)) = positive.first() {
        out.push(format!("Highest positive correlation with default: {name} ({r:.2})."));
    }
    let mut negative = correlations;
    rank_asc(&mut negative);
    if let Some((name, r)) = negative.first() {
        out.push(format!("Most protective factor: {name} ({r:.2})."));
    }

    if view.has(columns::LOAN_TO_INCOME) && view.has(columns::DTI) {
        let high_lti = above_or_below(view, columns::LOAN_TO_INCOME, 0.75, true)?;
        let high_dti = above_or_below(view, columns::DTI, 0.75, true)?;
        let mask: Vec<bool> = high_lti.iter().zip(&high_dti).map(|(a, b)| *a && *b).collect();
        if mask.contains(&true) {
            let (segment, _) = segment_default_rates(&view.target()?, &mask);
            if let (Some(segment), Some(overall)) = (segment, default_rate(view)?) {
                out.push(format!(
                    "High LTI x high DTI cohort default rate {segment:.2}% vs overall {overall:.2}%."
                ));
            }
        }
    }
    Ok(out)
}
