//! Categorical charts: counts, shares and default rates per category.

use std::collections::BTreeMap;

use crate::charts::{Cell, ChartDefinition, ChartKind, Table};
use crate::error::Result;
use crate::metrics::EvalContext;
use crate::metrics::aggregate::{GroupRate, rate_by_category, value_counts};
use crate::schema::columns;

const COUNT_HEADER: &[&str] = &["label", "count"];
const SHARE_HEADER: &[&str] = &["label", "count", "percent"];
const RATE_HEADER: &[&str] = &["label", "default_pct", "count"];
const STACKED_HEADER: &[&str] = &["category", "status", "count", "percent"];

/// Categories listed by the occupation chart
const OCCUPATION_TOP: usize = 10;

pub const CHARTS: &[ChartDefinition] = &[
    chart!("target_donut", "Target Distribution (Repaid vs Default)", ChartKind::Pie,
        [columns::TARGET], SHARE_HEADER, target_donut),
    chart!("target_counts", "Counts - Default vs Repaid", ChartKind::Bar,
        [columns::TARGET], COUNT_HEADER, target_counts),
    chart!("gender_counts", "Gender Distribution", ChartKind::Bar,
        [columns::CODE_GENDER], COUNT_HEADER, |ctx| counts(ctx, columns::CODE_GENDER, None)),
    chart!("family_status_counts", "Family Status Distribution", ChartKind::Bar,
        [columns::NAME_FAMILY_STATUS], COUNT_HEADER,
        |ctx| counts(ctx, columns::NAME_FAMILY_STATUS, None)),
    chart!("education_counts", "Education Distribution", ChartKind::Bar,
        [columns::NAME_EDUCATION_TYPE], COUNT_HEADER,
        |ctx| counts(ctx, columns::NAME_EDUCATION_TYPE, None)),
    chart!("occupation_top10", "Occupation (Top 10)", ChartKind::Bar,
        [columns::OCCUPATION_TYPE], COUNT_HEADER,
        |ctx| counts(ctx, columns::OCCUPATION_TYPE, Some(OCCUPATION_TOP))),
    chart!("housing_type_pie", "Housing Type Distribution", ChartKind::Pie,
        [columns::NAME_HOUSING_TYPE], SHARE_HEADER, housing_pie),
    chart!("children_counts", "Children Count", ChartKind::Bar,
        [columns::CNT_CHILDREN], COUNT_HEADER, children_counts),
    chart!("default_pct_gender", "Default % by Gender", ChartKind::Bar,
        [columns::TARGET, columns::CODE_GENDER], RATE_HEADER,
        |ctx| default_pct(ctx, columns::CODE_GENDER)),
    chart!("default_pct_education", "Default % by Education", ChartKind::Bar,
        [columns::TARGET, columns::NAME_EDUCATION_TYPE], RATE_HEADER,
        |ctx| default_pct(ctx, columns::NAME_EDUCATION_TYPE)),
    chart!("default_pct_family", "Default % by Family Status", ChartKind::Bar,
        [columns::TARGET, columns::NAME_FAMILY_STATUS], RATE_HEADER,
        |ctx| default_pct(ctx, columns::NAME_FAMILY_STATUS)),
    chart!("default_pct_housing", "Default % by Housing Type", ChartKind::Bar,
        [columns::TARGET, columns::NAME_HOUSING_TYPE], RATE_HEADER,
        |ctx| default_pct(ctx, columns::NAME_HOUSING_TYPE)),
    chart!("default_rate_by_income_bracket", "Default Rate by Income Bracket", ChartKind::Bar,
        [columns::TARGET, columns::INCOME_BRACKET], RATE_HEADER, rate_by_bracket),
    chart!("contract_type_by_target_stacked", "Contract Type vs Target", ChartKind::StackedBar,
        [columns::TARGET, columns::NAME_CONTRACT_TYPE], STACKED_HEADER,
        |ctx| stacked_by_target(ctx, columns::NAME_CONTRACT_TYPE)),
];

/// Repaid and default counts, repaid first
fn outcome_counts(ctx: &EvalContext<'_>) -> Result<[(&'static str, usize); 2]> {
    let mut repaid = 0;
    let mut defaulted = 0;
    for t in ctx.view().target()?.into_iter().flatten() {
        if t >= 0.5 {
            defaulted += 1;
        } else {
            repaid += 1;
        }
    }
    Ok([
        (columns::status_label(0.0), repaid),
        (columns::status_label(1.0), defaulted),
    ])
}

fn share_rows(table: &mut Table, entries: &[(&str, usize)]) {
    let total: usize = entries.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return;
    }
    for (label, n) in entries {
        table.push(vec![
            Cell::text(*label),
            Cell::count(*n),
            Cell::Number(*n as f64 / total as f64 * 100.0),
        ]);
    }
}

fn target_donut(ctx: &EvalContext<'_>) -> Result<Table> {
    let mut table = Table::new(SHARE_HEADER);
    share_rows(&mut table, &outcome_counts(ctx)?);
    Ok(table)
}

fn target_counts(ctx: &EvalContext<'_>) -> Result<Table> {
    let mut table = Table::new(COUNT_HEADER);
    let outcomes = outcome_counts(ctx)?;
    if outcomes.iter().any(|(_, n)| *n > 0) {
        for (status, n) in outcomes {
            table.push(vec![Cell::text(status), Cell::count(n)]);
        }
    }
    Ok(table)
}

/// Label counts, most frequent first, optionally truncated
fn counts(ctx: &EvalContext<'_>, column: &str, limit: Option<usize>) -> Result<Table> {
    let mut table = Table::new(COUNT_HEADER);
    let counted = value_counts(ctx.view(), column)?;
    for (label, n) in counted.into_iter().take(limit.unwrap_or(usize::MAX)) {
        table.push(vec![Cell::Text(label), Cell::count(n)]);
    }
    Ok(table)
}

fn housing_pie(ctx: &EvalContext<'_>) -> Result<Table> {
    let mut table = Table::new(SHARE_HEADER);
    let counted = value_counts(ctx.view(), columns::NAME_HOUSING_TYPE)?;
    let entries: Vec<(&str, usize)> = counted.iter().map(|(l, n)| (l.as_str(), *n)).collect();
    share_rows(&mut table, &entries);
    Ok(table)
}

/// Children counts ordered by the number of children
fn children_counts(ctx: &EvalContext<'_>) -> Result<Table> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for n in ctx.view().values(columns::CNT_CHILDREN)? {
        // counts are whole numbers stored as floats
        *counts.entry(n.round() as i64).or_default() += 1;
    }
    let mut table = Table::new(COUNT_HEADER);
    for (children, n) in counts {
        table.push(vec![Cell::Text(children.to_string()), Cell::count(n)]);
    }
    Ok(table)
}

fn rate_row(group: &GroupRate) -> Vec<Cell> {
    let rate = if group.count < 2 {
        Cell::insufficient()
    } else {
        Cell::Number(group.default_pct)
    };
    vec![Cell::text(&group.label), rate, Cell::count(group.count)]
}

fn default_pct(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(RATE_HEADER);
    for group in rate_by_category(ctx.view(), column)? {
        table.push(rate_row(&group));
    }
    Ok(table)
}

/// Default rate per income bracket in `Low`, `Mid`, `High` order
fn rate_by_bracket(ctx: &EvalContext<'_>) -> Result<Table> {
    let groups = rate_by_category(ctx.view(), columns::INCOME_BRACKET)?;
    let mut table = Table::new(RATE_HEADER);
    for bracket in columns::INCOME_BRACKETS {
        if let Some(group) = groups.iter().find(|g| g.label == bracket) {
            table.push(rate_row(group));
        }
    }
    Ok(table)
}

/// Outcome counts per category with percentages summing to 100 per category
fn stacked_by_target(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let view = ctx.view();
    let labels = view.labels(column)?;
    let target = view.target()?;

    let mut groups: BTreeMap<&str, [usize; 2]> = BTreeMap::new();
    for (label, t) in labels.into_iter().zip(target) {
        if let (Some(label), Some(t)) = (label, t) {
            groups.entry(label).or_default()[usize::from(t >= 0.5)] += 1;
        }
    }

    let mut table = Table::new(STACKED_HEADER);
    for (label, counts) in groups {
        let total = counts[0] + counts[1];
        for (idx, n) in counts.into_iter().enumerate() {
            let percent = if total < 2 {
                Cell::insufficient()
            } else {
                Cell::Number(n as f64 / total as f64 * 100.0)
            };
            table.push(vec![
                Cell::text(label),
                Cell::text(columns::status_label(idx as f64)),
                Cell::count(n),
                percent,
            ]);
        }
    }
    Ok(table)
}
