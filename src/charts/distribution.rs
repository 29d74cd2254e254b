//! Distribution charts: histograms, box plots, violins and the missingness
//! ranking.

use crate::charts::{Cell, ChartDefinition, ChartKind, Table};
use crate::error::Result;
use crate::metrics::EvalContext;
use crate::schema::columns;
use crate::stats::{self, Histogram};
use crate::view::View;

const HIST_HEADER: &[&str] = &["bin_start", "bin_end", "count"];
const HIST_BY_STATUS_HEADER: &[&str] = &["bin_start", "bin_end", "status", "count"];
const BOX_HEADER: &[&str] = &["group", "n", "min", "q1", "median", "q3", "max", "mean"];
const VIOLIN_HEADER: &[&str] = &["group", "value", "density"];
const MISSING_HEADER: &[&str] = &["column", "missing_pct"];

/// Grid points per violin outline
const VIOLIN_GRID: usize = 50;
/// Columns listed by the missingness ranking
const MISSING_TOP: usize = 20;

pub const CHARTS: &[ChartDefinition] = &[
    chart!("missing_top20", "Top 20 Features by Missing % (pre-imputation)", ChartKind::Bar,
        [], MISSING_HEADER, missing_top20),
    chart!("age_histogram", "Age Distribution (Years)", ChartKind::Histogram,
        [columns::AGE_YEARS], HIST_HEADER, |ctx| histogram(ctx, columns::AGE_YEARS)),
    chart!("income_histogram", "Income Distribution", ChartKind::Histogram,
        [columns::AMT_INCOME_TOTAL], HIST_HEADER, |ctx| histogram(ctx, columns::AMT_INCOME_TOTAL)),
    chart!("credit_histogram", "Credit Amount Distribution", ChartKind::Histogram,
        [columns::AMT_CREDIT], HIST_HEADER, |ctx| histogram(ctx, columns::AMT_CREDIT)),
    chart!("annuity_histogram", "Annuity Distribution", ChartKind::Histogram,
        [columns::AMT_ANNUITY], HIST_HEADER, |ctx| histogram(ctx, columns::AMT_ANNUITY)),
    chart!("income_box", "Income - Boxplot (winsorized)", ChartKind::Box,
        [columns::AMT_INCOME_TOTAL], BOX_HEADER, |ctx| single_box(ctx, columns::AMT_INCOME_TOTAL)),
    chart!("credit_box", "Credit - Boxplot (winsorized)", ChartKind::Box,
        [columns::AMT_CREDIT], BOX_HEADER, |ctx| single_box(ctx, columns::AMT_CREDIT)),
    chart!("income_by_target_box", "Income by Target", ChartKind::Box,
        [columns::TARGET, columns::AMT_INCOME_TOTAL], BOX_HEADER,
        |ctx| box_by_target(ctx, columns::AMT_INCOME_TOTAL)),
    chart!("credit_by_target_box", "Credit by Target", ChartKind::Box,
        [columns::TARGET, columns::AMT_CREDIT], BOX_HEADER,
        |ctx| box_by_target(ctx, columns::AMT_CREDIT)),
    chart!("age_by_target_box", "Age vs Target - Boxplot", ChartKind::Box,
        [columns::TARGET, columns::AGE_YEARS], BOX_HEADER,
        |ctx| box_by_target(ctx, columns::AGE_YEARS)),
    chart!("credit_by_education_box", "Credit by Education", ChartKind::Box,
        [columns::AMT_CREDIT, columns::NAME_EDUCATION_TYPE], BOX_HEADER,
        |ctx| box_by_category(ctx, columns::AMT_CREDIT, columns::NAME_EDUCATION_TYPE)),
    chart!("income_by_family_box", "Income by Family Status", ChartKind::Box,
        [columns::AMT_INCOME_TOTAL, columns::NAME_FAMILY_STATUS], BOX_HEADER,
        |ctx| box_by_category(ctx, columns::AMT_INCOME_TOTAL, columns::NAME_FAMILY_STATUS)),
    chart!("age_by_target_violin", "Age vs Target (Violin)", ChartKind::Violin,
        [columns::TARGET, columns::AGE_YEARS], VIOLIN_HEADER,
        |ctx| violin_by_target(ctx, columns::AGE_YEARS)),
    chart!("employment_by_target_stacked", "Employment Years by Target (stacked)",
        ChartKind::StackedHistogram, [columns::TARGET, columns::EMPLOYMENT_YEARS],
        HIST_BY_STATUS_HEADER, |ctx| histogram_by_target(ctx, columns::EMPLOYMENT_YEARS)),
    chart!("age_by_target_overlay", "Age by Target (Overlay)", ChartKind::OverlayHistogram,
        [columns::TARGET, columns::AGE_YEARS], HIST_BY_STATUS_HEADER,
        |ctx| histogram_by_target(ctx, columns::AGE_YEARS)),
];

fn missing_top20(ctx: &EvalContext<'_>) -> Result<Table> {
    let mut table = Table::new(MISSING_HEADER);
    for share in ctx.view().dataset().report().top_missing(MISSING_TOP) {
        table.push(vec![Cell::text(&share.column), Cell::Number(share.percent)]);
    }
    Ok(table.with_note("Computed on the full dataset before imputation"))
}

/// Equal-width bins sized from the number of values
fn histogram_rows(table: &mut Table, values: &[f64], max_bins: usize) {
    if values.len() == 1 {
        table.push(vec![Cell::Missing, Cell::Missing, Cell::insufficient()]);
        return;
    }
    let bins = stats::histogram_bin_count(values.len(), max_bins);
    let Some(hist) = Histogram::from_values(values, bins) else {
        return;
    };
    push_bins(table, &hist, None);
}

fn push_bins(table: &mut Table, hist: &Histogram, status: Option<&str>) {
    for (i, count) in hist.counts.iter().enumerate() {
        let mut row = vec![Cell::Number(hist.edges[i]), Cell::Number(hist.edges[i + 1])];
        if let Some(status) = status {
            row.push(Cell::text(status));
        }
        row.push(Cell::Count(*count));
        table.push(row);
    }
}

fn histogram(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(HIST_HEADER);
    let values = ctx.view().values(column)?;
    histogram_rows(&mut table, &values, ctx.config().max_histogram_bins);
    Ok(table)
}

/// Values of a column split by outcome, repaid first
fn by_status(view: &View, column: &str) -> Result<[(&'static str, Vec<f64>); 2]> {
    let (repaid, defaulted) = view.split_by_target(column)?;
    Ok([
        (columns::status_label(0.0), repaid),
        (columns::status_label(1.0), defaulted),
    ])
}

/// One box plot row; groups with fewer than two values get the marker
fn box_row(group: &str, values: &[f64]) -> Vec<Cell> {
    let mut row = vec![Cell::text(group), Cell::count(values.len())];
    if values.len() < 2 {
        row.extend((0..6).map(|_| Cell::insufficient()));
        return row;
    }
    let sorted = stats::sorted(values);
    for q in [0.0, 0.25, 0.5, 0.75, 1.0] {
        row.push(Cell::number(stats::quantile_sorted(&sorted, q)));
    }
    row.push(Cell::number(stats::mean(values)));
    row
}

fn single_box(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(BOX_HEADER);
    let values = ctx.view().values(column)?;
    if !values.is_empty() {
        table.push(box_row("All", &values));
    }
    Ok(table)
}

fn box_by_target(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(BOX_HEADER);
    for (status, values) in by_status(ctx.view(), column)? {
        table.push(box_row(status, &values));
    }
    Ok(table)
}

fn box_by_category(ctx: &EvalContext<'_>, value_column: &str, group_column: &str) -> Result<Table> {
    let view = ctx.view();
    let values = view.numbers(value_column)?;
    let labels = view.labels(group_column)?;

    let mut groups: std::collections::BTreeMap<&str, Vec<f64>> = std::collections::BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        if let (Some(label), Some(value)) = (label, value) {
            groups.entry(label).or_default().push(value);
        }
    }

    let mut table = Table::new(BOX_HEADER);
    for (label, values) in &groups {
        table.push(box_row(label, values));
    }
    Ok(table)
}

fn violin_by_target(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(VIOLIN_HEADER);
    for (status, values) in by_status(ctx.view(), column)? {
        // a KDE needs two values and a non-zero spread
        let (Some((lo, hi)), Some(bw)) = (stats::min_max(&values), stats::silverman_bandwidth(&values))
        else {
            table.push(vec![Cell::text(status), Cell::insufficient(), Cell::insufficient()]);
            continue;
        };
        let step = (hi - lo) / (VIOLIN_GRID - 1) as f64;
        let grid: Vec<f64> = (0..VIOLIN_GRID).map(|i| lo + step * i as f64).collect();
        let density = stats::gaussian_kde(&values, &grid, bw);
        for (y, d) in grid.into_iter().zip(density) {
            table.push(vec![Cell::text(status), Cell::Number(y), Cell::Number(d)]);
        }
    }
    Ok(table.with_note("Gaussian KDE with Silverman bandwidth"))
}

/// Per-outcome counts over bins shared by both outcomes
fn histogram_by_target(ctx: &EvalContext<'_>, column: &str) -> Result<Table> {
    let mut table = Table::new(HIST_BY_STATUS_HEADER);
    let groups = by_status(ctx.view(), column)?;
    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let Some((min, max)) = stats::min_max(&all) else {
        return Ok(table);
    };
    let bins = stats::histogram_bin_count(all.len(), ctx.config().max_histogram_bins);

    for (status, values) in &groups {
        if values.len() < 2 {
            table.push(vec![Cell::Missing, Cell::Missing, Cell::text(*status), Cell::insufficient()]);
            continue;
        }
        let mut hist = Histogram::with_range(min, max, bins);
        for &v in values {
            hist.add(v);
        }
        push_bins(&mut table, &hist, Some(status));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_group_gets_marker() {
        let row = box_row("Default", &[1.0]);
        assert_eq!(row.len(), BOX_HEADER.len());
        assert_eq!(row[2], Cell::insufficient());
    }

    #[test]
    fn box_row_reports_quartiles() {
        let row = box_row("All", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(row[4], Cell::Number(3.0));
        assert_eq!(row[3], Cell::Number(2.0));
        assert_eq!(row[7], Cell::Number(3.0));
    }
}
