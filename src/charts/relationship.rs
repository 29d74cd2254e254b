//! Relationship charts: scatters, joint density, correlation heatmaps and
//! the target-correlation ranking.
//!
//! Scatter-style charts work on a seeded uniform sample of at most
//! `sample_size` view rows, kept in view order, so the same view always
//! yields the same points.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::charts::{Cell, ChartDefinition, ChartKind, Table};
use crate::correlation::{CorrelationMatrix, CorrelationMethod, eligible_columns, rank_desc};
use crate::error::Result;
use crate::metrics::EvalContext;
use crate::schema::columns;
use crate::stats::{self, Histogram};

const HEATMAP_HEADER: &[&str] = &["row", "column", "corr"];
const DENSITY_HEADER: &[&str] = &["x_start", "x_end", "y_start", "y_end", "count"];
const ABS_CORR_HEADER: &[&str] = &["feature", "corr", "abs_corr"];

const DEMOGRAPHIC_COLUMNS: &[&str] = &[
    columns::AGE_YEARS,
    columns::CNT_CHILDREN,
    columns::CNT_FAM_MEMBERS,
    columns::TARGET,
];

const FINANCIAL_COLUMNS: &[&str] = &[
    columns::AMT_INCOME_TOTAL,
    columns::AMT_CREDIT,
    columns::AMT_ANNUITY,
    columns::DTI,
    columns::LOAN_TO_INCOME,
    columns::TARGET,
];

const SELECTED_NUMERICS: &[&str] = &[
    columns::AMT_INCOME_TOTAL,
    columns::AMT_CREDIT,
    columns::AMT_ANNUITY,
    columns::DTI,
    columns::LOAN_TO_INCOME,
    columns::AGE_YEARS,
    columns::EMPLOYMENT_YEARS,
    columns::CNT_FAM_MEMBERS,
    columns::CNT_CHILDREN,
    columns::TARGET,
];

const SCATTER_MATRIX_COLUMNS: &[&str] = &[
    columns::AMT_INCOME_TOTAL,
    columns::AMT_CREDIT,
    columns::AMT_ANNUITY,
];

/// Half-width of the vertical jitter on the 0/1 target
const JITTER: f64 = 0.05;

pub const CHARTS: &[ChartDefinition] = &[
    chart!("income_vs_credit_scatter", "Income vs Credit (sampled)", ChartKind::Scatter,
        [columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT],
        &[columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT],
        |ctx| scatter(ctx, columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT, false)),
    chart!("income_vs_annuity_scatter", "Income vs Annuity (sampled)", ChartKind::Scatter,
        [columns::AMT_INCOME_TOTAL, columns::AMT_ANNUITY],
        &[columns::AMT_INCOME_TOTAL, columns::AMT_ANNUITY],
        |ctx| scatter(ctx, columns::AMT_INCOME_TOTAL, columns::AMT_ANNUITY, false)),
    chart!("age_vs_credit_scatter", "Age vs Credit (colored by Target)", ChartKind::Scatter,
        [columns::AGE_YEARS, columns::AMT_CREDIT, columns::TARGET],
        &[columns::AGE_YEARS, columns::AMT_CREDIT, "status"],
        |ctx| scatter(ctx, columns::AGE_YEARS, columns::AMT_CREDIT, true)),
    chart!("age_vs_income_scatter", "Age vs Income (colored by Target)", ChartKind::Scatter,
        [columns::AGE_YEARS, columns::AMT_INCOME_TOTAL, columns::TARGET],
        &[columns::AGE_YEARS, columns::AMT_INCOME_TOTAL, "status"],
        |ctx| scatter(ctx, columns::AGE_YEARS, columns::AMT_INCOME_TOTAL, true)),
    chart!("employment_vs_target_jitter", "Employment Years vs TARGET (with jitter)",
        ChartKind::Scatter, [columns::EMPLOYMENT_YEARS, columns::TARGET],
        &[columns::EMPLOYMENT_YEARS, "target_jitter"], employment_jitter),
    chart!("income_credit_density", "Joint Density: Income x Credit (sampled)",
        ChartKind::DensityHeatmap, [columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT],
        DENSITY_HEADER, income_credit_density),
    chart!("scatter_matrix", "Scatter Matrix - Income, Credit, Annuity (sampled)",
        ChartKind::ScatterMatrix,
        [columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT, columns::AMT_ANNUITY, columns::TARGET],
        &["status", columns::AMT_INCOME_TOTAL, columns::AMT_CREDIT, columns::AMT_ANNUITY],
        scatter_matrix),
    chart!("demographic_spearman_heatmap", "Spearman Correlation - Age, Children, Family Size, Target",
        ChartKind::Heatmap, [], HEATMAP_HEADER,
        |ctx| heatmap(ctx, DEMOGRAPHIC_COLUMNS, CorrelationMethod::Spearman)),
    chart!("financial_spearman_heatmap", "Spearman Correlation - Financial Variables & Target",
        ChartKind::Heatmap, [], HEATMAP_HEADER,
        |ctx| heatmap(ctx, FINANCIAL_COLUMNS, CorrelationMethod::Spearman)),
    chart!("selected_numerics_heatmap", "Correlation - Selected Numerics",
        ChartKind::Heatmap, [], HEATMAP_HEADER,
        |ctx| heatmap(ctx, SELECTED_NUMERICS, ctx.method())),
    chart!("abs_corr_to_target", "|Correlation| to TARGET - Top N", ChartKind::Bar,
        [columns::TARGET], ABS_CORR_HEADER, abs_corr_to_target),
];

/// Positions within the view kept by the seeded sample, ascending
#[must_use]
pub fn sample_positions(len: usize, sample_size: usize, seed: u64) -> Vec<usize> {
    if len <= sample_size {
        return (0..len).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = rand::seq::index::sample(&mut rng, len, sample_size).into_vec();
    positions.sort_unstable();
    positions
}

fn sampled(ctx: &EvalContext<'_>) -> Vec<usize> {
    let config = ctx.config();
    sample_positions(ctx.view().len(), config.sample_size, config.sample_seed)
}

fn scatter(ctx: &EvalContext<'_>, x: &str, y: &str, by_target: bool) -> Result<Table> {
    let view = ctx.view();
    let xs = view.numbers(x)?;
    let ys = view.numbers(y)?;
    let target = if by_target { Some(view.target()?) } else { None };

    let mut header = vec![x, y];
    if by_target {
        header.push("status");
    }
    let mut table = Table::new(&header);

    for pos in sampled(ctx) {
        let (Some(a), Some(b)) = (xs[pos], ys[pos]) else {
            continue;
        };
        let mut row = vec![Cell::Number(a), Cell::Number(b)];
        if let Some(target) = &target {
            let Some(t) = target[pos] else {
                continue;
            };
            row.push(Cell::text(columns::status_label(t)));
        }
        table.push(row);
    }
    Ok(table)
}

fn employment_jitter(ctx: &EvalContext<'_>) -> Result<Table> {
    let view = ctx.view();
    let years = view.numbers(columns::EMPLOYMENT_YEARS)?;
    let target = view.target()?;
    let mut rng = StdRng::seed_from_u64(ctx.config().sample_seed);

    let mut table = Table::new(&[columns::EMPLOYMENT_YEARS, "target_jitter"]);
    for pos in sampled(ctx) {
        if let (Some(y), Some(t)) = (years[pos], target[pos]) {
            let jitter: f64 = rng.random_range(-JITTER..JITTER);
            table.push(vec![Cell::Number(y), Cell::Number(t + jitter)]);
        }
    }
    Ok(table.with_note("Rows with missing tenure are left out"))
}

fn income_credit_density(ctx: &EvalContext<'_>) -> Result<Table> {
    let view = ctx.view();
    let income = view.numbers(columns::AMT_INCOME_TOTAL)?;
    let credit = view.numbers(columns::AMT_CREDIT)?;
    let points: Vec<(f64, f64)> = sampled(ctx)
        .into_iter()
        .filter_map(|pos| Some((income[pos]?, credit[pos]?)))
        .collect();

    let mut table = Table::new(DENSITY_HEADER);
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (Some((x_min, x_max)), Some((y_min, y_max))) = (stats::min_max(&xs), stats::min_max(&ys)) else {
        return Ok(table);
    };

    let bins = ctx.config().density_grid_bins.max(1);
    let x_axis = Histogram::with_range(x_min, x_max, bins);
    let y_axis = Histogram::with_range(y_min, y_max, bins);
    let mut grid = vec![0u64; bins * bins];
    for (x, y) in points {
        if let (Some(i), Some(j)) = (x_axis.bin_of(x), y_axis.bin_of(y)) {
            grid[i * bins + j] += 1;
        }
    }

    for (cell, &count) in grid.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let (i, j) = (cell / bins, cell % bins);
        table.push(vec![
            Cell::Number(x_axis.edges[i]),
            Cell::Number(x_axis.edges[i + 1]),
            Cell::Number(y_axis.edges[j]),
            Cell::Number(y_axis.edges[j + 1]),
            Cell::Count(count),
        ]);
    }
    Ok(table.with_note(format!("{bins} x {bins} grid; empty cells omitted")))
}

fn scatter_matrix(ctx: &EvalContext<'_>) -> Result<Table> {
    let view = ctx.view();
    let target = view.target()?;
    let data: Vec<Vec<Option<f64>>> = SCATTER_MATRIX_COLUMNS
        .iter()
        .map(|c| view.numbers(c))
        .collect::<Result<_>>()?;

    let mut header = vec!["status"];
    header.extend_from_slice(SCATTER_MATRIX_COLUMNS);
    let mut table = Table::new(&header);

    for pos in sampled(ctx) {
        let Some(t) = target[pos] else {
            continue;
        };
        let values: Option<Vec<f64>> = data.iter().map(|column| column[pos]).collect();
        if let Some(values) = values {
            let mut row = vec![Cell::text(columns::status_label(t))];
            row.extend(values.into_iter().map(Cell::Number));
            table.push(row);
        }
    }
    Ok(table)
}

/// Long-format correlation matrix of the listed columns that qualify
fn heatmap(ctx: &EvalContext<'_>, wanted: &[&str], method: CorrelationMethod) -> Result<Table> {
    let eligible = eligible_columns(ctx.view())?;
    let selected: Vec<String> = wanted
        .iter()
        .filter(|c| eligible.iter().any(|e| e == *c))
        .map(ToString::to_string)
        .collect();

    let mut table = Table::new(HEATMAP_HEADER);
    if selected.len() < 2 {
        return Ok(table);
    }
    let matrix = CorrelationMatrix::compute(ctx.view(), &selected, method)?;
    for (i, row) in matrix.columns.iter().enumerate() {
        for (j, column) in matrix.columns.iter().enumerate() {
            table.push(vec![
                Cell::text(row),
                Cell::text(column),
                Cell::number(matrix.values[i][j]),
            ]);
        }
    }
    Ok(table.with_note(format!("method = {method}")))
}

/// Features ranked by |corr| with the target, limited to the chosen top-N
fn abs_corr_to_target(ctx: &EvalContext<'_>) -> Result<Table> {
    let correlations = ctx.target_correlations()?;
    let mut by_abs: Vec<(String, f64)> = correlations
        .iter()
        .map(|(name, r)| (name.clone(), r.abs()))
        .collect();
    rank_desc(&mut by_abs);

    let mut table = Table::new(ABS_CORR_HEADER);
    for (name, abs) in by_abs.into_iter().take(ctx.options().top_n) {
        let signed = correlations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, r)| *r);
        table.push(vec![Cell::Text(name), Cell::number(signed), Cell::Number(abs)]);
    }
    Ok(table.with_note(format!("method = {}", ctx.method())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_seeded_and_ordered() {
        let a = sample_positions(1_000, 100, 42);
        let b = sample_positions(1_000, 100, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_positions(10, 100, 42), (0..10).collect::<Vec<_>>());
    }
}
