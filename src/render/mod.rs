//! Text and JSON rendering of page reports.
//!
//! Text output lays every chart summary out as an aligned table, truncated
//! to a row limit; JSON output is the serialized reports.

use std::fmt::Write;

use serde::Serialize;

use crate::charts::{SummaryStatus, TabularSummary};
use crate::error::Result;
use crate::session::PageReport;
use crate::store::Dataset;

/// Rows printed per chart table before truncating
pub const DEFAULT_MAX_ROWS: usize = 15;

/// Output format of the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One-paragraph summary of the loaded dataset and its derivation
#[must_use]
pub fn dataset_summary(dataset: &Dataset) -> String {
    let report = dataset.report();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dataset: {} rows, {} columns ({} numeric, {} categorical)",
        dataset.num_rows(),
        dataset.schema().fields().len(),
        dataset.numeric_columns().len(),
        dataset.categorical_columns().len()
    );
    if !report.excluded_columns.is_empty() {
        let _ = writeln!(out, "Excluded for missingness: {}", report.excluded_columns.join(", "));
    }
    for note in &report.notes {
        let _ = writeln!(out, "Note: {note}");
    }
    out
}

/// Render one page report as text
#[must_use]
pub fn render_text(report: &PageReport, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Page {}: {} ===", report.page, report.title);
    let _ = writeln!(
        out,
        "Rows in view: {} of {} (generated {})",
        report.row_count,
        report.total_rows,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = writeln!(out, "\n-- Key metrics --");
    let width = report.metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
    for metric in &report.metrics {
        let _ = write!(out, "{:<width$}  {}", metric.label, metric.value);
        if let Some(detail) = &metric.detail {
            let _ = write!(out, "  [{detail}]");
        }
        out.push('\n');
    }

    for chart in &report.charts {
        out.push('\n');
        out.push_str(&render_summary(chart, max_rows));
    }

    let _ = writeln!(out, "\n-- Insights --");
    for insight in &report.insights {
        let _ = writeln!(out, "- {insight}");
    }
    out
}

/// Render one chart summary as an aligned text table
#[must_use]
pub fn render_summary(summary: &TabularSummary, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- {} [{:?}] --", summary.title, summary.kind);
    match summary.status {
        SummaryStatus::Empty => {
            let _ = writeln!(out, "(no data)");
            return out;
        }
        SummaryStatus::Unavailable => {
            let _ = writeln!(out, "(unavailable)");
            return out;
        }
        SummaryStatus::Ready => {}
    }

    let shown = summary.rows.len().min(max_rows);
    let cells: Vec<Vec<String>> = summary.rows[..shown]
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let widths: Vec<usize> = summary
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(i).map(String::len))
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let _ = writeln!(out, "{}", line(&summary.columns));
    for row in &cells {
        let _ = writeln!(out, "{}", line(row));
    }
    if summary.rows.len() > shown {
        let _ = writeln!(out, "... {} more rows", summary.rows.len() - shown);
    }
    for note in &summary.notes {
        let _ = writeln!(out, "note: {note}");
    }
    out
}

/// Serialize any report value as pretty JSON
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
