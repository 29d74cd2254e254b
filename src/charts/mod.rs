//! Chart Catalog: named chart definitions producing tabular summaries.
//!
//! A chart here is data shaping only. Each definition turns the current
//! view into a [`TabularSummary`] tagged with a [`ChartKind`]; drawing it is
//! left to whatever renders the summary.

/// Build a [`ChartDefinition`] entry of a static chart table
macro_rules! chart {
    ($name:expr, $title:expr, $kind:expr, [$($req:expr),*], $header:expr, $f:expr) => {
        ChartDefinition {
            name: $name,
            title: $title,
            kind: $kind,
            required: &[$($req),*],
            header: $header,
            prepare: $f,
        }
    };
}

pub mod categorical;
pub mod distribution;
pub mod relationship;

use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::metrics::EvalContext;

/// Marker emitted for a group too small to summarize
pub const INSUFFICIENT: &str = "insufficient data";

/// Visual form a summary is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Bar,
    Histogram,
    Box,
    Violin,
    StackedHistogram,
    OverlayHistogram,
    StackedBar,
    Scatter,
    Heatmap,
    DensityHeatmap,
    ScatterMatrix,
}

/// One cell of a summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Count(u64),
    /// Undefined value, such as a correlation without variance
    Missing,
}

impl Cell {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// A number, or [`Cell::Missing`] when undefined or non-finite
    #[must_use]
    pub fn number(value: Option<f64>) -> Self {
        value.filter(|v| v.is_finite()).map_or(Self::Missing, Self::Number)
    }

    #[must_use]
    pub fn count(value: usize) -> Self {
        Self::Count(value as u64)
    }

    /// The too-small-group marker
    #[must_use]
    pub fn insufficient() -> Self {
        Self::Text(INSUFFICIENT.to_string())
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Count(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.write_str(t),
            Self::Number(v) => write!(f, "{v:.4}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Missing => f.write_str("-"),
        }
    }
}

/// State of a prepared summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Ready,
    /// The view has no rows, or none with values for this chart
    Empty,
    /// A required column is absent or excluded
    Unavailable,
}

/// Header and rows produced by a chart function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub notes: Vec<String>,
}

impl Table {
    /// An empty table with the given header
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Renderable summary of one chart over one view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularSummary {
    pub chart: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub status: SummaryStatus,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl TabularSummary {
    /// Whether any row carries the too-small-group marker
    #[must_use]
    pub fn has_insufficient_groups(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|c| matches!(c, Cell::Text(t) if t == INSUFFICIENT))
    }
}

type ChartFn = fn(&EvalContext<'_>) -> Result<Table>;

/// A named chart
#[derive(Clone, Copy)]
pub struct ChartDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub required: &'static [&'static str],
    /// Header used when the chart cannot be prepared
    pub header: &'static [&'static str],
    pub prepare: ChartFn,
}

impl fmt::Debug for ChartDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Registry of every chart, looked up by name
#[derive(Debug, Clone)]
pub struct ChartCatalog {
    definitions: Vec<ChartDefinition>,
    index: FxHashMap<&'static str, usize>,
}

impl Default for ChartCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChartCatalog {
    /// The catalog backing the five dashboard pages
    #[must_use]
    pub fn standard() -> Self {
        let definitions: Vec<ChartDefinition> = [
            distribution::CHARTS,
            categorical::CHARTS,
            relationship::CHARTS,
        ]
        .concat();
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, i))
            .collect();
        Self { definitions, index }
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.iter().map(|d| d.name)
    }

    /// Look up a definition
    ///
    /// # Errors
    /// Returns [`DashboardError::UnknownChart`] for an unregistered name
    pub fn get(&self, name: &str) -> Result<&ChartDefinition> {
        self.index
            .get(name)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| DashboardError::UnknownChart(name.to_string()))
    }

    /// Prepare a chart summary for the context's view
    ///
    /// # Errors
    /// Returns [`DashboardError::UnknownChart`] for an unregistered name.
    /// An empty view or an unavailable column yields a summary with the
    /// matching status instead.
    pub fn prepare(&self, name: &str, ctx: &EvalContext<'_>) -> Result<TabularSummary> {
        let definition = self.get(name)?;
        let view = ctx.view();

        let (status, table) = if view.is_empty() {
            (SummaryStatus::Empty, Table::new(definition.header))
        } else if let Some(missing) = definition.required.iter().find(|c| !view.has(c)) {
            debug!("Chart '{name}' unavailable: column '{missing}' is not available");
            (SummaryStatus::Unavailable, Table::new(definition.header))
        } else {
            let table = (definition.prepare)(ctx)?;
            let status = if table.rows.is_empty() {
                SummaryStatus::Empty
            } else {
                SummaryStatus::Ready
            };
            (status, table)
        };

        Ok(TabularSummary {
            chart: definition.name,
            title: definition.title,
            kind: definition.kind,
            status,
            columns: table.columns,
            rows: table.rows,
            notes: table.notes,
        })
    }
}
