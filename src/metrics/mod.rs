//! Metric Catalog: named KPI definitions evaluated against a view.
//!
//! A metric is a pure function of the current view. It never fails on an
//! empty view or on a column excluded for missingness; both produce
//! [`MetricValue::NotAvailable`].

pub mod aggregate;
pub mod correlation;
pub mod demographics;
pub mod financial;
pub mod overview;
pub mod segmentation;

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::correlation::{CorrelationMatrix, CorrelationMethod};
use crate::error::{DashboardError, Result};
use crate::filter::ViewOptions;
use crate::schema::columns;
use crate::view::View;

/// One `(name, value)` entry of a ranked list metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub value: f64,
}

impl RankedEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Value of an evaluated metric
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Number(f64),
    Count(u64),
    /// Percentage in `[0, 100]`
    Percent(f64),
    Text(String),
    List(Vec<RankedEntry>),
    /// Sentinel for an empty view or an undefined statistic
    NotAvailable,
}

impl MetricValue {
    /// A number, or the sentinel when undefined or non-finite
    #[must_use]
    pub fn number(value: Option<f64>) -> Self {
        value.filter(|v| v.is_finite()).map_or(Self::NotAvailable, Self::Number)
    }

    /// A percentage, or the sentinel when undefined or non-finite
    #[must_use]
    pub fn percent(value: Option<f64>) -> Self {
        value.filter(|v| v.is_finite()).map_or(Self::NotAvailable, Self::Percent)
    }

    /// A ranked list, or the sentinel when empty
    #[must_use]
    pub fn list(entries: Vec<RankedEntry>) -> Self {
        if entries.is_empty() {
            Self::NotAvailable
        } else {
            Self::List(entries)
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::NotAvailable)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v:.2}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Percent(p) => write!(f, "{p:.2}%"),
            Self::Text(t) => f.write_str(t),
            Self::List(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{} ({:.2})", e.name, e.value))
                    .collect();
                f.write_str(&parts.join(", "))
            }
            Self::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// What a metric function produces: a value and an optional detail line
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub value: MetricValue,
    pub detail: Option<String>,
}

impl From<MetricValue> for Measure {
    fn from(value: MetricValue) -> Self {
        Self { value, detail: None }
    }
}

/// Evaluated metric with its definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub name: &'static str,
    pub label: &'static str,
    pub value: MetricValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub definition: &'static str,
}

type MetricFn = fn(&EvalContext<'_>) -> Result<Measure>;

/// A named KPI
#[derive(Clone, Copy)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub label: &'static str,
    pub definition: &'static str,
    /// Columns that must be available for the metric to be defined
    pub required: &'static [&'static str],
    pub compute: MetricFn,
}

impl fmt::Debug for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Everything a metric may read while it is evaluated
///
/// The correlation matrix is computed at most once per context, or handed
/// in from a session cache.
pub struct EvalContext<'a> {
    view: &'a View,
    options: ViewOptions,
    correlations: OnceCell<Arc<CorrelationMatrix>>,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn new(view: &'a View, options: ViewOptions) -> Self {
        Self {
            view,
            options,
            correlations: OnceCell::new(),
        }
    }

    /// Seed the context with an already computed matrix for this view
    #[must_use]
    pub fn with_correlations(self, matrix: Arc<CorrelationMatrix>) -> Self {
        if matrix.method == self.options.method {
            let _ = self.correlations.set(matrix);
        }
        self
    }

    #[must_use]
    pub const fn view(&self) -> &'a View {
        self.view
    }

    #[must_use]
    pub fn config(&self) -> &'a DashboardConfig {
        self.view.dataset().config()
    }

    #[must_use]
    pub const fn method(&self) -> CorrelationMethod {
        self.options.method
    }

    #[must_use]
    pub const fn options(&self) -> ViewOptions {
        self.options
    }

    /// Correlation matrix of the view's eligible numeric columns
    pub fn correlations(&self) -> Result<&CorrelationMatrix> {
        if let Some(matrix) = self.correlations.get() {
            return Ok(matrix.as_ref());
        }
        let matrix = Arc::new(CorrelationMatrix::for_view(self.view, self.options.method)?);
        Ok(self.correlations.get_or_init(|| matrix).as_ref())
    }

    /// The matrix if this context has computed or received one
    #[must_use]
    pub fn computed_correlations(&self) -> Option<Arc<CorrelationMatrix>> {
        self.correlations.get().cloned()
    }

    /// Correlation of every feature with `TARGET`, in column order
    pub fn target_correlations(&self) -> Result<Vec<(String, f64)>> {
        Ok(self.correlations()?.with_column(columns::TARGET))
    }
}

/// Registry of every metric, looked up by name
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
    index: FxHashMap<&'static str, usize>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl MetricCatalog {
    /// The catalog backing the five dashboard pages
    #[must_use]
    pub fn standard() -> Self {
        let definitions: Vec<MetricDefinition> = [
            overview::METRICS,
            segmentation::METRICS,
            demographics::METRICS,
            financial::METRICS,
            correlation::METRICS,
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
    /// Returns [`DashboardError::UnknownMetric`] for an unregistered name
    pub fn get(&self, name: &str) -> Result<&MetricDefinition> {
        self.index
            .get(name)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| DashboardError::UnknownMetric(name.to_string()))
    }

    /// Evaluate a metric against the context's view
    ///
    /// # Errors
    /// Returns [`DashboardError::UnknownMetric`] for an unregistered name.
    /// Empty views and unavailable columns yield the N/A sentinel instead.
    pub fn evaluate(&self, name: &str, ctx: &EvalContext<'_>) -> Result<MetricResult> {
        let definition = self.get(name)?;
        let view = ctx.view();

        let measure = if view.is_empty() {
            Measure::from(MetricValue::NotAvailable)
        } else if let Some(missing) = definition.required.iter().find(|c| !view.has(c)) {
            debug!("Metric '{name}' unavailable: column '{missing}' is not available");
            Measure::from(MetricValue::NotAvailable)
        } else {
            (definition.compute)(ctx)?
        };

        Ok(MetricResult {
            name: definition.name,
            label: definition.label,
            value: measure.value,
            detail: measure.detail,
            definition: definition.definition,
        })
    }
}
