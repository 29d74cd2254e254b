//! Session: one filter state over the shared dataset, with memoized views,
//! correlation matrices and chart summaries.
//!
//! Views are keyed by the predicate fingerprint. Chart summaries are keyed
//! by chart name and the full state fingerprint, since view options shape
//! some charts. Caches are dropped wholesale once they reach their limit.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::charts::{ChartCatalog, TabularSummary};
use crate::correlation::{CorrelationMatrix, CorrelationMethod};
use crate::error::Result;
use crate::filter::{FilterControls, FilterState, filter_controls, resolve};
use crate::insights::page_insights;
use crate::metrics::{EvalContext, MetricCatalog, MetricResult};
use crate::pages;
use crate::store::{Dataset, DatasetStore};
use crate::view::View;

/// Default limit per cache before it is cleared
const MAX_CACHE_ENTRIES: usize = 256;

/// A change to the session's filter state
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    SetCategories { column: String, values: Vec<String> },
    SetRange { column: String, min: f64, max: f64 },
    SetIncludeMissing { column: String, include: bool },
    /// Drill-through: flip one label in a column's selection
    Toggle { column: String, value: String },
    Clear { column: String },
    Reset,
    SetMethod(CorrelationMethod),
    SetTopN(usize),
}

/// Hit and miss counters of the session caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub view_hits: usize,
    pub view_misses: usize,
    pub chart_hits: usize,
    pub chart_misses: usize,
    pub correlation_hits: usize,
    pub correlation_misses: usize,
}

/// Everything one page shows for the current state
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page: usize,
    pub title: &'static str,
    pub row_count: usize,
    pub total_rows: usize,
    pub metrics: Vec<MetricResult>,
    pub charts: Vec<TabularSummary>,
    pub insights: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct Session {
    dataset: Arc<Dataset>,
    state: FilterState,
    metrics: MetricCatalog,
    charts: ChartCatalog,
    views: FxHashMap<u64, View>,
    correlations: FxHashMap<(CorrelationMethod, u64), Arc<CorrelationMatrix>>,
    summaries: FxHashMap<(&'static str, u64), TabularSummary>,
    stats: CacheStats,
    max_cache_entries: usize,
}

impl Session {
    /// A session over the dataset with no active filters
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            state: FilterState::new(),
            metrics: MetricCatalog::standard(),
            charts: ChartCatalog::standard(),
            views: FxHashMap::default(),
            correlations: FxHashMap::default(),
            summaries: FxHashMap::default(),
            stats: CacheStats::default(),
            max_cache_entries: MAX_CACHE_ENTRIES,
        }
    }

    #[must_use]
    pub fn from_store(store: &DatasetStore) -> Self {
        Self::new(store.dataset())
    }

    /// Limit the number of entries each cache holds
    #[must_use]
    pub fn with_cache_limit(mut self, max_entries: usize) -> Self {
        self.max_cache_entries = max_entries.max(1);
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub const fn metrics(&self) -> &MetricCatalog {
        &self.metrics
    }

    #[must_use]
    pub const fn charts(&self) -> &ChartCatalog {
        &self.charts
    }

    /// Apply one command to the filter state
    ///
    /// # Errors
    /// Returns [`crate::DashboardError::InvalidFilter`] and leaves the state
    /// unchanged when the command is rejected
    pub fn apply(&mut self, command: FilterCommand) -> Result<()> {
        let dataset = Arc::clone(&self.dataset);
        match command {
            FilterCommand::SetCategories { column, values } => {
                self.state.set_categories(&dataset, &column, values)
            }
            FilterCommand::SetRange { column, min, max } => {
                self.state.set_range(&dataset, &column, min, max)
            }
            FilterCommand::SetIncludeMissing { column, include } => {
                self.state.set_include_missing(&dataset, &column, include)
            }
            FilterCommand::Toggle { column, value } => {
                self.state.toggle_category(&dataset, &column, &value)
            }
            FilterCommand::Clear { column } => {
                self.state.clear(&column);
                Ok(())
            }
            FilterCommand::Reset => {
                self.state.reset();
                Ok(())
            }
            FilterCommand::SetMethod(method) => {
                self.state.set_method(method);
                Ok(())
            }
            FilterCommand::SetTopN(top_n) => self.state.set_top_n(top_n),
        }
    }

    /// Apply commands in order, stopping at the first rejected one
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = FilterCommand>) -> Result<()> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }

    /// The view for the current predicates
    pub fn view(&mut self) -> Result<View> {
        let key = self.state.predicate_fingerprint();
        if let Some(view) = self.views.get(&key) {
            self.stats.view_hits += 1;
            return Ok(view.clone());
        }
        self.stats.view_misses += 1;
        let view = resolve(&self.dataset, &self.state)?;
        evict_if_full(&mut self.views, self.max_cache_entries);
        self.views.insert(key, view.clone());
        Ok(view)
    }

    fn context<'v>(&mut self, view: &'v View) -> EvalContext<'v> {
        let options = self.state.options();
        let key = (options.method, self.state.predicate_fingerprint());
        let ctx = EvalContext::new(view, options);
        match self.correlations.get(&key) {
            Some(matrix) => {
                self.stats.correlation_hits += 1;
                ctx.with_correlations(Arc::clone(matrix))
            }
            None => ctx,
        }
    }

    /// Keep a matrix the context computed for later requests
    fn remember_correlations(&mut self, ctx: &EvalContext<'_>) {
        let key = (ctx.method(), self.state.predicate_fingerprint());
        if self.correlations.contains_key(&key) {
            return;
        }
        if let Some(matrix) = ctx.computed_correlations() {
            self.stats.correlation_misses += 1;
            evict_if_full(&mut self.correlations, self.max_cache_entries);
            self.correlations.insert(key, matrix);
        }
    }

    /// Evaluate one metric over the current view
    pub fn evaluate_metric(&mut self, name: &str) -> Result<MetricResult> {
        let view = self.view()?;
        let ctx = self.context(&view);
        let result = self.metrics.evaluate(name, &ctx)?;
        self.remember_correlations(&ctx);
        Ok(result)
    }

    /// Prepare one chart summary over the current view
    pub fn prepare_chart(&mut self, name: &str) -> Result<TabularSummary> {
        let chart = self.charts.get(name)?.name;
        let key = (chart, self.state.fingerprint());
        if let Some(summary) = self.summaries.get(&key) {
            self.stats.chart_hits += 1;
            return Ok(summary.clone());
        }
        self.stats.chart_misses += 1;

        let view = self.view()?;
        let ctx = self.context(&view);
        let summary = self.charts.prepare(chart, &ctx)?;
        self.remember_correlations(&ctx);

        evict_if_full(&mut self.summaries, self.max_cache_entries);
        self.summaries.insert(key, summary.clone());
        Ok(summary)
    }

    /// Metrics, charts and insights of one page for the current state
    ///
    /// # Errors
    /// Returns [`crate::DashboardError::UnknownPage`] outside 1..=5
    pub fn render_page(&mut self, number: usize) -> Result<PageReport> {
        let page = pages::page(number)?;
        let view = self.view()?;
        debug!("Rendering page {number} over {} rows", view.len());

        let metrics = page
            .metrics
            .iter()
            .map(|name| self.evaluate_metric(name))
            .collect::<Result<Vec<_>>>()?;
        let charts = page
            .charts
            .iter()
            .map(|name| self.prepare_chart(name))
            .collect::<Result<Vec<_>>>()?;

        let ctx = self.context(&view);
        let insights = page_insights(number, &ctx)?;
        self.remember_correlations(&ctx);

        Ok(PageReport {
            page: page.number,
            title: page.title,
            row_count: view.len(),
            total_rows: view.total_rows(),
            metrics,
            charts,
            insights,
            generated_at: Utc::now(),
        })
    }

    /// Filter controls offered by the dataset
    #[must_use]
    pub fn controls(&self) -> FilterControls {
        filter_controls(&self.dataset)
    }

    /// Write the current view as CSV, returning the number of rows written
    pub fn export_csv<W: Write>(&mut self, writer: W) -> Result<usize> {
        let view = self.view()?;
        view.export_csv(writer)?;
        info!("Exported {} rows as CSV", view.len());
        Ok(view.len())
    }
}

fn evict_if_full<K, V>(cache: &mut FxHashMap<K, V>, limit: usize) {
    if cache.len() >= limit {
        debug!("Clearing cache of {} entries", cache.len());
        cache.clear();
    }
}
