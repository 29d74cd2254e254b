//! Filter-and-recompute engine for a five-page credit-risk dashboard.
//!
//! A raw application table is loaded once, cleaned and enriched into a
//! shared [`Dataset`]. A [`FilterState`] resolves to a [`View`] of matching
//! rows, and the metric and chart catalogs recompute every KPI and chart
//! summary from that view. [`Session`] ties these together with
//! memoization and renders whole pages.

pub mod async_io;
pub mod charts;
pub mod config;
pub mod correlation;
pub mod derive;
pub mod error;
pub mod filter;
pub mod insights;
pub mod metrics;
pub mod pages;
pub mod render;
pub mod schema;
pub mod session;
pub mod stats;
pub mod store;
pub mod utils;
pub mod view;

// Core types
pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use store::{Dataset, DatasetStore};
pub use view::View;

// Filtering
pub use filter::{FilterControls, FilterState, Predicate, ViewOptions, filter_controls, resolve};

// Catalogs
pub use charts::{Cell, ChartCatalog, ChartKind, SummaryStatus, TabularSummary};
pub use correlation::{CorrelationMatrix, CorrelationMethod};
pub use derive::{Derivation, DerivationReport, derive};
pub use metrics::{EvalContext, MetricCatalog, MetricResult, MetricValue};
pub use pages::{PAGES, PageDefinition, page};

// Session
pub use session::{FilterCommand, PageReport, Session};

// Arrow types
pub use arrow::datatypes::SchemaRef;
pub use arrow::record_batch::RecordBatch;
