//! Turn a results document into PNG charts.
//!
//! [`metrics`] reduces the per-k blocks of every database to a
//! [`BenchmarkSummary`]; [`charts`] draws it with a [`ChartTheme`].

pub mod charts;
pub mod metrics;
pub mod theme;

use std::path::Path;

use anyhow::Result;

pub use charts::{render_charts, BarMetric, ChartPaths, BARS_SIZE, LATENCY_SIZE};
pub use metrics::{load_metrics, summarize, BenchmarkSummary, DatabaseSummary, RECALL_K};
pub use theme::ChartTheme;

/// Load `metrics` and write the bar, latency and combined charts next to
/// `output_prefix`.
pub fn render_report(metrics: &Path, output_prefix: &Path, theme: &ChartTheme) -> Result<ChartPaths> {
    let summary = load_metrics(metrics)?;
    render_charts(&summary, output_prefix, theme)
}
