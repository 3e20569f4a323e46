//! PNG chart rendering for benchmark summaries.
//!
//! Produces three images from an output prefix:
//! 1. `<prefix>_bars.png` - ingest time, QPS, recall@50 and latency per database
//! 2. `<prefix>_latency.png` - latency vs. k, one line per database
//! 3. `<prefix>.png` - both charts stacked vertically

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use super::metrics::{BenchmarkSummary, DatabaseSummary};
use super::theme::ChartTheme;

/// Pixel size of the grouped bar chart.
pub const BARS_SIZE: (u32, u32) = (1800, 900);

/// Pixel size of the latency chart.
pub const LATENCY_SIZE: (u32, u32) = (1500, 900);

const FONT: &str = "sans-serif";
const BARS_TITLE: &str = "Ingest Time, QPS (avg), Recall@50, and Avg Latency";
const LATENCY_TITLE: &str = "Latency vs. k";
const BAR_WIDTH: f64 = 0.2;

/// Halo passes drawn under each line: (stroke width, opacity).
const GLOW_LAYERS: &[(u32, f64)] = &[(14, 0.04), (10, 0.07), (7, 0.12)];

/// Files written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub bars: PathBuf,
    pub latency: PathBuf,
    pub combined: PathBuf,
}

impl ChartPaths {
    /// Derive the output files from a prefix such as `out/run1`.
    ///
    /// The combined image replaces the prefix's extension, if any, with `png`.
    pub fn from_prefix(prefix: &Path) -> Self {
        let stem = prefix
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "benchmark".to_string());

        Self {
            bars: prefix.with_file_name(format!("{}_bars.png", stem)),
            latency: prefix.with_file_name(format!("{}_latency.png", stem)),
            combined: prefix.with_file_name(&stem).with_extension("png"),
        }
    }
}

/// One of the four bars drawn per database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMetric {
    IngestTime,
    Qps,
    Recall,
    Latency,
}

impl BarMetric {
    /// Bars in left-to-right order within a group.
    pub const ALL: [BarMetric; 4] = [
        BarMetric::IngestTime,
        BarMetric::Qps,
        BarMetric::Recall,
        BarMetric::Latency,
    ];

    /// Legend text.
    pub fn label(self) -> &'static str {
        match self {
            BarMetric::IngestTime => "Ingest Time (s)",
            BarMetric::Qps => "QPS (avg)",
            BarMetric::Recall => "Recall@50",
            BarMetric::Latency => "Avg Latency (ms)",
        }
    }

    /// Bar height for a database.
    pub fn value(self, db: &DatabaseSummary) -> f64 {
        match self {
            BarMetric::IngestTime => db.ingest_time_sec,
            BarMetric::Qps => db.avg_qps,
            BarMetric::Recall => db.recall_at_50,
            BarMetric::Latency => db.avg_latency_ms(),
        }
    }

    /// Value label drawn above the bar.
    pub fn format(self, value: f64) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        match self {
            BarMetric::IngestTime => format!("{:.2}", value),
            BarMetric::Qps => format!("{:.1}", value),
            BarMetric::Recall => format!("{:.3}", value),
            BarMetric::Latency => format!("{:.1}", value),
        }
    }
}

/// Size of the stacked image: widest chart by the sum of the heights.
pub fn combined_size() -> (u32, u32) {
    (
        BARS_SIZE.0.max(LATENCY_SIZE.0),
        BARS_SIZE.1 + LATENCY_SIZE.1,
    )
}

/// Render all three images and return their paths.
pub fn render_charts(
    summary: &BenchmarkSummary,
    prefix: &Path,
    theme: &ChartTheme,
) -> Result<ChartPaths> {
    let paths = ChartPaths::from_prefix(prefix);

    {
        let root = BitMapBackend::new(&paths.bars, BARS_SIZE).into_drawing_area();
        draw_grouped_bars(&root, summary, theme)?;
        root.present()?;
    }
    debug!(path = %paths.bars.display(), "wrote bar chart");

    {
        let root = BitMapBackend::new(&paths.latency, LATENCY_SIZE).into_drawing_area();
        draw_latency_lines(&root, summary, theme)?;
        root.present()?;
    }
    debug!(path = %paths.latency.display(), "wrote latency chart");

    {
        let root = BitMapBackend::new(&paths.combined, combined_size()).into_drawing_area();
        root.fill(&WHITE)?;
        let (top, bottom) = root.split_vertically(BARS_SIZE.1 as i32);
        let top = top.shrink((0, 0), (BARS_SIZE.0 as i32, BARS_SIZE.1 as i32));
        let bottom = bottom.shrink((0, 0), (LATENCY_SIZE.0 as i32, LATENCY_SIZE.1 as i32));
        draw_grouped_bars(&top, summary, theme)?;
        draw_latency_lines(&bottom, summary, theme)?;
        root.present()?;
    }
    debug!(path = %paths.combined.display(), "wrote combined chart");

    Ok(paths)
}

/// Grouped bars: four metrics per database on a shared axis.
pub fn draw_grouped_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    summary: &BenchmarkSummary,
    theme: &ChartTheme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&theme.background)?;

    let names: Vec<String> = summary.databases.iter().map(|d| d.name.clone()).collect();
    let groups: Vec<[f64; 4]> = summary.databases.iter().map(bar_values).collect();
    let n = names.len().max(1);
    let y_max = axis_max(groups.iter().flatten().copied(), 1.15);

    let text = (FONT, 18).into_font().color(&theme.foreground);

    let mut chart = ChartBuilder::on(area)
        .caption(BARS_TITLE, (FONT, 32).into_font().color(&theme.foreground))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(&names, *x))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .label_style(text.clone())
        .axis_style(theme.foreground)
        .bold_line_style(theme.grid)
        .light_line_style(theme.grid.mix(0.4))
        .draw()?;

    let value_style = (FONT, 15)
        .into_font()
        .color(&theme.foreground)
        .pos(Pos::new(HPos::Center, VPos::Bottom));

    for (m, metric) in BarMetric::ALL.iter().enumerate() {
        let color = theme.series_color(m);
        let offset = (m as f64 - 1.5) * BAR_WIDTH;
        let bars: Vec<(f64, f64)> = groups
            .iter()
            .enumerate()
            .map(|(i, values)| (i as f64 + offset, values[m]))
            .collect();

        chart
            .draw_series(bars.iter().filter(|(_, v)| v.is_finite()).map(|&(x, v)| {
                Rectangle::new(
                    [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, v)],
                    color.mix(0.85).filled(),
                )
            }))?
            .label(metric.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 18, y + 6)], color.filled()));

        chart.draw_series(bars.iter().map(|&(x, v)| {
            let y = if v.is_finite() { v } else { 0.0 };
            EmptyElement::at((x, y)) + Text::new(metric.format(v), (0, -4), value_style.clone())
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(theme.background.mix(0.8))
        .border_style(theme.foreground)
        .label_font(text)
        .draw()?;

    Ok(())
}

/// Latency vs. k, one glowing line per database.
pub fn draw_latency_lines<DB>(
    area: &DrawingArea<DB, Shift>,
    summary: &BenchmarkSummary,
    theme: &ChartTheme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&theme.background)?;

    let x_range = latency_x_range(&summary.k_values);
    let y_max = axis_max(
        summary.databases.iter().flat_map(|d| d.latency_sec.iter().copied()),
        1.2,
    );

    let text = (FONT, 18).into_font().color(&theme.foreground);

    let mut chart = ChartBuilder::on(area)
        .caption(LATENCY_TITLE, (FONT, 32).into_font().color(&theme.foreground))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("k")
        .y_desc("Latency (s)")
        .x_labels(summary.k_values.len().max(2))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.4}", y))
        .label_style(text.clone())
        .axis_desc_style(text.clone())
        .axis_style(theme.foreground)
        .bold_line_style(theme.grid)
        .light_line_style(theme.grid.mix(0.4))
        .draw()?;

    let value_style = (FONT, 15)
        .into_font()
        .color(&theme.foreground)
        .pos(Pos::new(HPos::Center, VPos::Bottom));

    for (i, db) in summary.databases.iter().enumerate() {
        let color = theme.series_color(i);
        let points: Vec<(f64, f64)> = summary
            .k_values
            .iter()
            .zip(&db.latency_sec)
            .map(|(&k, &y)| (k as f64, y))
            .collect();

        if theme.glow {
            for &(width, alpha) in GLOW_LAYERS {
                chart.draw_series(LineSeries::new(
                    points.clone(),
                    color.mix(alpha).stroke_width(width),
                ))?;
            }
        }

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))?
            .label(db.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));

        chart.draw_series(points.iter().map(|&p| Circle::new(p, 6, color.filled())))?;

        chart.draw_series(points.iter().map(|&(x, y)| {
            EmptyElement::at((x, y)) + Text::new(format!("{:.4}", y), (0, -10), value_style.clone())
        }))?;
    }

    if !summary.databases.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(theme.background.mix(0.8))
            .border_style(theme.foreground)
            .label_font(text)
            .draw()?;
    }

    Ok(())
}

fn bar_values(db: &DatabaseSummary) -> [f64; 4] {
    BarMetric::ALL.map(|metric| metric.value(db))
}

/// Upper bound for a value axis: the largest finite value scaled by
/// `headroom`, or 1.0 when nothing positive is plotted.
pub fn axis_max(values: impl Iterator<Item = f64>, headroom: f64) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0f64, f64::max);
    if max > 0.0 {
        max * headroom
    } else {
        1.0
    }
}

/// X range for the latency chart with a little padding either side.
pub fn latency_x_range(k_values: &[usize]) -> Range<f64> {
    let (lo, hi) = match (k_values.first(), k_values.last()) {
        (Some(&lo), Some(&hi)) => (lo as f64, hi as f64),
        _ => return 0.0..1.0,
    };
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad)..(hi + pad)
}

/// Database name for a tick at an integer position; blank elsewhere.
fn category_label(names: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}
