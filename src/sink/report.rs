//! HTML report sink: an inline SVG line chart of the price series with the
//! logo beside it.
//!
//! The report is a standalone document built by string assembly, the same way
//! the plain-text and table sinks work: no template engine, no external
//! assets beyond the logo image itself.

use crate::fetch::{LOGO_PATH, PRICE_SERIES};
use crate::models::PriceSeries;
use crate::pipeline::{ResultBag, SinkUnit};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const CHART_WIDTH: u32 = 720;
const CHART_HEIGHT: u32 = 400;
const CHART_MARGIN: u32 = 48;

/// Logo availability as the report sees it. A failed fetch and a page with
/// no logo are different stories and render differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoStatus {
    /// Downloaded and on disk.
    Available(PathBuf),
    /// The fetch succeeded but found nothing to download.
    Missing,
    /// The fetch failed; carries the recorded `{kind}: {message}` reason.
    Failed(String),
}

/// Read the logo's three-way status out of the bag.
pub fn logo_status(bag: &ResultBag) -> LogoStatus {
    if let Some(path) = bag.asset(LOGO_PATH) {
        LogoStatus::Available(path.to_path_buf())
    } else if let Some(reason) = bag.failure("logo") {
        LogoStatus::Failed(reason)
    } else {
        LogoStatus::Missing
    }
}

/// Build the dispatch unit for the HTML report.
pub fn unit(bag: &ResultBag, path: PathBuf, symbol: String) -> SinkUnit {
    let series = bag.series(PRICE_SERIES).cloned().unwrap_or_default();
    let logo = logo_status(bag);

    SinkUnit::new("render-report", move || {
        render_report(&path, &symbol, &series, &logo)
    })
}

/// Render the report to `path` and return a summary naming the target.
pub fn render_report(
    path: &Path,
    symbol: &str,
    series: &PriceSeries,
    logo: &LogoStatus,
) -> Result<String> {
    let html = build_html(symbol, series, logo);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, &html)
        .with_context(|| format!("writing report to {}", path.display()))?;

    Ok(format!(
        "rendered report with {} points to {}",
        series.len(),
        path.display()
    ))
}

fn build_html(symbol: &str, series: &PriceSeries, logo: &LogoStatus) -> String {
    let symbol = escape(symbol);
    let chart = chart_svg(series);
    let logo_html = match logo {
        LogoStatus::Available(path) => format!(
            r#"<img src="{}" alt="{} logo" style="max-width:100%;height:auto;border:0;" />"#,
            escape(&path.display().to_string()),
            symbol
        ),
        LogoStatus::Missing => "<p><em>Logo not available.</em></p>".to_string(),
        LogoStatus::Failed(reason) => format!(
            "<p><em>Logo could not be fetched ({}).</em></p>",
            escape(reason)
        ),
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>{symbol} Report</title>
<style>
  body {{ font-family: system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, Cantarell, 'Helvetica Neue', Arial, sans-serif; }}
  .container {{ display: flex; gap: 24px; align-items: flex-start; }}
  .chart {{ flex: 3; min-width: 0; }}
  .logo  {{ flex: 1; max-width: 320px; }}
  .logo img {{ width: 100%; height: auto; }}
</style>
</head>
<body>
  <h1>{symbol} &ndash; Adjusted Close</h1>
  <div class="container">
    <div class="chart">{chart}</div>
    <div class="logo">{logo_html}</div>
  </div>
</body>
</html>
"#
    )
}

/// Inline SVG line chart. Observations are spaced evenly; the y axis spans
/// the observed close range with min/max labels.
fn chart_svg(series: &PriceSeries) -> String {
    if series.len() < 2 {
        return "<p><em>Not enough price data to chart.</em></p>".to_string();
    }

    let (width, height, margin) = (
        CHART_WIDTH as f64,
        CHART_HEIGHT as f64,
        CHART_MARGIN as f64,
    );
    let min = series.min_close().unwrap_or(0.0);
    let max = series.max_close().unwrap_or(0.0);
    // A flat series still needs a non-zero span to scale against.
    let span = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        max - min
    };

    let inner_width = width - 2.0 * margin;
    let inner_height = height - 2.0 * margin;
    let step = inner_width / (series.len() - 1) as f64;

    let mut points = String::new();
    for (i, point) in series.iter().enumerate() {
        let x = margin + i as f64 * step;
        let y = height - margin - (point.adj_close - min) / span * inner_height;
        let _ = write!(points, "{:.1},{:.1} ", x, y);
    }

    let first_date = series.first().map(|p| p.date.to_string()).unwrap_or_default();
    let last_date = series.last().map(|p| p.date.to_string()).unwrap_or_default();

    format!(
        r##"<svg viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img">
  <rect x="{m}" y="{m}" width="{iw:.1}" height="{ih:.1}" fill="none" stroke="#ccc" />
  <polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{points}" />
  <text x="{m}" y="{label_y}" font-size="12">{first_date}</text>
  <text x="{right}" y="{label_y}" font-size="12" text-anchor="end">{last_date}</text>
  <text x="{label_x}" y="{m}" font-size="12" text-anchor="end" dominant-baseline="hanging">{max:.2}</text>
  <text x="{label_x}" y="{bottom}" font-size="12" text-anchor="end">{min:.2}</text>
</svg>"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        m = CHART_MARGIN,
        iw = inner_width,
        ih = inner_height,
        points = points.trim_end(),
        label_y = height - margin / 2.0,
        label_x = margin - 6.0,
        right = width - margin,
        bottom = height - margin,
        min = min,
        max = max,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
