//! Static SVG bar charts for the impact rankings.
//!
//! Layout, top to bottom:
//! 1. Title
//! 2. Subtitle (cutoff and year span)
//! 3. Horizontal grouped bars, rank 1 at the top, event names on the left,
//!    legend in the lower right
//! 4. Source caption

use crate::error::ReportError;
use crate::types::{AggregatedEventStat, MetricKind};
use crate::util::format_number;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::debug;

const WIDTH: u32 = 1100;
const HEIGHT: u32 = 820;
const LABEL_AREA: i32 = 260;
const CAPTION_AREA: i32 = 36;

// Same hues as the desktop viewer palette: first metric red, second blue.
const SERIES_COLORS: [RGBColor; 2] = [RGBColor(231, 76, 60), RGBColor(52, 152, 219)];

pub const SOURCE_CAPTION: &str = "Source: NOAA Storm Database";

/// Titles and axis scaling for one chart.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub subtitle: String,
    pub caption: String,
    pub x_label: String,
    /// Values are divided by this before plotting (e.g. `1e9` for billions).
    pub unit_divisor: f64,
}

/// One bar group: an event type and its two metric values, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub event_type: String,
    pub kinds: [MetricKind; 2],
    pub values: [f64; 2],
}

/// Fold the ordered stat rows back into bar groups. Row order is kept; the
/// first row of each event type fixes its metric order.
pub fn bar_groups(stats: &[AggregatedEventStat]) -> Vec<BarGroup> {
    let mut groups: Vec<BarGroup> = Vec::new();
    for s in stats {
        match groups.last_mut() {
            Some(g) if g.event_type == s.event_type => {
                g.kinds[1] = s.metric_kind;
                g.values[1] = s.value;
            }
            _ => groups.push(BarGroup {
                event_type: s.event_type.clone(),
                kinds: [s.metric_kind, partner_kind(s.metric_kind)],
                values: [s.value, 0.0],
            }),
        }
    }
    groups
}

fn partner_kind(kind: MetricKind) -> MetricKind {
    match kind {
        MetricKind::Fatalities => MetricKind::Injuries,
        MetricKind::Injuries => MetricKind::Fatalities,
        MetricKind::PropertyDamage => MetricKind::CropDamage,
        MetricKind::CropDamage => MetricKind::PropertyDamage,
    }
}

/// Render `stats` as a horizontal grouped bar chart into an SVG file.
pub fn render_bar_chart(
    path: &Path,
    spec: &ChartSpec,
    stats: &[AggregatedEventStat],
) -> Result<(), ReportError> {
    let chart_err = |e: &dyn std::fmt::Display| ReportError::Chart {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let groups = bar_groups(stats);
    let n = groups.len().max(1) as f64;
    let divisor = if spec.unit_divisor > 0.0 { spec.unit_divisor } else { 1.0 };
    let max_value = groups
        .iter()
        .flat_map(|g| g.values)
        .fold(0.0_f64, f64::max)
        / divisor;
    let x_max = if max_value > 0.0 { max_value * 1.08 } else { 1.0 };

    let canvas = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    canvas.fill(&WHITE).map_err(|e| chart_err(&e))?;

    let titled = canvas
        .titled(&spec.title, ("sans-serif", 26))
        .map_err(|e| chart_err(&e))?;
    let (subtitle_area, rest) = titled.split_vertically(28);
    subtitle_area
        .draw_text(
            &spec.subtitle,
            &TextStyle::from(("sans-serif", 16).into_font()).color(&RGBColor(90, 90, 90)),
            (20, 4),
        )
        .map_err(|e| chart_err(&e))?;

    let (_, rest_h) = rest.dim_in_pixel();
    let (plot_area, caption_area) =
        rest.split_vertically((rest_h as i32 - CAPTION_AREA).max(0));
    caption_area
        .draw_text(
            &spec.caption,
            &TextStyle::from(("sans-serif", 13).into_font()).color(&RGBColor(110, 110, 110)),
            (20, 10),
        )
        .map_err(|e| chart_err(&e))?;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(LABEL_AREA)
        .build_cartesian_2d(0.0..x_max, 0.0..n)
        .map_err(|e| chart_err(&e))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_label_formatter(&|_: &f64| String::new())
        .x_desc(spec.x_label.as_str())
        .x_label_formatter(&|v: &f64| format_number(*v, if x_max < 10.0 { 1 } else { 0 }))
        .draw()
        .map_err(|e| chart_err(&e))?;

    // Band for rank i spans [n - i - 1, n - i]; first metric on the upper half.
    let band = |i: usize| n - i as f64 - 1.0;
    for series in 0..2 {
        let color = SERIES_COLORS[series];
        let (lo, hi) = if series == 0 { (0.5, 0.9) } else { (0.1, 0.5) };
        let label = groups
            .first()
            .map(|g| g.kinds[series].label())
            .unwrap_or_default();
        chart
            .draw_series(groups.iter().enumerate().map(|(i, g)| {
                Rectangle::new(
                    [(0.0, band(i) + lo), (g.values[series] / divisor, band(i) + hi)],
                    color.filled(),
                )
            }))
            .map_err(|e| chart_err(&e))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| chart_err(&e))?;

    // Event names go in the label area, right-aligned against the y axis.
    let label_style = TextStyle::from(("sans-serif", 13).into_font())
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (i, g) in groups.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, band(i) + 0.5));
        canvas
            .draw(&Text::new(g.event_type.clone(), (x - 8, y), label_style.clone()))
            .map_err(|e| chart_err(&e))?;
    }

    canvas.present().map_err(|e| chart_err(&e))?;
    debug!(path = %path.display(), groups = groups.len(), "rendered chart");
    Ok(())
}
