//! The report run as one explicit composition:
//! `load_records -> health_impact / economic_impact -> write + render`.

use crate::charts::{render_bar_chart, ChartSpec, SOURCE_CAPTION};
use crate::config::ReportConfig;
use crate::loader::{load_records, LoadReport};
use crate::output::{ensure_dir, write_csv, write_json};
use crate::reports::{economic_impact, generate_summary, health_impact};
use crate::types::{AggregatedEventStat, SummaryStats};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use tracing::info;

pub const HEALTH_CSV: &str = "health_impact.csv";
pub const ECONOMIC_CSV: &str = "economic_impact.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const HEALTH_CHART: &str = "health_impact.svg";
pub const ECONOMIC_CHART: &str = "economic_impact.svg";

#[derive(Debug)]
pub struct ReportOutcome {
    pub load_report: LoadReport,
    pub summary: SummaryStats,
    pub health: Vec<AggregatedEventStat>,
    pub economic: Vec<AggregatedEventStat>,
    /// Every file written, in write order.
    pub artifacts: Vec<PathBuf>,
}

fn year_span(first: Option<NaiveDate>, last: Option<NaiveDate>) -> Option<String> {
    match (first, last) {
        (Some(a), Some(b)) if a.year() == b.year() => Some(a.year().to_string()),
        (Some(a), Some(b)) => Some(format!("{}-{}", a.year(), b.year())),
        _ => None,
    }
}

fn subtitle(top: usize, ranked_by: &str, span: Option<&str>) -> String {
    match span {
        Some(span) => format!("Top {top} event types by {ranked_by}, {span}"),
        None => format!("Top {top} event types by {ranked_by}"),
    }
}

pub fn health_chart_spec(top: usize, span: Option<&str>) -> ChartSpec {
    ChartSpec {
        title: "Weather events most harmful to population health".to_string(),
        subtitle: subtitle(top, "fatalities and injuries", span),
        caption: SOURCE_CAPTION.to_string(),
        x_label: "People affected".to_string(),
        unit_divisor: 1.0,
    }
}

pub fn economic_chart_spec(top: usize, span: Option<&str>) -> ChartSpec {
    ChartSpec {
        title: "Weather events with the greatest economic consequences".to_string(),
        subtitle: subtitle(top, "property and crop damage", span),
        caption: SOURCE_CAPTION.to_string(),
        x_label: "Damage (billion USD)".to_string(),
        unit_divisor: 1e9,
    }
}

/// Load the input, compute both rankings and write every artifact into the
/// output directory. Any failure aborts the run.
pub fn generate_report(config: &ReportConfig) -> Result<ReportOutcome> {
    let (records, load_report) = load_records(&config.input)
        .with_context(|| format!("could not load storm data from {}", config.input.display()))?;

    let health = health_impact(&records, config.top);
    let economic = economic_impact(&records, config.top);
    let summary = generate_summary(&records, &load_report);
    info!(
        event_types = summary.distinct_event_types,
        health_rows = health.len(),
        economic_rows = economic.len(),
        "aggregated storm events"
    );

    let out = &config.output_dir;
    ensure_dir(out).context("could not create output directory")?;
    let mut artifacts = Vec::new();

    for (name, rows) in [(HEALTH_CSV, &health), (ECONOMIC_CSV, &economic)] {
        let path = out.join(name);
        write_csv(&path, rows).with_context(|| format!("could not write {}", path.display()))?;
        artifacts.push(path);
    }

    let summary_path = out.join(SUMMARY_JSON);
    write_json(&summary_path, &summary)
        .with_context(|| format!("could not write {}", summary_path.display()))?;
    artifacts.push(summary_path);

    if config.no_charts {
        info!("chart rendering disabled");
    } else {
        let span = year_span(summary.first_event_date, summary.last_event_date);
        let charts = [
            (HEALTH_CHART, health_chart_spec(config.top, span.as_deref()), &health),
            (ECONOMIC_CHART, economic_chart_spec(config.top, span.as_deref()), &economic),
        ];
        for (name, spec, rows) in charts {
            let path = out.join(name);
            render_bar_chart(&path, &spec, rows)
                .with_context(|| format!("could not render {}", path.display()))?;
            artifacts.push(path);
        }
    }

    info!(dir = %out.display(), files = artifacts.len(), "report written");
    Ok(ReportOutcome {
        load_report,
        summary,
        health,
        economic,
        artifacts,
    })
}
