use crate::loader::LoadReport;
use crate::magnitude::normalized_amount;
use crate::types::{AggregatedEventStat, ImpactPreviewRow, MetricKind, SummaryStats, WeatherRecord};
use crate::util::format_number;
use std::collections::{HashMap, HashSet};

/// Event types kept in each ranking by default (two rows each).
pub const DEFAULT_TOP_EVENTS: usize = 15;

/// Group records by exact event type, sum two metrics per group, rank groups
/// by the combined total and keep the first `top_n` groups, each expanded to
/// one row per metric.
///
/// Groups are created in first-encountered order and sorted with a stable
/// sort, so equal totals keep input order.
fn rank_by_event<F>(
    data: &[WeatherRecord],
    kinds: [MetricKind; 2],
    top_n: usize,
    project: F,
) -> Vec<AggregatedEventStat>
where
    F: Fn(&WeatherRecord) -> [f64; 2],
{
    struct Acc<'a> {
        event_type: &'a str,
        sums: [f64; 2],
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();
    for r in data {
        let slot = *index.entry(r.event_type.as_str()).or_insert_with(|| {
            groups.push(Acc {
                event_type: r.event_type.as_str(),
                sums: [0.0, 0.0],
            });
            groups.len() - 1
        });
        let [a, b] = project(r);
        groups[slot].sums[0] += a;
        groups[slot].sums[1] += b;
    }

    groups.sort_by(|a, b| {
        let (ta, tb) = (a.sums[0] + a.sums[1], b.sums[0] + b.sums[1]);
        tb.total_cmp(&ta)
    });

    groups
        .into_iter()
        .take(top_n)
        .flat_map(|acc| {
            let total = acc.sums[0] + acc.sums[1];
            kinds
                .into_iter()
                .zip(acc.sums)
                .map(move |(metric_kind, value)| AggregatedEventStat {
                    event_type: acc.event_type.to_string(),
                    metric_kind,
                    value,
                    ranking_total: total,
                })
        })
        .collect()
}

/// Fatalities and injuries per event type, top `top_n` event types by their
/// combined count. Missing counts contribute zero.
pub fn health_impact(data: &[WeatherRecord], top_n: usize) -> Vec<AggregatedEventStat> {
    rank_by_event(
        data,
        [MetricKind::Fatalities, MetricKind::Injuries],
        top_n,
        |r| [r.fatalities.unwrap_or(0.0), r.injuries.unwrap_or(0.0)],
    )
}

/// Property and crop damage in USD per event type, after magnitude-code
/// scaling, top `top_n` event types by combined damage.
pub fn economic_impact(data: &[WeatherRecord], top_n: usize) -> Vec<AggregatedEventStat> {
    rank_by_event(
        data,
        [MetricKind::PropertyDamage, MetricKind::CropDamage],
        top_n,
        |r| {
            [
                normalized_amount(r.property_damage_base, &r.property_damage_magnitude),
                normalized_amount(r.crop_damage_base, &r.crop_damage_magnitude),
            ]
        },
    )
}

/// Console rows for an aggregate; ranks count event types, not rows.
pub fn preview_rows(stats: &[AggregatedEventStat], decimals: usize) -> Vec<ImpactPreviewRow> {
    let mut rank = 0usize;
    let mut previous: Option<&str> = None;
    stats
        .iter()
        .map(|s| {
            if previous != Some(s.event_type.as_str()) {
                rank += 1;
                previous = Some(s.event_type.as_str());
            }
            ImpactPreviewRow {
                rank,
                event_type: s.event_type.clone(),
                metric: s.metric_kind.label().to_string(),
                value: format_number(s.value, decimals),
                ranking_total: format_number(s.ranking_total, decimals),
            }
        })
        .collect()
}

pub fn generate_summary(data: &[WeatherRecord], load_report: &LoadReport) -> SummaryStats {
    let mut event_types: HashSet<&str> = HashSet::new();
    let mut summary = SummaryStats {
        total_records: data.len(),
        skipped_rows: load_report.skipped_rows,
        coerced_fields: load_report.coerced_fields,
        distinct_event_types: 0,
        first_event_date: load_report.first_date,
        last_event_date: load_report.last_date,
        total_fatalities: 0.0,
        total_injuries: 0.0,
        total_property_damage: 0.0,
        total_crop_damage: 0.0,
    };
    for r in data {
        event_types.insert(r.event_type.as_str());
        summary.total_fatalities += r.fatalities.unwrap_or(0.0);
        summary.total_injuries += r.injuries.unwrap_or(0.0);
        summary.total_property_damage +=
            normalized_amount(r.property_damage_base, &r.property_damage_magnitude);
        summary.total_crop_damage +=
            normalized_amount(r.crop_damage_base, &r.crop_damage_magnitude);
    }
    summary.distinct_event_types = event_types.len();
    summary
}
