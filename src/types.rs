use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Decode a raw cell as text, replacing invalid UTF-8 instead of failing.
/// Blank cells are `None`.
fn lossy_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LossyText;

    impl<'de> Visitor<'de> for LossyText {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a text field")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(String::from_utf8_lossy(v).into_owned()))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            self.visit_bytes(v.as_bytes())
        }
    }

    deserializer.deserialize_bytes(LossyText)
}

/// One row of the NOAA export as it appears on disk. Every field is kept as
/// text so coercion failures can be reported per column. Cells are decoded
/// lossily, so a stray Latin-1 byte never costs the row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "EVTYPE", default, deserialize_with = "lossy_text")]
    pub event_type: Option<String>,
    #[serde(rename = "BGN_DATE", default, deserialize_with = "lossy_text")]
    pub begin_date: Option<String>,
    #[serde(rename = "FATALITIES", default, deserialize_with = "lossy_text")]
    pub fatalities: Option<String>,
    #[serde(rename = "INJURIES", default, deserialize_with = "lossy_text")]
    pub injuries: Option<String>,
    #[serde(rename = "PROPDMG", default, deserialize_with = "lossy_text")]
    pub property_damage: Option<String>,
    #[serde(rename = "PROPDMGEXP", default, deserialize_with = "lossy_text")]
    pub property_damage_exp: Option<String>,
    #[serde(rename = "CROPDMG", default, deserialize_with = "lossy_text")]
    pub crop_damage: Option<String>,
    #[serde(rename = "CROPDMGEXP", default, deserialize_with = "lossy_text")]
    pub crop_damage_exp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRecord {
    pub event_type: String,
    pub begin_date: Option<NaiveDate>,
    pub fatalities: Option<f64>,
    pub injuries: Option<f64>,
    pub property_damage_base: Option<f64>,
    pub property_damage_magnitude: String,
    pub crop_damage_base: Option<f64>,
    pub crop_damage_magnitude: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Fatalities,
    Injuries,
    PropertyDamage,
    CropDamage,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Fatalities => "Fatalities",
            MetricKind::Injuries => "Injuries",
            MetricKind::PropertyDamage => "Property damage",
            MetricKind::CropDamage => "Crop damage",
        }
    }
}

/// Summed value of one metric for one event type. `ranking_total` is the
/// event type's combined total across both metrics of its aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEventStat {
    pub event_type: String,
    pub metric_kind: MetricKind,
    pub value: f64,
    pub ranking_total: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct ImpactPreviewRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "RankingTotal")]
    pub ranking_total: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_records: usize,
    pub skipped_rows: usize,
    pub coerced_fields: usize,
    pub distinct_event_types: usize,
    pub first_event_date: Option<NaiveDate>,
    pub last_event_date: Option<NaiveDate>,
    pub total_fatalities: f64,
    pub total_injuries: f64,
    pub total_property_damage: f64,
    pub total_crop_damage: f64,
}
