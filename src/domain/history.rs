// Time-series domain models for the history and analysis charts
use crate::domain::thresholds::ThresholdSet;
use crate::domain::validation::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Display period of a history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "24h",
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Year => "1y",
        }
    }

    /// Time-axis bucket granularity for this period.
    pub fn time_unit(&self) -> TimeUnit {
        match self {
            Period::Day => TimeUnit::Hour,
            Period::Week | Period::Month => TimeUnit::Day,
            Period::Year => TimeUnit::Month,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValidationError::Period(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hour,
    Day,
    Month,
}

/// A sensor metric carried by a history point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    LightLux,
    SoilMoisture,
    SoilTemperature(u8),
    Capacitance(u8),
}

impl Metric {
    pub fn field(&self) -> Cow<'static, str> {
        match self {
            Metric::Temperature => Cow::Borrowed("temperature"),
            Metric::Humidity => Cow::Borrowed("humidity"),
            Metric::LightLux => Cow::Borrowed("light_lux"),
            Metric::SoilMoisture => Cow::Borrowed("soil_moisture"),
            Metric::SoilTemperature(ch) => Cow::Owned(format!("soil_temperature{}", ch)),
            Metric::Capacitance(ch) => Cow::Owned(format!("capacitance_ch{}", ch)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    fn suffix(&self) -> &'static str {
        match self {
            Bound::Min => "_min",
            Bound::Max => "_max",
        }
    }
}

/// One raw sample or aggregated bucket. Metric fields are kept as they
/// arrived so that presence can be tested per field.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryPoint {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub values: HashMap<String, serde_json::Value>,
}

impl HistoryPoint {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.field(&metric.field())
    }

    pub fn bound(&self, metric: Metric, bound: Bound) -> Option<f64> {
        self.field(&format!("{}{}", metric.field(), bound.suffix()))
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_f64())
    }
}

/// One row of `daily_plant_analysis`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisPoint {
    pub analysis_date: NaiveDate,
    #[serde(flatten)]
    pub values: HashMap<String, serde_json::Value>,
}

impl AnalysisPoint {
    pub fn field(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_f64())
    }
}

/// Shared field-presence test: a metric exists when at least one sample
/// carries a number for it.
pub fn any_present<T>(points: &[T], value: impl Fn(&T) -> Option<f64>) -> bool {
    points.iter().any(|p| value(p).is_some())
}

/// `{history, thresholds?}` or a bare history array from older backends.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryResponse<T> {
    pub history: Vec<T>,
    pub thresholds: Option<ThresholdSet>,
}

impl<T> HistoryResponse<T> {
    pub fn new(history: Vec<T>, thresholds: Option<ThresholdSet>) -> Self {
        Self {
            history,
            thresholds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn thresholds(&self) -> Option<&ThresholdSet> {
        self.thresholds.as_ref().filter(|t| !t.is_empty())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for HistoryResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Wrapped {
                history: Vec<T>,
                #[serde(default)]
                thresholds: Option<ThresholdSet>,
            },
            Bare(Vec<T>),
        }

        Ok(match Raw::<T>::deserialize(deserializer)? {
            Raw::Wrapped {
                history,
                thresholds,
            } => HistoryResponse::new(history, thresholds),
            Raw::Bare(history) => HistoryResponse::new(history, None),
        })
    }
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_time_units() {
        let units: Vec<TimeUnit> = Period::ALL.iter().map(|p| p.time_unit()).collect();
        assert_eq!(
            units,
            vec![TimeUnit::Hour, TimeUnit::Day, TimeUnit::Day, TimeUnit::Month]
        );
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("30d".parse::<Period>(), Ok(Period::Month));
        assert_eq!(
            "2w".parse::<Period>(),
            Err(ValidationError::Period("2w".to_string()))
        );
    }

    #[test]
    fn test_wrapped_and_bare_history() {
        let wrapped: HistoryResponse<HistoryPoint> = serde_json::from_str(
            r#"{"history": [{"timestamp": "2025-06-01 10:00:00", "temperature": 20.5}],
                "thresholds": {"lethal_temp_high": 40}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.history.len(), 1);
        assert_eq!(wrapped.history[0].value(Metric::Temperature), Some(20.5));
        assert_eq!(wrapped.thresholds().unwrap().lethal_temp_high, Some(40.0));

        let bare: HistoryResponse<HistoryPoint> =
            serde_json::from_str(r#"[{"timestamp": "2025-06-01T10:00:00Z", "humidity": 50}]"#).unwrap();
        assert_eq!(bare.history[0].value(Metric::Humidity), Some(50.0));
        assert!(bare.thresholds.is_none());
    }

    #[test]
    fn test_null_metric_is_absent() {
        let point: HistoryPoint = serde_json::from_str(
            r#"{"timestamp": "2025-06-01 10:00:00", "light_lux": null, "temperature_min": 18}"#,
        )
        .unwrap();
        assert_eq!(point.value(Metric::LightLux), None);
        assert_eq!(point.bound(Metric::Temperature, Bound::Min), Some(18.0));
        assert_eq!(Metric::Capacitance(3).field(), "capacitance_ch3");
    }

    #[test]
    fn test_malformed_timestamp_is_rejected() {
        let result: Result<HistoryPoint, _> = serde_json::from_str(r#"{"timestamp": "yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_thresholds_are_ignored() {
        let response: HistoryResponse<HistoryPoint> =
            serde_json::from_str(r#"{"history": [], "thresholds": {}}"#).unwrap();
        assert!(response.is_empty());
        assert!(response.thresholds().is_none());
    }
}
