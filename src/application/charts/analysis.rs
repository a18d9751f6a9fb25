// Plant analysis chart - daily aggregates from daily_plant_analysis
use crate::application::charts::config::{
    Axis, AxisId, ChartConfig, Dataset, LabelFilter, TickFormat, OVERLAY_PATTERNS,
};
use crate::application::charts::history::{HUMIDITY_LABEL, LIGHT_LABEL, TEMPERATURE_LABEL};
use crate::application::charts::{push_ranged_series, push_threshold_overlays};
use crate::domain::history::{any_present, AnalysisPoint, HistoryResponse, TimeUnit};

pub const TOOLTIP_FORMAT: &str = "yyyy/MM/dd";

/// One daily aggregate family: `daily_<key>_min/_max/_ave`.
struct Aggregate {
    key: &'static str,
    min_label: &'static str,
    max_label: &'static str,
    avg_label: &'static str,
    color: &'static str,
    band_color: &'static str,
    axis: AxisId,
}

const AGGREGATES: [Aggregate; 5] = [
    Aggregate {
        key: "temp",
        min_label: "Daily Temp Min",
        max_label: "Daily Temp Max",
        avg_label: "Daily Temp Avg",
        color: "rgba(220, 53, 69, 1)",
        band_color: "rgba(220, 53, 69, 0.2)",
        axis: AxisId::Temperature,
    },
    Aggregate {
        key: "humidity",
        min_label: "Daily Humidity Min",
        max_label: "Daily Humidity Max",
        avg_label: "Avg Humidity (%)",
        color: "rgba(13, 202, 240, 1)",
        band_color: "rgba(13, 202, 240, 0.2)",
        axis: AxisId::Humidity,
    },
    Aggregate {
        key: "light",
        min_label: "Daily Light Min",
        max_label: "Daily Light Max",
        avg_label: "Avg Light (lux)",
        color: "rgba(255, 193, 7, 1)",
        band_color: "rgba(255, 193, 7, 0.2)",
        axis: AxisId::Light,
    },
    Aggregate {
        key: "soil_temp1",
        min_label: "Daily Soil Temp1 Min",
        max_label: "Daily Soil Temp1 Max",
        avg_label: "Avg Soil Temp1 (°C)",
        color: "rgba(0, 150, 136, 1)",
        band_color: "rgba(0, 150, 136, 0.2)",
        axis: AxisId::Temperature,
    },
    Aggregate {
        key: "soil_temp2",
        min_label: "Daily Soil Temp2 Min",
        max_label: "Daily Soil Temp2 Max",
        avg_label: "Avg Soil Temp2 (°C)",
        color: "rgba(156, 39, 176, 1)",
        band_color: "rgba(156, 39, 176, 0.2)",
        axis: AxisId::Temperature,
    },
];

pub const SOIL_MOISTURE_LABEL: &str = "Avg Soil Moisture";

fn column(points: &[AnalysisPoint], field: &str) -> Vec<Option<f64>> {
    points.iter().map(|p| p.field(field)).collect()
}

/// Builds the daily analysis chart, or `None` for an empty response.
pub fn plant_analysis_chart(response: &HistoryResponse<AnalysisPoint>) -> Option<ChartConfig> {
    if response.is_empty() {
        return None;
    }
    let points = response.history.as_slice();
    let labels = points
        .iter()
        .map(|p| p.analysis_date.format("%Y-%m-%d").to_string())
        .collect();

    let mut config = ChartConfig::line(labels);
    config.set_axis(AxisId::X, Axis::time(TimeUnit::Day, TOOLTIP_FORMAT));
    config.set_axis(AxisId::Temperature, Axis::primary(TEMPERATURE_LABEL));

    if let Some(thresholds) = response.thresholds() {
        push_threshold_overlays(&mut config, thresholds, points.len());
    }

    for aggregate in &AGGREGATES {
        let ave = format!("daily_{}_ave", aggregate.key);
        let min = format!("daily_{}_min", aggregate.key);
        let max = format!("daily_{}_max", aggregate.key);
        let present = [&ave, &min, &max]
            .iter()
            .any(|field| any_present(points, |p| p.field(field)));
        if !present {
            continue;
        }

        let line = Dataset::line(aggregate.avg_label, aggregate.color, aggregate.axis, column(points, &ave))
            .with_tension(0.1)
            .with_width(2.0);
        push_ranged_series(
            &mut config,
            aggregate.axis,
            (aggregate.min_label, aggregate.max_label, aggregate.band_color),
            Some((column(points, &min), column(points, &max))),
            line,
        );
        match aggregate.axis {
            AxisId::Humidity => config.set_axis(AxisId::Humidity, Axis::secondary(HUMIDITY_LABEL)),
            AxisId::Light => config.set_axis(
                AxisId::Light,
                Axis::secondary(LIGHT_LABEL).with_ticks(TickFormat::Thousands),
            ),
            _ => {}
        }
    }

    if any_present(points, |p| p.field("daily_soil_moisture_ave")) {
        config.push(
            Dataset::line(
                SOIL_MOISTURE_LABEL,
                "rgba(108, 78, 56, 1)",
                AxisId::Soil,
                column(points, "daily_soil_moisture_ave"),
            )
            .with_tension(0.1),
        );
        config.set_axis(AxisId::Soil, Axis::secondary("Soil Moisture"));
    }

    config.index_interaction();
    config.filter_overlays(LabelFilter::excluding(&OVERLAY_PATTERNS));
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> HistoryResponse<AnalysisPoint> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_daily_aggregates() {
        let data = response(
            r#"{"history": [
                {"analysis_date": "2025-06-01", "daily_temp_min": 14.0, "daily_temp_max": 27.5,
                 "daily_temp_ave": 20.1, "daily_humidity_ave": 60, "daily_soil_moisture_ave": 1900},
                {"analysis_date": "2025-06-02", "daily_temp_min": 15.0, "daily_temp_max": 26.5,
                 "daily_temp_ave": 20.8, "daily_humidity_ave": null, "daily_soil_moisture_ave": null}
            ]}"#,
        );
        let config = plant_analysis_chart(&data).unwrap();
        assert_eq!(
            config.legend_labels(),
            vec!["Daily Temp Avg", "Avg Humidity (%)", SOIL_MOISTURE_LABEL]
        );
        assert!(config.dataset("Daily Light Max").is_none());
        assert!(config.axis(AxisId::Light).is_none());
        assert_eq!(
            config.dataset("Daily Temp Max").unwrap().data,
            vec![Some(27.5), Some(26.5)]
        );
        assert_eq!(
            config.axis(AxisId::X).unwrap().time.as_ref().unwrap().tooltip_format,
            TOOLTIP_FORMAT
        );
    }

    #[test]
    fn test_temperature_group_toggle() {
        let data = response(
            r#"{"history": [{"analysis_date": "2025-06-01", "daily_temp_ave": 20.1,
                              "daily_temp_min": 14.0, "daily_temp_max": 27.5}],
                "thresholds": {"cold_dormancy_temp_low": 2, "cold_dormancy_temp_high": 10}}"#,
        );
        let mut config = plant_analysis_chart(&data).unwrap();
        assert_eq!(config.set_group_hidden("Temp Range", true), 3);
        assert!(config.dataset("Daily Temp Avg").unwrap().hidden);
        assert!(!config.dataset("Cold Dormancy Range Lower").unwrap().hidden);

        config.set_group_hidden("Cold Dormancy Range", true);
        assert!(config.dataset("Cold Dormancy Range Upper").unwrap().hidden);
    }

    #[test]
    fn test_empty_analysis() {
        assert!(plant_analysis_chart(&response("[]")).is_none());
    }
}
