// Soil threshold chart - 30 days of soil moisture with dry/wet markers
use crate::application::charts::config::{
    Annotation, Axis, AxisId, ChartConfig, Dataset, LabelPosition,
};
use crate::domain::history::{HistoryPoint, HistoryResponse, Metric, TimeUnit};
use crate::domain::watering::SoilThreshold;

pub const SOIL_LABEL: &str = "Soil Moisture (Binary Value)";
pub const DRY_LINE: &str = "dryLine";
pub const WET_LINE: &str = "wetLine";

/// Dashed Dry/Wet markers for the thresholds that are set.
pub fn threshold_annotations(dry: Option<SoilThreshold>, wet: Option<SoilThreshold>) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    if let Some(dry) = dry {
        annotations.push(Annotation {
            id: DRY_LINE.to_string(),
            value: f64::from(dry.value()),
            color: "rgba(220, 53, 69, 0.7)".to_string(),
            label: format!("Dry ({})", dry.value()),
            label_position: LabelPosition::End,
        });
    }
    if let Some(wet) = wet {
        annotations.push(Annotation {
            id: WET_LINE.to_string(),
            value: f64::from(wet.value()),
            color: "rgba(13, 110, 253, 0.7)".to_string(),
            label: format!("Wet ({})", wet.value()),
            label_position: LabelPosition::Start,
        });
    }
    annotations
}

pub fn soil_threshold_chart(
    response: &HistoryResponse<HistoryPoint>,
    dry: Option<SoilThreshold>,
    wet: Option<SoilThreshold>,
) -> Option<ChartConfig> {
    if response.is_empty() {
        return None;
    }
    let points = response.history.as_slice();
    let labels = points
        .iter()
        .map(|p| p.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
        .collect();

    let mut config = ChartConfig::line(labels);
    config.push(
        Dataset::line(
            SOIL_LABEL,
            "rgb(25, 135, 84)",
            AxisId::Y,
            points.iter().map(|p| p.value(Metric::SoilMoisture)).collect(),
        )
        .without_axis()
        .with_tension(0.1)
        .with_point_radius(1.0)
        .filled("rgba(25, 135, 84, 0.1)"),
    );
    config.set_axis(AxisId::X, Axis::time(TimeUnit::Day, "yyyy/MM/dd HH:mm"));
    config.set_axis(AxisId::Y, Axis::titled("Sensor Value (0-4095)"));
    config.set_annotations(threshold_annotations(dry, wet));
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_lines() {
        let data: HistoryResponse<HistoryPoint> = serde_json::from_str(
            r#"{"history": [{"timestamp": "2025-06-01 10:00:00", "soil_moisture": 2100}]}"#,
        )
        .unwrap();
        let config = soil_threshold_chart(
            &data,
            Some(SoilThreshold::new(2800).unwrap()),
            Some(SoilThreshold::new(1200).unwrap()),
        )
        .unwrap();

        let labels: Vec<&str> = config.annotations().iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Dry (2800)", "Wet (1200)"]);
        assert_eq!(config.dataset(SOIL_LABEL).unwrap().data, vec![Some(2100.0)]);
    }

    #[test]
    fn test_unset_threshold_has_no_line() {
        assert_eq!(
            threshold_annotations(None, Some(SoilThreshold::new(900).unwrap())).len(),
            1
        );
    }
}
