// Monthly native climate chart for a library plant
use crate::application::charts::config::{Axis, AxisId, ChartConfig, Dataset, Position};
use crate::domain::plant::{month_label, MonthClimate, MonthlyTemps, MONTHS};

/// Decodes the climate attribute embedded in the page. The value may be
/// the object itself or a JSON string holding it. `null`/blank means the
/// plant has no climate data.
pub fn parse_monthly_temps(raw: &str) -> Result<Option<MonthlyTemps>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(inner) => parse_monthly_temps(&inner),
        value => serde_json::from_value(value).map(Some),
    }
}

pub fn monthly_climate_chart(temps: &MonthlyTemps) -> ChartConfig {
    let series = |pick: fn(&MonthClimate) -> Option<f64>| -> Vec<Option<f64>> {
        MONTHS
            .iter()
            .map(|m| temps.get(*m).and_then(pick))
            .collect()
    };

    let mut config = ChartConfig::line(MONTHS.iter().map(|m| month_label(m)).collect());
    config.push(
        Dataset::line("High (°C)", "rgba(255, 99, 132, 1)", AxisId::Y, series(|c| c.high))
            .without_axis()
            .with_tension(0.1)
            .with_point_radius(3.0),
    );
    config.push(
        Dataset::line("Avg (°C)", "rgba(54, 162, 235, 1)", AxisId::Y, series(|c| c.avg))
            .without_axis()
            .with_tension(0.1)
            .with_point_radius(3.0)
            .with_width(3.0),
    );
    config.push(
        Dataset::line("Low (°C)", "rgba(75, 192, 192, 1)", AxisId::Y, series(|c| c.low))
            .without_axis()
            .with_tension(0.1)
            .with_point_radius(3.0),
    );
    config.set_axis(AxisId::Y, Axis::titled("°C"));
    config.legend_at(Position::Bottom);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_encoded_climate() {
        let raw = r#""{\"jan\": {\"avg\": 5.5, \"high\": 9, \"low\": 1}}""#;
        let temps = parse_monthly_temps(raw).unwrap().unwrap();
        let config = monthly_climate_chart(&temps);
        assert_eq!(config.data.labels.len(), 12);
        assert_eq!(config.data.labels[0], "Jan");
        let high = &config.dataset("High (°C)").unwrap().data;
        assert_eq!(high[0], Some(9.0));
        assert_eq!(high[1], None);
    }

    #[test]
    fn test_null_and_malformed_climate() {
        assert_eq!(parse_monthly_temps("null").unwrap(), None);
        assert_eq!(parse_monthly_temps("\"null\"").unwrap(), None);
        assert!(parse_monthly_temps("{not json").is_err());
        assert!(parse_monthly_temps("[1, 2]").is_err());
    }
}
