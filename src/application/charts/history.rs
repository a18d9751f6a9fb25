// Sensor history chart - raw samples or aggregated buckets per device
use crate::application::charts::config::{
    Axis, AxisId, ChartConfig, Dataset, LabelFilter, Position, TickFormat, OVERLAY_PATTERNS,
};
use crate::application::charts::{push_ranged_series, push_threshold_overlays};
use crate::domain::history::{any_present, Bound, HistoryPoint, HistoryResponse, Metric, Period};

pub const TOOLTIP_FORMAT: &str = "yyyy/MM/dd HH:mm";
pub const TEMPERATURE_LABEL: &str = "Temperature (°C)";
pub const HUMIDITY_LABEL: &str = "Humidity (%)";
pub const LIGHT_LABEL: &str = "Light (lux)";
pub const SOIL_RAW_LABEL: &str = "Soil Moisture (Raw)";

const CAPACITANCE_COLORS: [&str; 4] = ["#28A745", "#20C997", "#17A2B8", "#00BCD4"];
const SOIL_TEMP_COLORS: [(&str, &str); 4] = [
    ("#6F42C1", "rgba(111, 66, 193, 0.2)"),
    ("#D63384", "rgba(214, 51, 132, 0.2)"),
    ("#FD7E14", "rgba(253, 126, 20, 0.2)"),
    ("#FFC107", "rgba(255, 193, 7, 0.2)"),
];

pub fn capacitance_label(channel: u8) -> String {
    format!("Soil Moisture CH{} (pF)", channel)
}

pub fn soil_temperature_label(channel: u8) -> String {
    format!("Soil Temp{} (°C)", channel)
}

/// Column view over the samples; every accessor is presence-aware.
struct Columns<'a> {
    points: &'a [HistoryPoint],
}

impl Columns<'_> {
    fn present(&self, metric: Metric) -> bool {
        any_present(self.points, |p| p.value(metric))
    }

    fn values(&self, metric: Metric) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value(metric)).collect()
    }

    /// Min/max columns, only when the bucket aggregates carry them.
    fn bounds(&self, metric: Metric) -> Option<(Vec<Option<f64>>, Vec<Option<f64>>)> {
        let has_bounds = any_present(self.points, |p| p.bound(metric, Bound::Max))
            || any_present(self.points, |p| p.bound(metric, Bound::Min));
        has_bounds.then(|| {
            (
                self.points.iter().map(|p| p.bound(metric, Bound::Min)).collect(),
                self.points.iter().map(|p| p.bound(metric, Bound::Max)).collect(),
            )
        })
    }

    fn line(&self, metric: Metric, label: &str, color: &str, axis: AxisId) -> Dataset {
        let line = Dataset::line(label, color, axis, self.values(metric));
        if self.bounds(metric).is_some() {
            line.with_tension(0.1).with_width(2.0)
        } else {
            line
        }
    }
}

/// Builds the device history chart, or `None` when there is nothing to
/// plot. Only metrics that at least one sample carries get a dataset and
/// an axis.
pub fn sensor_history_chart(response: &HistoryResponse<HistoryPoint>, period: Period) -> Option<ChartConfig> {
    if response.is_empty() {
        return None;
    }
    let points = response.history.as_slice();
    let columns = Columns { points };
    let labels = points
        .iter()
        .map(|p| p.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
        .collect();

    let mut config = ChartConfig::line(labels);
    config.set_axis(AxisId::X, Axis::time(period.time_unit(), TOOLTIP_FORMAT));

    if let Some(thresholds) = response.thresholds() {
        push_threshold_overlays(&mut config, thresholds, points.len());
        config.ensure_axis(AxisId::Temperature, || Axis::primary(TEMPERATURE_LABEL));
    }

    if columns.present(Metric::Temperature) {
        push_ranged_series(
            &mut config,
            AxisId::Temperature,
            ("Temp Min", "Temp Max", "rgba(220, 53, 69, 0.2)"),
            columns.bounds(Metric::Temperature),
            columns.line(Metric::Temperature, TEMPERATURE_LABEL, "#DC3545", AxisId::Temperature),
        );
        config.ensure_axis(AxisId::Temperature, || Axis::primary(TEMPERATURE_LABEL));
    }

    if columns.present(Metric::Humidity) {
        push_ranged_series(
            &mut config,
            AxisId::Humidity,
            ("Humidity Min", "Humidity Max", "rgba(13, 110, 253, 0.2)"),
            columns.bounds(Metric::Humidity),
            columns.line(Metric::Humidity, HUMIDITY_LABEL, "#0D6EFD", AxisId::Humidity),
        );
        config.set_axis(AxisId::Humidity, Axis::secondary(HUMIDITY_LABEL));
    }

    if columns.present(Metric::LightLux) {
        push_ranged_series(
            &mut config,
            AxisId::Light,
            ("Light Min", "Light Max", "rgba(255, 206, 86, 0.2)"),
            columns.bounds(Metric::LightLux),
            columns.line(Metric::LightLux, LIGHT_LABEL, "#FFC107", AxisId::Light),
        );
        config.set_axis(
            AxisId::Light,
            Axis::secondary(LIGHT_LABEL).with_ticks(TickFormat::Thousands),
        );
    }

    // Capacitance channels come from the newer sensor generation and
    // replace the raw ADC reading when both are present.
    let channels: Vec<u8> = (1..=4)
        .filter(|ch| columns.present(Metric::Capacitance(*ch)))
        .collect();
    if !channels.is_empty() {
        for ch in channels {
            config.push(Dataset::line(
                capacitance_label(ch),
                CAPACITANCE_COLORS[usize::from(ch - 1)],
                AxisId::SoilCapacitance,
                columns.values(Metric::Capacitance(ch)),
            ));
        }
        config.set_axis(AxisId::SoilCapacitance, Axis::secondary("Soil Moisture (pF)"));
    } else if columns.present(Metric::SoilMoisture) {
        push_ranged_series(
            &mut config,
            AxisId::SoilRaw,
            ("Soil Min", "Soil Max", "rgba(139, 69, 19, 0.2)"),
            columns.bounds(Metric::SoilMoisture),
            columns.line(Metric::SoilMoisture, SOIL_RAW_LABEL, "#28a745", AxisId::SoilRaw),
        );
        config.set_axis(AxisId::SoilRaw, Axis::secondary(SOIL_RAW_LABEL));
    }

    for ch in 1..=4u8 {
        let metric = Metric::SoilTemperature(ch);
        if !columns.present(metric) {
            continue;
        }
        let (color, band) = SOIL_TEMP_COLORS[usize::from(ch - 1)];
        let min_label = format!("Soil Temp{} Min", ch);
        let max_label = format!("Soil Temp{} Max", ch);
        push_ranged_series(
            &mut config,
            AxisId::Temperature,
            (&min_label, &max_label, band),
            columns.bounds(metric),
            columns.line(metric, &soil_temperature_label(ch), color, AxisId::Temperature),
        );
        config.ensure_axis(AxisId::Temperature, || Axis::primary(TEMPERATURE_LABEL));
    }

    config.index_interaction();
    config.legend_at(Position::Top);
    config.filter_overlays(LabelFilter::excluding(&OVERLAY_PATTERNS));
    tracing::debug!(
        "Built history chart with {} datasets over {} points",
        config.data.datasets.len(),
        points.len()
    );
    Some(config)
}
