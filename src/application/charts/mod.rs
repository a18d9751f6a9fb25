// Chart builders - typed Chart.js configurations assembled from API payloads
pub mod analysis;
pub mod climate;
pub mod config;
pub mod history;
pub mod soil;

use crate::application::charts::config::{AxisId, ChartConfig, Dataset};
use crate::domain::thresholds::ThresholdSet;

pub const LETHAL_HIGH: &str = "Lethal High";
pub const LETHAL_LOW: &str = "Lethal Low";
const LETHAL_HIGH_COLOR: &str = "rgba(220, 53, 69, 0.8)";
const LETHAL_LOW_COLOR: &str = "rgba(13, 110, 253, 0.8)";

/// Growth-phase bands and lethal limit lines on the temperature axis.
/// Each constant series spans `len` points.
pub(crate) fn push_threshold_overlays(config: &mut ChartConfig, thresholds: &ThresholdSet, len: usize) {
    let constant = |value: f64| vec![Some(value); len];

    for band in thresholds.bands() {
        let label = band.phase.range_label();
        let color = band.phase.band_color();
        config.push(Dataset::band_lower(
            format!("{} Lower", label),
            color,
            AxisId::Temperature,
            constant(band.low),
        ));
        config.push(Dataset::band_upper(
            format!("{} Upper", label),
            color,
            AxisId::Temperature,
            constant(band.high),
        ));
    }
    if let Some(high) = thresholds.lethal_temp_high {
        config.push(Dataset::dashed(LETHAL_HIGH, LETHAL_HIGH_COLOR, AxisId::Temperature, constant(high)));
    }
    if let Some(low) = thresholds.lethal_temp_low {
        config.push(Dataset::dashed(LETHAL_LOW, LETHAL_LOW_COLOR, AxisId::Temperature, constant(low)));
    }
}

/// Min/max band followed by the main line, the order the fill needs.
pub(crate) fn push_ranged_series(
    config: &mut ChartConfig,
    axis: AxisId,
    (min_label, max_label, band_color): (&str, &str, &str),
    bounds: Option<(Vec<Option<f64>>, Vec<Option<f64>>)>,
    line: Dataset,
) {
    if let Some((min, max)) = bounds {
        config.push(Dataset::band_lower(min_label, band_color, axis, min));
        config.push(Dataset::band_upper(max_label, band_color, axis, max));
    }
    config.push(line);
}
