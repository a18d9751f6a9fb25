// Biological temperature limits per growth phase
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ThresholdSet {
    pub growing_fast_temp_low: Option<f64>,
    pub growing_fast_temp_high: Option<f64>,
    pub growing_slow_temp_low: Option<f64>,
    pub growing_slow_temp_high: Option<f64>,
    pub hot_dormancy_temp_low: Option<f64>,
    pub hot_dormancy_temp_high: Option<f64>,
    pub cold_dormancy_temp_low: Option<f64>,
    pub cold_dormancy_temp_high: Option<f64>,
    pub lethal_temp_low: Option<f64>,
    pub lethal_temp_high: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    FastGrowth,
    SlowGrowth,
    HotDormancy,
    ColdDormancy,
}

impl GrowthPhase {
    pub const ALL: [GrowthPhase; 4] = [
        GrowthPhase::FastGrowth,
        GrowthPhase::SlowGrowth,
        GrowthPhase::HotDormancy,
        GrowthPhase::ColdDormancy,
    ];

    /// Legend group name; band datasets append " Lower"/" Upper".
    pub fn range_label(&self) -> &'static str {
        match self {
            GrowthPhase::FastGrowth => "Fast Growth Range",
            GrowthPhase::SlowGrowth => "Slow Growth Range",
            GrowthPhase::HotDormancy => "Hot Dormancy Range",
            GrowthPhase::ColdDormancy => "Cold Dormancy Range",
        }
    }

    pub fn band_color(&self) -> &'static str {
        match self {
            GrowthPhase::FastGrowth => "rgba(40, 167, 69, 0.15)",
            GrowthPhase::SlowGrowth => "rgba(25, 135, 84, 0.15)",
            GrowthPhase::HotDormancy => "rgba(255, 193, 7, 0.15)",
            GrowthPhase::ColdDormancy => "rgba(13, 202, 240, 0.15)",
        }
    }
}

/// A closed temperature interval for one growth phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBand {
    pub phase: GrowthPhase,
    pub low: f64,
    pub high: f64,
}

impl ThresholdSet {
    pub fn is_empty(&self) -> bool {
        self.bands().is_empty() && self.lethal_temp_low.is_none() && self.lethal_temp_high.is_none()
    }

    fn limits(&self, phase: GrowthPhase) -> (Option<f64>, Option<f64>) {
        match phase {
            GrowthPhase::FastGrowth => (self.growing_fast_temp_low, self.growing_fast_temp_high),
            GrowthPhase::SlowGrowth => (self.growing_slow_temp_low, self.growing_slow_temp_high),
            GrowthPhase::HotDormancy => (self.hot_dormancy_temp_low, self.hot_dormancy_temp_high),
            GrowthPhase::ColdDormancy => (self.cold_dormancy_temp_low, self.cold_dormancy_temp_high),
        }
    }

    /// Phases with both limits set, in display order.
    pub fn bands(&self) -> Vec<PhaseBand> {
        GrowthPhase::ALL
            .into_iter()
            .filter_map(|phase| match self.limits(phase) {
                (Some(low), Some(high)) => Some(PhaseBand { phase, low, high }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_phase_is_skipped() {
        let thresholds = ThresholdSet {
            growing_fast_temp_low: Some(18.0),
            growing_fast_temp_high: Some(28.0),
            hot_dormancy_temp_low: Some(32.0),
            ..Default::default()
        };
        let bands = thresholds.bands();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].phase, GrowthPhase::FastGrowth);
        assert!(!thresholds.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ThresholdSet::default().is_empty());
    }
}
