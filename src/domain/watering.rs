// Watering profile domain models
use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize, Serializer};

/// Highest reading of the soil sensor's 12-bit ADC.
pub const ADC_MAX: u16 = 4095;
pub const DEFAULT_DRY_THRESHOLD: u16 = 2800;
pub const DEFAULT_WET_THRESHOLD: u16 = 1200;

/// Per-plant soil thresholds and watering cadence. Threshold fields keep
/// their historical `_voltage` names but hold raw ADC values on newer
/// sensors and volts on older ones.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WateringProfile {
    #[serde(serialize_with = "whole_as_integer")]
    pub soil_moisture_dry_threshold_voltage: Option<f64>,
    #[serde(serialize_with = "whole_as_integer")]
    pub soil_moisture_wet_threshold_voltage: Option<f64>,
    pub watering_days_fast_growth: Option<u32>,
    pub watering_days_slow_growth: Option<u32>,
    pub watering_days_hot_dormancy: Option<u32>,
    pub watering_days_cold_dormancy: Option<u32>,
}

fn whole_as_integer<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

impl WateringProfile {
    pub fn dry_threshold(&self) -> Option<SoilThreshold> {
        self.soil_moisture_dry_threshold_voltage
            .and_then(SoilThreshold::from_stored)
    }

    pub fn wet_threshold(&self) -> Option<SoilThreshold> {
        self.soil_moisture_wet_threshold_voltage
            .and_then(SoilThreshold::from_stored)
    }
}

/// Form field reading: blank or unparsable input clears the value.
pub fn parse_optional_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_optional_days(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// A raw soil-moisture threshold on the 0..=4095 ADC scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SoilThreshold(u16);

impl SoilThreshold {
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if value > ADC_MAX {
            return Err(ValidationError::Threshold);
        }
        Ok(Self(value))
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value: i64 = raw.trim().parse().map_err(|_| ValidationError::Threshold)?;
        u16::try_from(value)
            .map_err(|_| ValidationError::Threshold)
            .and_then(Self::new)
    }

    fn from_stored(value: f64) -> Option<Self> {
        let rounded = value.round();
        if (0.0..=ADC_MAX as f64).contains(&rounded) {
            Some(Self(rounded as u16))
        } else {
            None
        }
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Reference voltage shown next to the slider (value / 1000 V).
    pub fn voltage_label(&self) -> String {
        format!("{:.3}", self.0 as f64 / 1000.0)
    }
}

/// Payload of the "write to device" command.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DeviceProfileCommand {
    pub dry_threshold: u16,
    pub wet_threshold: u16,
}
