// Live snapshot models pushed by the backend feed
use serde::Deserialize;

/// One set of sensor readings. Every metric is optional: older sensor
/// generations only report a subset.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SensorReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light_lux: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub soil_temperature1: Option<f64>,
    pub soil_temperature2: Option<f64>,
    pub battery_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<serde_json::Value>")]
pub enum ConnectionStatus {
    Connected,
    Historical,
    Disconnected,
    Error,
    #[default]
    NoData,
    Unknown(String),
}

impl From<String> for ConnectionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "connected" => Self::Connected,
            "historical" => Self::Historical,
            "disconnected" => Self::Disconnected,
            "error" => Self::Error,
            "no_data" => Self::NoData,
            _ => Self::Unknown(value),
        }
    }
}

/// `null` means the device never reported; any other non-string is kept
/// as an unknown status.
impl From<Option<serde_json::Value>> for ConnectionStatus {
    fn from(value: Option<serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::NoData,
            Some(serde_json::Value::String(status)) => Self::from(status),
            Some(other) => Self::Unknown(other.to_string()),
        }
    }
}

impl ConnectionStatus {
    pub const ALL_CLASSES: [&'static str; 6] = [
        "status-connected",
        "status-historical",
        "status-disconnected",
        "status-error",
        "status-no_data",
        "status-unknown",
    ];

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Connected => "status-connected",
            Self::Historical => "status-historical",
            Self::Disconnected => "status-disconnected",
            Self::Error => "status-error",
            Self::NoData => "status-no_data",
            Self::Unknown(_) => "status-unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Connected => "bi bi-wifi",
            Self::Historical => "bi bi-clock-history",
            Self::Disconnected => "bi bi-wifi-off",
            Self::Error => "bi bi-exclamation-triangle-fill",
            Self::NoData => "bi bi-dash-circle",
            Self::Unknown(_) => "bi bi-question-circle",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Connected => "Connected",
            Self::Historical => "Historical",
            Self::Disconnected => "Disconnected",
            Self::Error => "Error",
            Self::NoData => "No Data",
            Self::Unknown(_) => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeviceSnapshot {
    pub device_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub last_data: Option<SensorReading>,
    #[serde(default)]
    pub battery_level: Option<f64>,
    #[serde(default)]
    pub connection_status: ConnectionStatus,
}

impl DeviceSnapshot {
    pub fn reading(&self) -> SensorReading {
        self.last_data.clone().unwrap_or_default()
    }

    /// Battery is reported either on the device or inside the last reading.
    pub fn battery(&self) -> Option<f64> {
        self.battery_level
            .or_else(|| self.last_data.as_ref().and_then(|d| d.battery_level))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlantSensors {
    #[serde(default)]
    pub primary: Option<SensorReading>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlantAnalysis {
    pub growth_period: Option<String>,
    pub watering_advice: Option<String>,
    pub watering_status: Option<String>,
    pub survival_limit_status: Option<String>,
}

impl PlantAnalysis {
    pub fn needs_watering(&self) -> bool {
        self.watering_status.as_deref() == Some("needed")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlantSnapshot {
    pub managed_plant_id: String,
    #[serde(default)]
    pub plant_name: Option<String>,
    #[serde(default)]
    pub sensors: Option<PlantSensors>,
    #[serde(default)]
    pub analysis: Option<PlantAnalysis>,
}

impl PlantSnapshot {
    pub fn reading(&self) -> SensorReading {
        self.sensors
            .as_ref()
            .and_then(|s| s.primary.clone())
            .unwrap_or_default()
    }

    pub fn analysis(&self) -> PlantAnalysis {
        self.analysis.clone().unwrap_or_default()
    }
}

/// A feed message element: either a managed plant or a raw device.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Snapshot {
    Plant(PlantSnapshot),
    Device(DeviceSnapshot),
}

impl Snapshot {
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Plant(p) => &p.managed_plant_id,
            Self::Device(d) => &d.device_id,
        }
    }
}
