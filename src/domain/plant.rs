// Plant library and managed plant domain models
use crate::domain::thresholds::ThresholdSet;
use crate::domain::validation::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MonthClimate {
    pub avg: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

/// Native climate by month key (`jan`..`dec`).
pub type MonthlyTemps = BTreeMap<String, MonthClimate>;

/// Month label as shown in tables and chart axes ("jan" -> "Jan").
pub fn month_label(month: &str) -> String {
    let mut chars = month.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A species/variety record of the plant library.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LibraryPlant {
    #[serde(default)]
    pub plant_id: Option<String>,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub origin_region: Option<String>,
    #[serde(
        default,
        alias = "monthly_temps_json",
        deserialize_with = "deserialize_monthly_temps",
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_temps: Option<MonthlyTemps>,
    #[serde(flatten)]
    pub thresholds: ThresholdSet,
    #[serde(default)]
    pub watering_growing: Option<String>,
    #[serde(default)]
    pub watering_slow_growing: Option<String>,
    #[serde(default)]
    pub watering_hot_dormancy: Option<String>,
    #[serde(default)]
    pub watering_cold_dormancy: Option<String>,
}

/// Monthly temps arrive either as an object or as the JSON text stored in
/// the database column.
fn deserialize_monthly_temps<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MonthlyTemps>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Object(MonthlyTemps),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Object(temps)) => Ok(Some(temps)),
        Some(Raw::Text(text)) if text.trim().is_empty() || text == "null" => Ok(None),
        Some(Raw::Text(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Text inputs of the library editor form, by field name.
pub const LIBRARY_TEXT_FIELDS: [&str; 11] = [
    "plant_id",
    "genus",
    "species",
    "variety",
    "image_url",
    "origin_country",
    "origin_region",
    "watering_growing",
    "watering_slow_growing",
    "watering_hot_dormancy",
    "watering_cold_dormancy",
];

/// Numeric threshold inputs of the library editor form.
pub const LIBRARY_THRESHOLD_FIELDS: [&str; 10] = [
    "growing_fast_temp_high",
    "growing_fast_temp_low",
    "growing_slow_temp_high",
    "growing_slow_temp_low",
    "hot_dormancy_temp_high",
    "hot_dormancy_temp_low",
    "cold_dormancy_temp_high",
    "cold_dormancy_temp_low",
    "lethal_temp_high",
    "lethal_temp_low",
];

/// Fields a lookup must not overwrite once the user typed them.
pub const LOOKUP_KEY_FIELDS: [&str; 3] = ["genus", "species", "variety"];

impl LibraryPlant {
    /// Current values of every form field that carries a value.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let text = [
            &self.plant_id,
            &self.genus,
            &self.species,
            &self.variety,
            &self.image_url,
            &self.origin_country,
            &self.origin_region,
            &self.watering_growing,
            &self.watering_slow_growing,
            &self.watering_hot_dormancy,
            &self.watering_cold_dormancy,
        ];
        let t = &self.thresholds;
        let numbers = [
            t.growing_fast_temp_high,
            t.growing_fast_temp_low,
            t.growing_slow_temp_high,
            t.growing_slow_temp_low,
            t.hot_dormancy_temp_high,
            t.hot_dormancy_temp_low,
            t.cold_dormancy_temp_high,
            t.cold_dormancy_temp_low,
            t.lethal_temp_high,
            t.lethal_temp_low,
        ];

        LIBRARY_TEXT_FIELDS
            .into_iter()
            .zip(text)
            .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
            .chain(
                LIBRARY_THRESHOLD_FIELDS
                    .into_iter()
                    .zip(numbers)
                    .filter_map(|(name, value)| value.map(|v| (name, v.to_string()))),
            )
            .collect()
    }

    /// Builds a record from form values; blank fields become `None`.
    pub fn from_form(field: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str| field(name).filter(|v| !v.trim().is_empty());
        let number = |name: &str| text(name).and_then(|v| v.trim().parse::<f64>().ok());

        Self {
            plant_id: text("plant_id"),
            genus: text("genus"),
            species: text("species"),
            variety: text("variety"),
            image_url: text("image_url"),
            origin_country: text("origin_country"),
            origin_region: text("origin_region"),
            monthly_temps: None,
            thresholds: ThresholdSet {
                growing_fast_temp_high: number("growing_fast_temp_high"),
                growing_fast_temp_low: number("growing_fast_temp_low"),
                growing_slow_temp_high: number("growing_slow_temp_high"),
                growing_slow_temp_low: number("growing_slow_temp_low"),
                hot_dormancy_temp_high: number("hot_dormancy_temp_high"),
                hot_dormancy_temp_low: number("hot_dormancy_temp_low"),
                cold_dormancy_temp_high: number("cold_dormancy_temp_high"),
                cold_dormancy_temp_low: number("cold_dormancy_temp_low"),
                lethal_temp_high: number("lethal_temp_high"),
                lethal_temp_low: number("lethal_temp_low"),
            },
            watering_growing: text("watering_growing"),
            watering_slow_growing: text("watering_slow_growing"),
            watering_hot_dormancy: text("watering_hot_dormancy"),
            watering_cold_dormancy: text("watering_cold_dormancy"),
        }
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.genus.as_deref().unwrap_or_default(),
            self.species.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LookupRequest {
    pub genus: String,
    pub species: String,
    pub variety: String,
}

impl LookupRequest {
    pub fn new(genus: &str, species: &str, variety: &str) -> Result<Self, ValidationError> {
        if genus.trim().is_empty() && species.trim().is_empty() {
            return Err(ValidationError::LookupTerms);
        }
        Ok(Self {
            genus: genus.trim().to_string(),
            species: species.trim().to_string(),
            variety: variety.trim().to_string(),
        })
    }
}

/// A sensor/accessory pairing with a library entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ManagedPlant {
    #[serde(default)]
    pub managed_plant_id: String,
    #[serde(default)]
    pub plant_name: String,
    #[serde(default)]
    pub library_plant_id: Option<String>,
    #[serde(default)]
    pub assigned_plant_sensor_id: Option<String>,
    #[serde(default)]
    pub assigned_switchbot_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A file picked in an upload input.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
