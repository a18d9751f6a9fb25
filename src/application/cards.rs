// Card updater - patches device and plant cards from live snapshots
use crate::application::document::{humanize, Document};
use crate::domain::snapshot::{ConnectionStatus, DeviceSnapshot, PlantSnapshot, SensorReading, Snapshot};
use std::sync::Arc;

pub const PLACEHOLDER: &str = "--";

/// One decimal, or the placeholder when the metric is missing.
pub fn fixed1(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Raw sensor value printed without forced decimals (1234.0 -> "1234").
pub fn raw_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => PLACEHOLDER.to_string(),
    }
}

#[derive(Clone)]
pub struct CardUpdater {
    document: Arc<dyn Document>,
}

impl CardUpdater {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Writes `text` only when it differs from what is shown (ignoring
    /// surrounding whitespace). Returns whether a write happened.
    pub fn update_element_text(&self, id: &str, text: &str) -> bool {
        match self.document.text(id) {
            Some(current) if current.trim() != text.trim() => {
                self.document.set_text(id, text);
                true
            }
            _ => false,
        }
    }

    pub fn update_entity_cards(&self, snapshots: &[Snapshot]) {
        for snapshot in snapshots {
            match snapshot {
                Snapshot::Device(device) => self.update_device_card(device),
                Snapshot::Plant(plant) => self.update_plant_card(plant),
            }
        }
    }

    pub fn update_device_card(&self, device: &DeviceSnapshot) {
        let id = &device.device_id;
        let reading = device.reading();
        self.update_readings(id, &reading);
        self.update_element_text(
            &format!("soil-temp1-{}", id),
            &fixed1(reading.soil_temperature1),
        );
        self.update_element_text(
            &format!("soil-temp2-{}", id),
            &fixed1(reading.soil_temperature2),
        );
        let battery = device
            .battery()
            .map(|b| format!("{}%", raw_value(Some(b))))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        self.update_element_text(&format!("battery-{}", id), &battery);

        let status = &device.connection_status;
        let card_id = format!("device-card-{}", id);
        if self.document.exists(&card_id) {
            for class in other_status_classes(status.css_class()) {
                if self.document.has_class(&card_id, class) {
                    self.document.remove_class(&card_id, class);
                }
            }
            if !self.document.has_class(&card_id, status.css_class()) {
                self.document.add_class(&card_id, status.css_class());
            }
        }
        self.update_attribute(&format!("status-icon-{}", id), "class", status.icon());
        self.update_element_text(&format!("status-text-{}", id), status.label());
    }

    pub fn update_plant_card(&self, plant: &PlantSnapshot) {
        let id = &plant.managed_plant_id;
        self.update_readings(id, &plant.reading());

        let analysis = plant.analysis();
        let growth = analysis
            .growth_period
            .as_deref()
            .map(humanize)
            .unwrap_or_else(|| "Unknown".to_string());
        self.update_element_text(&format!("growth-{}", id), &growth);
        self.update_element_text(
            &format!("watering-{}", id),
            analysis.watering_advice.as_deref().unwrap_or("N/A"),
        );
        if let Some(survival) = analysis.survival_limit_status.as_deref() {
            self.update_element_text(&format!("survival-{}", id), &humanize(survival));
        }

        let badge_id = format!("watering-badge-{}", id);
        let (add, remove, icon) = if analysis.needs_watering() {
            (
                ["bg-primary", "text-white"],
                ["bg-light", "text-dark"],
                "bi bi-exclamation-triangle-fill me-1",
            )
        } else {
            (["bg-light", "text-dark"], ["bg-primary", "text-white"], "bi bi-water")
        };
        for class in remove {
            if self.document.has_class(&badge_id, class) {
                self.document.remove_class(&badge_id, class);
            }
        }
        for class in add {
            if self.document.exists(&badge_id) && !self.document.has_class(&badge_id, class) {
                self.document.add_class(&badge_id, class);
            }
        }
        self.update_attribute(&format!("watering-icon-{}", id), "class", icon);
    }

    fn update_readings(&self, id: &str, reading: &SensorReading) {
        self.update_element_text(&format!("temp-{}", id), &fixed1(reading.temperature));
        self.update_element_text(&format!("humidity-{}", id), &fixed1(reading.humidity));
        self.update_element_text(&format!("light-{}", id), &fixed1(reading.light_lux));
        self.update_element_text(&format!("soil-{}", id), &raw_value(reading.soil_moisture));
    }

    fn update_attribute(&self, id: &str, name: &str, value: &str) {
        if self.document.exists(id) && self.document.attribute(id, name).as_deref() != Some(value) {
            self.document.set_attribute(id, name, value);
        }
    }
}

fn other_status_classes(keep: &'static str) -> impl Iterator<Item = &'static str> {
    ConnectionStatus::ALL_CLASSES
        .into_iter()
        .filter(move |c| *c != keep)
}
