// Device threshold page - slider-driven soil thresholds, save to DB, write to device
use crate::application::alert::AlertKind;
use crate::application::busy::BusyButton;
use crate::application::chart_view::{ChartTarget, RenderOutcome};
use crate::application::charts::soil::threshold_annotations;
use crate::application::controllers::{
    alert_failure, read_watering_days, render_soil_chart, show_watering_days, DRY_THRESHOLD_INPUT, SOIL_CHART,
    WET_THRESHOLD_INPUT,
};
use crate::application::document::Document;
use crate::application::router::{Outcome, PageContext, PageController, PageId, RouteError, Services, UiEvent};
use crate::domain::watering::{
    DeviceProfileCommand, SoilThreshold, WateringProfile, DEFAULT_DRY_THRESHOLD, DEFAULT_WET_THRESHOLD,
};
use async_trait::async_trait;

pub const ALERT_BOX: &str = "device-threshold-alert-box";
pub const SAVE_BUTTON: &str = "save-profile-btn";
pub const SAVE_IDLE_LABEL: &str = "Save Profile to DB";
pub const WRITE_BUTTON: &str = "write-profile-btn";
pub const WRITE_IDLE_LABEL: &str = "Write to Device";
pub const CHART_LOADER: &str = "chart-loader";

/// One threshold control: number input, slider and the two labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdControl {
    Dry,
    Wet,
}

impl ThresholdControl {
    pub fn input(&self) -> &'static str {
        match self {
            ThresholdControl::Dry => DRY_THRESHOLD_INPUT,
            ThresholdControl::Wet => WET_THRESHOLD_INPUT,
        }
    }

    pub fn slider(&self) -> &'static str {
        match self {
            ThresholdControl::Dry => "dry-threshold-slider",
            ThresholdControl::Wet => "wet-threshold-slider",
        }
    }

    pub fn value_label(&self) -> &'static str {
        match self {
            ThresholdControl::Dry => "dry-threshold-value",
            ThresholdControl::Wet => "wet-threshold-value",
        }
    }

    pub fn voltage_label(&self) -> &'static str {
        match self {
            ThresholdControl::Dry => "dry-threshold-voltage",
            ThresholdControl::Wet => "wet-threshold-voltage",
        }
    }

    fn default_value(&self) -> u16 {
        match self {
            ThresholdControl::Dry => DEFAULT_DRY_THRESHOLD,
            ThresholdControl::Wet => DEFAULT_WET_THRESHOLD,
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        [ThresholdControl::Dry, ThresholdControl::Wet]
            .into_iter()
            .find(|c| id == c.input() || id == c.slider())
    }
}

pub struct DeviceThresholdController {
    services: Services,
    device_id: String,
    managed_plant_id: Option<String>,
    chart: ChartTarget,
}

impl DeviceThresholdController {
    pub fn new(context: &PageContext, services: Services) -> Result<Self, RouteError> {
        Ok(Self {
            device_id: context.require("device_id")?.to_string(),
            managed_plant_id: context.get("managed_plant_id").map(str::to_string),
            chart: ChartTarget::plain(SOIL_CHART, CHART_LOADER),
            services,
        })
    }

    fn document(&self) -> &dyn Document {
        self.services.document.as_ref()
    }

    pub fn threshold(&self, control: ThresholdControl) -> Option<SoilThreshold> {
        self.document()
            .value(control.input())
            .and_then(|v| SoilThreshold::parse(&v).ok())
    }

    /// Moves every part of `control` to `value` and the chart's line with it.
    fn apply(&self, control: ThresholdControl, value: SoilThreshold) {
        let document = self.document();
        let text = value.value().to_string();
        document.set_value(control.slider(), &text);
        document.set_value(control.input(), &text);
        document.set_text(control.value_label(), &text);
        document.set_text(control.voltage_label(), &value.voltage_label());
        self.update_chart_lines();
    }

    fn update_chart_lines(&self) {
        let annotations = threshold_annotations(
            self.threshold(ThresholdControl::Dry),
            self.threshold(ThresholdControl::Wet),
        );
        self.services.charts.with_chart(SOIL_CHART, |chart| {
            chart.config_mut().set_annotations(annotations);
            chart.redraw();
        });
    }

    fn apply_raw(&self, control: ThresholdControl, raw: &str) {
        match SoilThreshold::parse(raw) {
            Ok(value) => self.apply(control, value),
            Err(_) => tracing::debug!("Ignoring out-of-range threshold '{}' on {}", raw, control.input()),
        }
    }

    async fn load_profile(&self, managed_plant_id: &str) {
        match self.services.api.managed_watering_profile(managed_plant_id).await {
            Ok(profile) => {
                let dry = profile.dry_threshold().map(|t| t.value());
                let wet = profile.wet_threshold().map(|t| t.value());
                for (control, stored) in [(ThresholdControl::Dry, dry), (ThresholdControl::Wet, wet)] {
                    let value = stored.unwrap_or_else(|| control.default_value());
                    if let Ok(value) = SoilThreshold::new(value) {
                        self.apply(control, value);
                    }
                }
                show_watering_days(self.document(), &profile);
            }
            Err(e) => {
                tracing::error!("Profile fetch error: {}", e);
                self.services.alerts.show(
                    AlertKind::Warning,
                    "Could not load existing profile settings.",
                    ALERT_BOX,
                );
            }
        }
    }

    async fn refresh_chart(&self, managed_plant_id: &str) -> RenderOutcome {
        let api = self.services.api.clone();
        let id = managed_plant_id.to_string();
        render_soil_chart(
            &self.services,
            &self.chart,
            Some(self.device_id.clone()),
            async move { api.managed_watering_profile(&id).await },
            ALERT_BOX,
        )
        .await
    }

    fn read_profile(&self) -> WateringProfile {
        let stored = |control| {
            self.threshold(control)
                .map(|t| f64::from(t.value()))
                .filter(|v| *v != 0.0)
        };
        let mut profile = WateringProfile {
            soil_moisture_dry_threshold_voltage: stored(ThresholdControl::Dry),
            soil_moisture_wet_threshold_voltage: stored(ThresholdControl::Wet),
            ..Default::default()
        };
        read_watering_days(self.document(), &mut profile);
        profile
    }

    async fn save(&self, managed_plant_id: &str) {
        let profile = self.read_profile();
        let saved = {
            let _busy = BusyButton::engage(self.document(), SAVE_BUTTON, "Saving...", SAVE_IDLE_LABEL);
            self.services
                .api
                .save_managed_watering_profile(managed_plant_id, &profile)
                .await
        };
        match saved {
            Ok(()) => {
                tracing::info!("Watering profile saved for {}", managed_plant_id);
                self.services.alerts.show(
                    AlertKind::Success,
                    "Watering profile saved successfully to the database!",
                    ALERT_BOX,
                );
                self.refresh_chart(managed_plant_id).await;
            }
            Err(e) => alert_failure(&self.services, ALERT_BOX, "Error: ", &e, "Failed to save profile."),
        }
    }

    async fn write_to_device(&self) {
        let raw = |control| self.threshold(control).map(|t| t.value()).unwrap_or(0);
        let command = DeviceProfileCommand {
            dry_threshold: raw(ThresholdControl::Dry),
            wet_threshold: raw(ThresholdControl::Wet),
        };
        tracing::info!("Writing thresholds to device {}: {:?}", self.device_id, command);

        let _busy = BusyButton::engage(self.document(), WRITE_BUTTON, "Writing...", WRITE_IDLE_LABEL);
        match self.services.api.write_device_profile(&self.device_id, &command).await {
            Ok(()) => self.services.alerts.show(
                AlertKind::Success,
                "Command sent to device successfully!",
                ALERT_BOX,
            ),
            Err(e) => alert_failure(
                &self.services,
                ALERT_BOX,
                "Error writing to device: ",
                &e,
                "Failed to write to device.",
            ),
        }
    }
}

#[async_trait]
impl PageController for DeviceThresholdController {
    fn page(&self) -> PageId {
        PageId::DeviceThreshold
    }

    async fn init(&mut self) {
        let Some(managed_plant_id) = self.managed_plant_id.clone() else {
            tracing::info!("No plant assigned to device {}; configuration not available", self.device_id);
            return;
        };
        for control in [ThresholdControl::Dry, ThresholdControl::Wet] {
            let raw = self.document().value(control.slider()).unwrap_or_default();
            self.apply_raw(control, &raw);
        }
        futures::join!(
            self.load_profile(&managed_plant_id),
            self.refresh_chart(&managed_plant_id)
        );
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        let Some(managed_plant_id) = self.managed_plant_id.clone() else {
            return Outcome::Idle;
        };
        match &event {
            UiEvent::Input { id, value } => {
                if let Some(control) = ThresholdControl::from_id(id) {
                    self.apply_raw(control, value);
                }
            }
            UiEvent::Click { id } if id == SAVE_BUTTON => self.save(&managed_plant_id).await,
            UiEvent::Click { id } if id == WRITE_BUTTON => self.write_to_device().await,
            _ => {}
        }
        Outcome::Idle
    }

    fn teardown(&mut self) {
        self.services.charts.clear();
    }
}
