// Watering profiles page - per-species thresholds and cadence with a soil chart
use crate::application::alert::{AlertKind, MAIN_ALERT_BOX};
use crate::application::busy::BusyButton;
use crate::application::chart_view::{ChartTarget, RenderOutcome};
use crate::application::controllers::{
    alert_failure, read_watering_days, render_soil_chart, show_watering_days, DRY_THRESHOLD_INPUT, SOIL_CHART,
    WET_THRESHOLD_INPUT,
};
use crate::application::document::{activate_exclusive, Document, Node};
use crate::application::router::{Outcome, PageController, PageId, Services, UiEvent};
use crate::domain::plant::ManagedPlant;
use crate::domain::watering::{parse_optional_f64, WateringProfile};
use async_trait::async_trait;

pub const PLANT_LIST: &str = "plant-list-profiles";
pub const ITEM_PREFIX: &str = "profile-item-";
pub const EDITOR: &str = "editor-area-profiles";
pub const EDITOR_PLACEHOLDER: &str = "editor-placeholder-profiles";
pub const EDITOR_TITLE: &str = "editor-title-profiles";
pub const LIBRARY_ID_INPUT: &str = "library-plant-id-input";
pub const SAVE_BUTTON: &str = "save-profile-btn";
pub const SAVE_IDLE_LABEL: &str = "Save Profile";
pub const CHART_LOADER: &str = "chart-loader-profiles";

/// The plant whose profile is open in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub library_plant_id: String,
    pub sensor_id: Option<String>,
}

pub struct WateringProfilesController {
    services: Services,
    plants: Vec<ManagedPlant>,
    selection: Option<Selection>,
    chart: ChartTarget,
}

impl WateringProfilesController {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            plants: Vec::new(),
            selection: None,
            chart: ChartTarget::plain(SOIL_CHART, CHART_LOADER),
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn document(&self) -> &dyn Document {
        self.services.document.as_ref()
    }

    fn item_ids(&self) -> Vec<String> {
        self.plants
            .iter()
            .map(|p| format!("{}{}", ITEM_PREFIX, p.managed_plant_id))
            .collect()
    }

    fn render_list(&self) {
        let items = self
            .plants
            .iter()
            .map(|plant| {
                let mut item = Node::new("a")
                    .class("list-group-item")
                    .class("list-group-item-action")
                    .attr("id", format!("{}{}", ITEM_PREFIX, plant.managed_plant_id))
                    .text(plant.plant_name.as_str());
                if let Some(library_id) = &plant.library_plant_id {
                    item = item.attr("data-library-plant-id", library_id.as_str());
                }
                if let Some(sensor) = &plant.assigned_plant_sensor_id {
                    item = item.attr("data-sensor-id", sensor.as_str());
                }
                item
            })
            .collect();
        self.document().replace_children(PLANT_LIST, items);
    }

    async fn select(&mut self, managed_plant_id: &str) {
        let item_id = format!("{}{}", ITEM_PREFIX, managed_plant_id);
        let Some(plant) = self
            .plants
            .iter()
            .find(|p| p.managed_plant_id == managed_plant_id)
            .cloned()
        else {
            return;
        };
        let Some(library_plant_id) = plant.library_plant_id.clone().filter(|id| !id.is_empty()) else {
            self.services.alerts.show(
                AlertKind::Warning,
                "This plant is not linked to a library entry.",
                MAIN_ALERT_BOX,
            );
            return;
        };

        let document = self.document();
        activate_exclusive(document, &self.item_ids(), &item_id);
        document.set_text(EDITOR_TITLE, &format!("Editing: {}", plant.plant_name.trim()));
        document.set_value(LIBRARY_ID_INPUT, &library_plant_id);
        document.set_displayed(EDITOR_PLACEHOLDER, false);
        document.set_displayed(EDITOR, true);

        let selection = Selection {
            library_plant_id,
            sensor_id: plant.assigned_plant_sensor_id.clone(),
        };
        futures::join!(self.load_profile(&selection), self.refresh_chart(&selection));
        self.selection = Some(selection);
    }

    async fn load_profile(&self, selection: &Selection) {
        let document = self.document();
        match self
            .services
            .api
            .library_watering_profile(&selection.library_plant_id)
            .await
        {
            Ok(profile) => {
                let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
                document.set_value(DRY_THRESHOLD_INPUT, &number(profile.soil_moisture_dry_threshold_voltage));
                document.set_value(WET_THRESHOLD_INPUT, &number(profile.soil_moisture_wet_threshold_voltage));
                show_watering_days(document, &profile);
            }
            Err(e) => {
                tracing::error!("Profile fetch error: {}", e);
                self.services.alerts.show(
                    AlertKind::Warning,
                    "Could not load existing profile settings.",
                    MAIN_ALERT_BOX,
                );
            }
        }
    }

    async fn refresh_chart(&self, selection: &Selection) -> RenderOutcome {
        let api = self.services.api.clone();
        let library_plant_id = selection.library_plant_id.clone();
        render_soil_chart(
            &self.services,
            &self.chart,
            selection.sensor_id.clone(),
            async move { api.library_watering_profile(&library_plant_id).await },
            MAIN_ALERT_BOX,
        )
        .await
    }

    fn read_profile(&self) -> WateringProfile {
        let document = self.document();
        let threshold = |id: &str| {
            document
                .value(id)
                .and_then(|v| parse_optional_f64(&v))
                .filter(|v| *v != 0.0)
        };
        let mut profile = WateringProfile {
            soil_moisture_dry_threshold_voltage: threshold(DRY_THRESHOLD_INPUT),
            soil_moisture_wet_threshold_voltage: threshold(WET_THRESHOLD_INPUT),
            ..Default::default()
        };
        read_watering_days(document, &mut profile);
        profile
    }

    async fn save(&self) {
        let Some(library_plant_id) = self
            .document()
            .value(LIBRARY_ID_INPUT)
            .filter(|id| !id.trim().is_empty())
        else {
            return;
        };
        let profile = self.read_profile();

        let saved = {
            let _busy = BusyButton::engage(self.document(), SAVE_BUTTON, "Saving...", SAVE_IDLE_LABEL);
            self.services
                .api
                .save_library_watering_profile(&library_plant_id, &profile)
                .await
        };
        match saved {
            Ok(()) => {
                tracing::info!("Watering profile saved for library plant {}", library_plant_id);
                self.services.alerts.show(
                    AlertKind::Success,
                    "Watering profile saved successfully!",
                    MAIN_ALERT_BOX,
                );
                if let Some(selection) = &self.selection {
                    self.refresh_chart(selection).await;
                }
            }
            Err(e) => alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Failed to save profile."),
        }
    }
}

#[async_trait]
impl PageController for WateringProfilesController {
    fn page(&self) -> PageId {
        PageId::WateringProfiles
    }

    async fn init(&mut self) {
        self.document().set_displayed(EDITOR, false);
        self.document().set_displayed(EDITOR_PLACEHOLDER, true);
        match self.services.api.list_managed_plants().await {
            Ok(plants) => {
                tracing::info!("Loaded {} plants for watering profiles", plants.len());
                self.plants = plants;
                self.render_list();
            }
            Err(e) => alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Could not load plants."),
        }
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        if let UiEvent::Click { id } = &event {
            if id == SAVE_BUTTON {
                self.save().await;
            } else if let Some(managed_plant_id) = id.strip_prefix(ITEM_PREFIX) {
                self.select(managed_plant_id).await;
            }
        }
        Outcome::Idle
    }

    fn teardown(&mut self) {
        self.services.charts.clear();
    }
}
