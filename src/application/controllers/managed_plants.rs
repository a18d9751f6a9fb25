// Management page - managed plant list/editor with image source choice
use crate::application::alert::{AlertKind, MAIN_ALERT_BOX};
use crate::application::busy::BusyButton;
use crate::application::controllers::{alert_failure, ImageSource};
use crate::application::document::{activate_exclusive, Document, Node};
use crate::application::router::{Outcome, PageController, PageId, Services, UiEvent};
use crate::domain::plant::ManagedPlant;
use async_trait::async_trait;

pub const ADD_BUTTON: &str = "add-managed-plant-btn";
pub const SAVE_BUTTON: &str = "save-managed-plant-btn";
pub const SAVE_IDLE_LABEL: &str = "Save Changes";
pub const DELETE_BUTTON: &str = "delete-managed-plant-btn";
pub const DELETE_IDLE_LABEL: &str = "Delete";
pub const PLANT_LIST: &str = "managed-plant-list";
pub const ITEM_PREFIX: &str = "managed-plant-item-";
pub const EDITOR: &str = "editor-area";
pub const EDITOR_PLACEHOLDER: &str = "editor-placeholder";
pub const EDITOR_TITLE: &str = "editor-title";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this plant?";

/// Editor inputs in `ManagedPlant` field order.
pub const FORM_FIELDS: [&str; 5] = [
    "managed-plant-id",
    "plant-name",
    "library-plant-id",
    "assigned-plant-sensor-id",
    "assigned-switchbot-id",
];
const URL_INPUT: &str = "image-url";

pub struct ManagedPlantsController {
    services: Services,
    plants: Vec<ManagedPlant>,
    image: ImageSource,
}

impl ManagedPlantsController {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            plants: Vec::new(),
            image: ImageSource::with_url_input(URL_INPUT),
        }
    }

    pub fn plants(&self) -> &[ManagedPlant] {
        &self.plants
    }

    fn document(&self) -> &dyn Document {
        self.services.document.as_ref()
    }

    async fn load(&mut self) {
        match self.services.api.list_managed_plants().await {
            Ok(plants) => {
                tracing::info!("Loaded {} managed plants", plants.len());
                self.plants = plants;
                self.render_list();
            }
            Err(e) => tracing::error!("Failed to load managed plants: {}", e),
        }
    }

    fn render_list(&self) {
        let items = if self.plants.is_empty() {
            vec![Node::new("div").class("list-group-item").text("No plants yet.")]
        } else {
            self.plants
                .iter()
                .map(|plant| {
                    Node::new("a")
                        .class("list-group-item")
                        .class("list-group-item-action")
                        .attr("id", format!("{}{}", ITEM_PREFIX, plant.managed_plant_id))
                        .attr("data-managed-plant-id", plant.managed_plant_id.as_str())
                        .text(plant.plant_name.as_str())
                })
                .collect()
        };
        self.document().replace_children(PLANT_LIST, items);
    }

    fn item_ids(&self) -> Vec<String> {
        self.plants
            .iter()
            .map(|p| format!("{}{}", ITEM_PREFIX, p.managed_plant_id))
            .collect()
    }

    fn show_editor(&self, shown: bool) {
        self.document().set_displayed(EDITOR_PLACEHOLDER, !shown);
        self.document().set_displayed(EDITOR, shown);
    }

    fn fill_form(&self, plant: &ManagedPlant) {
        let document = self.document();
        let values = [
            Some(plant.managed_plant_id.as_str()),
            Some(plant.plant_name.as_str()),
            plant.library_plant_id.as_deref(),
            plant.assigned_plant_sensor_id.as_deref(),
            plant.assigned_switchbot_id.as_deref(),
        ];
        for (field, value) in FORM_FIELDS.into_iter().zip(values) {
            document.set_value(field, value.unwrap_or_default());
        }
        self.image.show(document, plant.image_url.as_deref());
    }

    fn read_form(&self) -> ManagedPlant {
        let document = self.document();
        let text = |id: &str| document.value(id).unwrap_or_default().trim().to_string();
        let optional = |id: &str| Some(text(id)).filter(|v| !v.is_empty());
        ManagedPlant {
            managed_plant_id: text("managed-plant-id"),
            plant_name: text("plant-name"),
            library_plant_id: optional("library-plant-id"),
            assigned_plant_sensor_id: optional("assigned-plant-sensor-id"),
            assigned_switchbot_id: optional("assigned-switchbot-id"),
            image_url: optional(URL_INPUT),
        }
    }

    fn start_new(&self) {
        self.fill_form(&ManagedPlant::default());
        for id in self.item_ids() {
            if self.document().has_class(&id, "active") {
                self.document().remove_class(&id, "active");
            }
        }
        self.document().set_text(EDITOR_TITLE, "Add New Managed Plant");
        self.show_editor(true);
    }

    fn select(&self, managed_plant_id: &str) {
        let Some(plant) = self.plants.iter().find(|p| p.managed_plant_id == managed_plant_id) else {
            return;
        };
        activate_exclusive(
            self.document(),
            &self.item_ids(),
            &format!("{}{}", ITEM_PREFIX, managed_plant_id),
        );
        self.fill_form(plant);
        self.document()
            .set_text(EDITOR_TITLE, &format!("Editing: {}", plant.plant_name));
        self.show_editor(true);
    }

    async fn save(&mut self) {
        let saved = {
            let document = self.services.document.clone();
            let _busy = BusyButton::engage(document.as_ref(), SAVE_BUTTON, "Saving...", SAVE_IDLE_LABEL);
            match self.image.resolve(&self.services).await {
                Ok(image_url) => {
                    let mut plant = self.read_form();
                    plant.image_url = image_url;
                    self.services.api.save_managed_plant(&plant).await.map(|_| plant)
                }
                Err(e) => Err(e),
            }
        };

        match saved {
            Ok(plant) => {
                tracing::info!("Managed plant saved: {}", plant.plant_name);
                self.load().await;
                self.services
                    .alerts
                    .show(AlertKind::Success, "Managed plant saved successfully.", MAIN_ALERT_BOX);
                self.show_editor(false);
            }
            Err(e) => alert_failure(&self.services, MAIN_ALERT_BOX, "Error saving plant: ", &e, "Failed to save plant."),
        }
    }

    async fn delete(&mut self) {
        let document = self.services.document.clone();
        let Some(managed_plant_id) = document
            .value("managed-plant-id")
            .filter(|id| !id.trim().is_empty())
        else {
            return;
        };
        if !document.confirm(DELETE_CONFIRMATION) {
            return;
        }

        let deleted = {
            let _busy = BusyButton::engage(document.as_ref(), DELETE_BUTTON, "Deleting...", DELETE_IDLE_LABEL);
            self.services.api.delete_managed_plant(&managed_plant_id).await
        };
        match deleted {
            Ok(()) => {
                tracing::info!("Managed plant {} deleted", managed_plant_id);
                self.load().await;
                self.services
                    .alerts
                    .show(AlertKind::Success, "Managed plant deleted successfully.", MAIN_ALERT_BOX);
                self.show_editor(false);
            }
            Err(e) => alert_failure(
                &self.services,
                MAIN_ALERT_BOX,
                "Error deleting plant: ",
                &e,
                "Failed to delete plant.",
            ),
        }
    }
}

#[async_trait]
impl PageController for ManagedPlantsController {
    fn page(&self) -> PageId {
        PageId::Management
    }

    async fn init(&mut self) {
        self.show_editor(false);
        self.load().await;
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        if self.image.handle(self.services.document.as_ref(), &event) {
            return Outcome::Idle;
        }
        let UiEvent::Click { id } = &event else {
            return Outcome::Idle;
        };
        match id.as_str() {
            ADD_BUTTON => self.start_new(),
            SAVE_BUTTON => self.save().await,
            DELETE_BUTTON => self.delete().await,
            other => {
                if let Some(managed_plant_id) = other.strip_prefix(ITEM_PREFIX) {
                    self.select(managed_plant_id);
                }
            }
        }
        Outcome::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api::ApiError;
    use crate::application::controllers::IMAGE_PLACEHOLDER;
    use crate::application::testing::{last_alert, services, Call, FakeApi};
    use crate::infrastructure::layout;
    use crate::infrastructure::memory_document::MemoryDocument;
    use std::sync::Arc;

    fn fern() -> ManagedPlant {
        ManagedPlant {
            managed_plant_id: "m1".to_string(),
            plant_name: "Office Fern".to_string(),
            library_plant_id: Some("lib-7".to_string()),
            assigned_plant_sensor_id: Some("d1".to_string()),
            assigned_switchbot_id: None,
            image_url: Some("/static/fern.jpg".to_string()),
        }
    }

    async fn booted(plants: Vec<ManagedPlant>) -> (ManagedPlantsController, Arc<MemoryDocument>, Arc<FakeApi>) {
        let (services, document, api) = services();
        layout::scaffold_managed_plants(&document);
        api.set_managed(plants);
        let mut controller = ManagedPlantsController::new(services);
        controller.init().await;
        (controller, document, api)
    }

    #[tokio::test]
    async fn test_empty_list_shows_hint() {
        let (_, document, _) = booted(Vec::new()).await;
        let items = document.children(PLANT_LIST);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "No plants yet.");
        assert!(document.is_displayed(EDITOR_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_select_fills_form() {
        let (mut controller, document, _) = booted(vec![fern()]).await;
        controller.handle(UiEvent::click("managed-plant-item-m1")).await;

        assert!(document.has_class("managed-plant-item-m1", "active"));
        assert_eq!(document.value("plant-name").as_deref(), Some("Office Fern"));
        assert_eq!(document.value("assigned-switchbot-id").as_deref(), Some(""));
        assert_eq!(document.value("image-url").as_deref(), Some("/static/fern.jpg"));
        assert_eq!(document.text(EDITOR_TITLE).as_deref(), Some("Editing: Office Fern"));
        assert!(document.is_displayed(EDITOR));
    }

    #[tokio::test]
    async fn test_new_then_save_refreshes_list() {
        let (mut controller, document, api) = booted(vec![fern()]).await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        assert_eq!(document.value("managed-plant-id").as_deref(), Some(""));
        assert_eq!(
            document.attribute("plant-image-preview", "src").as_deref(),
            Some(IMAGE_PLACEHOLDER)
        );

        document.set_value("plant-name", "Kitchen Basil");
        document.set_value("assigned-plant-sensor-id", "d2");
        controller.handle(UiEvent::click(SAVE_BUTTON)).await;

        let calls = api.calls();
        assert_eq!(
            calls[1],
            Call::SaveManagedPlant(ManagedPlant {
                plant_name: "Kitchen Basil".to_string(),
                assigned_plant_sensor_id: Some("d2".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(calls[2], Call::ListManagedPlants);
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX).map(|(_, text)| text),
            Some("Managed plant saved successfully.".to_string())
        );
        assert!(!document.is_displayed(EDITOR));
        assert!(!document.is_disabled(SAVE_BUTTON));
    }

    #[tokio::test]
    async fn test_save_error_keeps_editor_open() {
        let (mut controller, document, api) = booted(vec![fern()]).await;
        controller.handle(UiEvent::click("managed-plant-item-m1")).await;
        api.fail_call("save_managed_plant", ApiError::Rejected(None));
        controller.handle(UiEvent::click(SAVE_BUTTON)).await;

        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX),
            Some((
                "danger".to_string(),
                "Error saving plant: Failed to save plant.".to_string()
            ))
        );
        assert!(document.is_displayed(EDITOR));
        assert_eq!(document.text(SAVE_BUTTON).as_deref(), Some(SAVE_IDLE_LABEL));
    }

    #[tokio::test]
    async fn test_delete_after_confirmation() {
        let (mut controller, document, api) = booted(vec![fern()]).await;
        controller.handle(UiEvent::click("managed-plant-item-m1")).await;
        document.answer_confirm(true);
        api.set_managed(Vec::new());
        controller.handle(UiEvent::click(DELETE_BUTTON)).await;

        assert!(api.calls().contains(&Call::DeleteManagedPlant("m1".to_string())));
        assert_eq!(document.confirmations(), vec![DELETE_CONFIRMATION]);
        assert!(controller.plants().is_empty());
        assert!(!document.exists("managed-plant-item-m1"));
    }
}
