// Plant library page - list/editor over the species records, AI lookup
use crate::application::alert::{AlertKind, MAIN_ALERT_BOX};
use crate::application::busy::BusyButton;
use crate::application::cards::PLACEHOLDER;
use crate::application::controllers::{alert_failure, ImageSource};
use crate::application::document::{activate_exclusive, Document, Node};
use crate::application::router::{Outcome, PageController, PageId, Services, UiEvent, RELOAD_DELAY};
use crate::domain::plant::{
    month_label, LibraryPlant, LookupRequest, MonthlyTemps, LIBRARY_TEXT_FIELDS, LIBRARY_THRESHOLD_FIELDS,
    LOOKUP_KEY_FIELDS, MONTHS,
};
use async_trait::async_trait;

pub const ADD_BUTTON: &str = "add-plant-btn";
pub const LOOKUP_BUTTON: &str = "ai-lookup-btn";
pub const LOOKUP_IDLE_LABEL: &str = "Search with AI";
pub const SAVE_BUTTON: &str = "save-plant-btn";
pub const SAVE_IDLE_LABEL: &str = "Save Plant Info";
pub const DELETE_BUTTON: &str = "delete-plant-btn";
pub const DELETE_IDLE_LABEL: &str = "Delete";
pub const PLANT_LIST: &str = "plant-list";
pub const ITEM_PREFIX: &str = "plant-item-";
pub const EDITOR: &str = "plant-editor-area";
pub const EDITOR_PLACEHOLDER: &str = "plant-editor-placeholder";
pub const EDITOR_TITLE: &str = "editor-title";
pub const MONTHLY_TBODY: &str = "monthly-temps-tbody";
pub const PLANT_ID_FIELD: &str = "plant_id";
pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this plant from the library? This action cannot be undone.";

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Placeholder,
    New,
    Editing(String),
}

pub struct PlantLibraryController {
    services: Services,
    plants: Vec<LibraryPlant>,
    state: EditorState,
    image: ImageSource,
    /// Climate table currently shown; the form has no inputs for it.
    monthly_temps: Option<MonthlyTemps>,
}

impl PlantLibraryController {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            plants: Vec::new(),
            state: EditorState::Placeholder,
            image: ImageSource::with_url_input("image_url"),
            monthly_temps: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    fn document(&self) -> &dyn Document {
        self.services.document.as_ref()
    }

    fn item_ids(&self) -> Vec<String> {
        self.plants
            .iter()
            .filter_map(|p| p.plant_id.as_ref())
            .map(|id| format!("{}{}", ITEM_PREFIX, id))
            .collect()
    }

    fn render_list(&self) {
        let items = self
            .plants
            .iter()
            .filter_map(|plant| {
                let id = plant.plant_id.as_ref()?;
                Some(
                    Node::new("a")
                        .class("list-group-item")
                        .class("list-group-item-action")
                        .attr("id", format!("{}{}", ITEM_PREFIX, id))
                        .attr("data-plant-id", id.as_str())
                        .text(plant.display_name()),
                )
            })
            .collect();
        self.document().replace_children(PLANT_LIST, items);
    }

    fn show_editor(&self) {
        self.document().set_displayed(EDITOR_PLACEHOLDER, false);
        self.document().set_displayed(EDITOR, true);
    }

    fn reset_form(&self) {
        let document = self.document();
        for field in LIBRARY_TEXT_FIELDS.iter().chain(LIBRARY_THRESHOLD_FIELDS.iter()) {
            document.set_value(field, "");
        }
        document.replace_children(MONTHLY_TBODY, Vec::new());
    }

    fn deactivate_items(&self) {
        for id in self.item_ids() {
            if self.document().has_class(&id, "active") {
                self.document().remove_class(&id, "active");
            }
        }
    }

    fn start_new(&mut self) {
        self.reset_form();
        self.deactivate_items();
        self.document().set_text(EDITOR_TITLE, "New Plant");
        self.image.show(self.document(), None);
        self.show_editor();
        self.state = EditorState::New;
        self.monthly_temps = None;
    }

    fn select(&mut self, plant_id: &str) {
        let Some(plant) = self
            .plants
            .iter()
            .find(|p| p.plant_id.as_deref() == Some(plant_id))
            .cloned()
        else {
            tracing::warn!("Library plant {} not found", plant_id);
            return;
        };
        activate_exclusive(self.document(), &self.item_ids(), &format!("{}{}", ITEM_PREFIX, plant_id));
        self.populate(&plant, false);
        self.show_editor();
        self.state = EditorState::Editing(plant_id.to_string());
        self.monthly_temps = plant.monthly_temps;
    }

    /// Fills the form. A lookup result keeps what the user typed into the
    /// lookup key fields.
    fn populate(&self, plant: &LibraryPlant, keep_lookup_keys: bool) {
        if !keep_lookup_keys {
            self.reset_form();
        }
        let document = self.document();
        for (field, value) in plant.form_fields() {
            if keep_lookup_keys && LOOKUP_KEY_FIELDS.contains(&field) {
                continue;
            }
            document.set_value(field, &value);
        }
        if let Some(temps) = &plant.monthly_temps {
            render_monthly_temps(document, temps);
        }
        document.set_text(EDITOR_TITLE, &format!("Editing: {}", plant.display_name()));
        match plant.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => self.image.show(document, Some(url)),
            None => {
                document.set_attribute(self.image.preview, "src", super::IMAGE_PLACEHOLDER);
                self.image.sync(document);
            }
        }
    }

    async fn save(&self) -> Outcome {
        let document = self.document();
        let _busy = BusyButton::engage(document, SAVE_BUTTON, "Saving...", SAVE_IDLE_LABEL);

        let image_url = match self.image.resolve(&self.services).await {
            Ok(url) => url,
            Err(e) => {
                alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Image upload failed.");
                return Outcome::Idle;
            }
        };
        let mut plant = LibraryPlant::from_form(|field| document.value(field));
        plant.image_url = image_url;
        plant.monthly_temps = self.monthly_temps.clone();

        match self.services.api.save_plant(&plant).await {
            Ok(()) => {
                tracing::info!("Library plant saved: {}", plant.display_name());
                self.services.alerts.show(
                    AlertKind::Success,
                    &format!(
                        "Plant \"{} {}\" saved successfully! Page will reload.",
                        plant.genus.as_deref().unwrap_or_default(),
                        plant.species.as_deref().unwrap_or_default()
                    ),
                    MAIN_ALERT_BOX,
                );
                Outcome::Reload { after: RELOAD_DELAY }
            }
            Err(e) => {
                alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Failed to save plant info.");
                Outcome::Idle
            }
        }
    }

    async fn delete(&self) -> Outcome {
        let document = self.document();
        let Some(plant_id) = document.value(PLANT_ID_FIELD).filter(|id| !id.trim().is_empty()) else {
            return Outcome::Idle;
        };
        if !document.confirm(DELETE_CONFIRMATION) {
            return Outcome::Idle;
        }

        let _busy = BusyButton::engage(document, DELETE_BUTTON, "Deleting...", DELETE_IDLE_LABEL);
        match self.services.api.delete_plant(&plant_id).await {
            Ok(()) => {
                tracing::info!("Library plant {} deleted", plant_id);
                self.services.alerts.show(
                    AlertKind::Success,
                    "Plant deleted successfully! Page will reload.",
                    MAIN_ALERT_BOX,
                );
                Outcome::Reload { after: RELOAD_DELAY }
            }
            Err(e) => {
                alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Failed to delete plant.");
                Outcome::Idle
            }
        }
    }

    async fn lookup(&mut self) {
        let Some(found) = self.search().await else {
            return;
        };
        self.populate(&found, true);
        // A result without climate data leaves the current table in place.
        if found.monthly_temps.is_some() {
            self.monthly_temps = found.monthly_temps;
        }
        self.services.alerts.show(
            AlertKind::Success,
            "AI search successful! Data has been populated.",
            MAIN_ALERT_BOX,
        );
    }

    async fn search(&self) -> Option<LibraryPlant> {
        let document = self.document();
        let value = |field: &str| document.value(field).unwrap_or_default();
        let request = match LookupRequest::new(&value("genus"), &value("species"), &value("variety")) {
            Ok(request) => request,
            Err(e) => {
                self.services.alerts.show(AlertKind::Warning, &e.to_string(), MAIN_ALERT_BOX);
                return None;
            }
        };

        let _busy = BusyButton::engage(document, LOOKUP_BUTTON, "Searching...", LOOKUP_IDLE_LABEL);
        match self.services.api.lookup_plant(&request).await {
            Ok(found) => Some(found),
            Err(e) => {
                alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "AI search failed.");
                None
            }
        }
    }
}

/// Jan..Dec rows of avg/high/low, `--` where a value is missing.
pub fn render_monthly_temps(document: &dyn Document, temps: &MonthlyTemps) {
    let cell = |value: Option<f64>| {
        Node::new("td").text(value.map(|v| v.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string()))
    };
    let rows = MONTHS
        .iter()
        .map(|month| {
            let climate = temps.get(*month).cloned().unwrap_or_default();
            Node::new("tr")
                .child(Node::new("td").text(month_label(month)))
                .child(cell(climate.avg))
                .child(cell(climate.high))
                .child(cell(climate.low))
        })
        .collect();
    document.replace_children(MONTHLY_TBODY, rows);
}

#[async_trait]
impl PageController for PlantLibraryController {
    fn page(&self) -> PageId {
        PageId::Plants
    }

    async fn init(&mut self) {
        self.document().set_displayed(EDITOR, false);
        self.document().set_displayed(EDITOR_PLACEHOLDER, true);
        match self.services.api.list_plants().await {
            Ok(plants) => {
                tracing::info!("Loaded {} library plants", plants.len());
                self.plants = plants;
                self.render_list();
            }
            Err(e) => alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Could not load plants."),
        }
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
            SAVE_BUTTON => return self.save().await,
            DELETE_BUTTON => return self.delete().await,
            LOOKUP_BUTTON => self.lookup().await,
            other => {
                if let Some(plant_id) = other.strip_prefix(ITEM_PREFIX) {
                    self.select(plant_id);
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
    use crate::application::testing::{last_alert, services, Call};
    use crate::domain::plant::{ImageUpload, MonthClimate};
    use crate::domain::thresholds::ThresholdSet;
    use crate::infrastructure::layout;
    use crate::infrastructure::memory_document::MemoryDocument;
    use std::sync::Arc;

    fn ficus() -> LibraryPlant {
        LibraryPlant {
            plant_id: Some("p1".to_string()),
            genus: Some("Ficus".to_string()),
            species: Some("lyrata".to_string()),
            image_url: Some("/static/ficus.jpg".to_string()),
            monthly_temps: Some(MonthlyTemps::from([(
                "jan".to_string(),
                MonthClimate {
                    avg: Some(12.5),
                    high: Some(18.0),
                    low: None,
                },
            )])),
            thresholds: ThresholdSet {
                lethal_temp_low: Some(2.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn booted() -> (PlantLibraryController, Arc<MemoryDocument>, Arc<crate::application::testing::FakeApi>) {
        let (services, document, api) = services();
        layout::scaffold_plant_library(&document);
        api.set_plants(vec![ficus()]);
        let mut controller = PlantLibraryController::new(services);
        controller.init().await;
        (controller, document, api)
    }

    #[tokio::test]
    async fn test_select_populates_editor() {
        let (mut controller, document, _) = booted().await;
        assert_eq!(document.children(PLANT_LIST)[0].text, "Ficus lyrata");
        assert!(!document.is_displayed(EDITOR));

        controller.handle(UiEvent::click("plant-item-p1")).await;
        assert_eq!(controller.state(), &EditorState::Editing("p1".to_string()));
        assert!(document.is_displayed(EDITOR));
        assert!(!document.is_displayed(EDITOR_PLACEHOLDER));
        assert!(document.has_class("plant-item-p1", "active"));
        assert_eq!(document.value("genus").as_deref(), Some("Ficus"));
        assert_eq!(document.value("lethal_temp_low").as_deref(), Some("2"));
        assert_eq!(document.text(EDITOR_TITLE).as_deref(), Some("Editing: Ficus lyrata"));
        assert_eq!(
            document.attribute("plant-image-preview", "src").as_deref(),
            Some("/static/ficus.jpg")
        );

        let rows = document.children(MONTHLY_TBODY);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].text_content(), "Jan12.518--");
        assert_eq!(rows[1].text_content(), "Feb------");
    }

    #[tokio::test]
    async fn test_new_resets_form() {
        let (mut controller, document, _) = booted().await;
        controller.handle(UiEvent::click("plant-item-p1")).await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;

        assert_eq!(controller.state(), &EditorState::New);
        assert_eq!(document.value("genus").as_deref(), Some(""));
        assert_eq!(document.text(EDITOR_TITLE).as_deref(), Some("New Plant"));
        assert!(!document.has_class("plant-item-p1", "active"));
        assert!(document.children(MONTHLY_TBODY).is_empty());
    }

    #[tokio::test]
    async fn test_save_uploads_image_first() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        document.set_value("genus", "Monstera");
        document.set_value("species", "deliciosa");
        controller
            .handle(UiEvent::toggle("image-source-upload", true))
            .await;
        document.attach_file(
            "plant-image-upload",
            ImageUpload {
                file_name: "m.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0; 4],
            },
        );
        api.set_upload_url("/static/uploads/m.png");

        let outcome = controller.handle(UiEvent::click(SAVE_BUTTON)).await;
        assert_eq!(outcome, Outcome::Reload { after: RELOAD_DELAY });
        let calls = api.calls();
        assert_eq!(calls[1], Call::UploadImage("m.png".to_string()));
        let Call::SavePlant(saved) = &calls[2] else {
            panic!("expected save, got {:?}", calls[2]);
        };
        assert_eq!(saved.image_url.as_deref(), Some("/static/uploads/m.png"));
        assert_eq!(saved.genus.as_deref(), Some("Monstera"));
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX).map(|(_, t)| t),
            Some("Plant \"Monstera deliciosa\" saved successfully! Page will reload.".to_string())
        );
        assert!(!document.is_disabled(SAVE_BUTTON));
    }

    #[tokio::test]
    async fn test_save_failure_restores_button() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click("plant-item-p1")).await;
        api.fail_call(
            "save_plant",
            ApiError::Status {
                status: 500,
                message: None,
            },
        );
        let outcome = controller.handle(UiEvent::click(SAVE_BUTTON)).await;
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(document.text(SAVE_BUTTON).as_deref(), Some(SAVE_IDLE_LABEL));
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX),
            Some(("danger".to_string(), "Error: Failed to save plant info.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click("plant-item-p1")).await;

        assert_eq!(controller.handle(UiEvent::click(DELETE_BUTTON)).await, Outcome::Idle);
        assert_eq!(document.confirmations(), vec![DELETE_CONFIRMATION]);
        assert!(!api.calls().iter().any(|c| matches!(c, Call::DeletePlant(_))));

        document.answer_confirm(true);
        let outcome = controller.handle(UiEvent::click(DELETE_BUTTON)).await;
        assert_eq!(outcome, Outcome::Reload { after: RELOAD_DELAY });
        assert!(api.calls().contains(&Call::DeletePlant("p1".to_string())));
    }

    #[tokio::test]
    async fn test_lookup_keeps_typed_keys() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        document.set_value("genus", "calathea");
        api.set_lookup(LibraryPlant {
            genus: Some("Calathea".to_string()),
            species: Some("orbifolia".to_string()),
            origin_country: Some("Bolivia".to_string()),
            ..Default::default()
        });

        controller.handle(UiEvent::click(LOOKUP_BUTTON)).await;
        assert_eq!(document.value("genus").as_deref(), Some("calathea"));
        assert_eq!(document.value("species").as_deref(), Some(""));
        assert_eq!(document.value("origin_country").as_deref(), Some("Bolivia"));
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX).map(|(kind, _)| kind),
            Some("success".to_string())
        );
    }

    #[tokio::test]
    async fn test_save_after_lookup_keeps_climate_table() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        document.set_value("genus", "Ficus");
        document.set_value("species", "lyrata");
        let found = ficus();
        api.set_lookup(LibraryPlant {
            plant_id: None,
            ..found.clone()
        });

        controller.handle(UiEvent::click(LOOKUP_BUTTON)).await;
        assert_eq!(document.children(MONTHLY_TBODY).len(), 12);
        controller.handle(UiEvent::click(SAVE_BUTTON)).await;

        let saved = api
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::SavePlant(plant) => Some(plant),
                _ => None,
            })
            .unwrap();
        assert_eq!(saved.monthly_temps, found.monthly_temps);
    }

    #[tokio::test]
    async fn test_new_after_select_saves_without_climate_table() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click("plant-item-p1")).await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        document.set_value("genus", "Pilea");
        controller.handle(UiEvent::click(SAVE_BUTTON)).await;

        let saved = api
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::SavePlant(plant) => Some(plant),
                _ => None,
            })
            .unwrap();
        assert_eq!(saved.monthly_temps, None);
    }

    #[tokio::test]
    async fn test_lookup_without_terms_warns() {
        let (mut controller, document, api) = booted().await;
        controller.handle(UiEvent::click(ADD_BUTTON)).await;
        controller.handle(UiEvent::click(LOOKUP_BUTTON)).await;
        assert_eq!(api.calls(), vec![Call::ListPlants]);
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX),
            Some((
                "warning".to_string(),
                "Please enter at least a Genus or Species to search.".to_string()
            ))
        );
    }
}
