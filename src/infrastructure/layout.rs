// Page scaffolds - the conventional element ids each page renders
use crate::application::alert::MAIN_ALERT_BOX;
use crate::application::charts::config::TOGGLE_GROUPS;
use crate::application::controllers::{
    dashboard, device_detail, device_management as devices, device_threshold as threshold, managed_plants,
    plant_detail, plant_library as library, watering_profiles as profiles, HistoryPanel, ImageSource, LedForm,
    DRY_THRESHOLD_INPUT, IMAGE_PLACEHOLDER, LED_IDLE_LABEL, SOIL_CHART, WATERING_DAYS_INPUTS, WET_THRESHOLD_INPUT,
};
use crate::application::router::{PageContext, PageId};
use crate::domain::plant::{LIBRARY_TEXT_FIELDS, LIBRARY_THRESHOLD_FIELDS};
use crate::domain::watering::{DEFAULT_DRY_THRESHOLD, DEFAULT_WET_THRESHOLD};
use crate::infrastructure::memory_document::MemoryDocument;
use chrono::NaiveDate;

const CARD_PLACEHOLDER: &str = "--";

/// Builds the page `context` names. `devices`/`plants` are the entity ids
/// the server rendered cards and charts for.
pub fn scaffold_page(document: &MemoryDocument, context: &PageContext, devices: &[String], plants: &[String]) {
    match context.page {
        PageId::Dashboard => scaffold_dashboard(document, devices, plants),
        PageId::DeviceDetail => {
            if let Some(device_id) = context.get("device_id").or(devices.first().map(String::as_str)) {
                scaffold_device_detail(document, device_id);
            }
        }
        PageId::Devices => scaffold_device_management(document, devices),
        PageId::Plants => scaffold_plant_library(document),
        PageId::Management => scaffold_managed_plants(document),
        PageId::WateringProfiles => scaffold_watering_profiles(document),
        PageId::DeviceThreshold => scaffold_device_threshold(document),
        PageId::PlantDetail => {
            if let Some(managed_plant_id) = context.get("managed_plant_id").or(plants.first().map(String::as_str)) {
                scaffold_plant_detail(document, managed_plant_id, devices);
            }
        }
    }
}

pub fn scaffold_device_card(document: &MemoryDocument, device_id: &str) {
    document.add_with_class(&format!("device-card-{}", device_id), "card");
    for field in ["temp", "humidity", "light", "soil", "soil-temp1", "soil-temp2", "battery"] {
        document.add_with_text(&format!("{}-{}", field, device_id), CARD_PLACEHOLDER);
    }
    document.add_with_class(&format!("status-icon-{}", device_id), "bi");
    document.add_with_text(&format!("status-text-{}", device_id), CARD_PLACEHOLDER);
}

pub fn scaffold_plant_card(document: &MemoryDocument, plant_id: &str) {
    document.add_with_class(&format!("plant-card-{}", plant_id), "card");
    for field in ["temp", "humidity", "light", "soil", "growth", "watering", "survival"] {
        document.add_with_text(&format!("{}-{}", field, plant_id), CARD_PLACEHOLDER);
    }
    document.add_with_class(&format!("watering-badge-{}", plant_id), "badge");
    document.add_with_class(&format!("watering-icon-{}", plant_id), "bi");
}

/// Canvas, loader, options with dataset toggles, period buttons, date
/// picker, Fit button and range inputs of one history panel.
pub fn scaffold_history_panel(document: &MemoryDocument, panel: &HistoryPanel) {
    let target = panel.target();
    document.add(&target.canvas_id);
    document.add_with_class(&target.loader_id, "spinner-border");
    document.add_with_class(&target.loader_id, "d-none");
    if let Some(options) = &target.options_id {
        document.add_hidden(options);
    }
    if let Some(prefix) = &target.toggle_prefix {
        for (group, _) in TOGGLE_GROUPS {
            let id = format!("{}{}", prefix, group.to_lowercase().replace(' ', "-"));
            document.add_checkbox(&id, true);
            document.add_attribute(&id, "data-dataset-label", group);
        }
    }
    for id in panel.period_button_ids() {
        document.add_with_class(&id, "btn");
        document.add_with_class(&id, "btn-outline-primary");
    }
    document.add_input(&panel.date_picker_id(), "");
    let fit = panel.fit_button_id();
    document.add_with_class(&fit, "btn");
    document.add_with_class(&fit, "btn-outline-info");
    document.add_input(&panel.range_min_id(), "");
    document.add_input(&panel.range_max_id(), "");
}

pub fn scaffold_sensor_chart(document: &MemoryDocument, device_id: &str) {
    scaffold_history_panel(document, &HistoryPanel::sensor(device_id, NaiveDate::default()));
}

pub fn scaffold_analysis_chart(document: &MemoryDocument, managed_plant_id: &str) {
    scaffold_history_panel(document, &HistoryPanel::analysis(managed_plant_id, NaiveDate::default()));
}

pub fn scaffold_led_form(document: &MemoryDocument, form: &LedForm) {
    document.add_input(form.color_id(), "#ffffff");
    document.add_input(form.brightness_id(), "50");
    document.add_input(form.duration_id(), "1000");
    document.add_with_text(form.button_id(), LED_IDLE_LABEL);
    document.add(form.alert_box());
}

pub fn scaffold_image_source(document: &MemoryDocument, source: &ImageSource) {
    document.add_checkbox(source.url_radio, true);
    document.add_checkbox(source.upload_radio, false);
    document.add(source.url_group);
    document.add_with_class(source.upload_group, "d-none");
    document.add_input(source.url_input, "");
    document.add(source.file_input);
    document.add_attribute(source.preview, "src", IMAGE_PLACEHOLDER);
}

pub fn scaffold_dashboard(document: &MemoryDocument, devices: &[String], plants: &[String]) {
    document.add(MAIN_ALERT_BOX);
    document.add_input(dashboard::DATE_PICKER, "");
    for device_id in devices {
        scaffold_device_card(document, device_id);
        scaffold_sensor_chart(document, device_id);
    }
    for plant_id in plants {
        scaffold_plant_card(document, plant_id);
    }
}

pub fn scaffold_device_detail(document: &MemoryDocument, device_id: &str) {
    document.add(device_detail::ALERT_BOX);
    scaffold_device_card(document, device_id);
    scaffold_sensor_chart(document, device_id);
    scaffold_led_form(document, &LedForm::detail(device_id));
}

pub fn scaffold_device_management(document: &MemoryDocument, devices: &[String]) {
    document.add(MAIN_ALERT_BOX);
    document.add(devices::SCAN_ALERT_BOX);
    document.add_with_text(devices::SCAN_BUTTON, devices::SCAN_IDLE_LABEL);
    document.add(devices::RESULTS_CONTAINER);
    document.add(devices::PLANT_SENSOR_TBODY);
    document.add(devices::SWITCHBOT_TBODY);
    document.add_hidden(devices::MODAL);
    document.add_input(devices::DEVICE_NAME, "");
    document.add_input(devices::DEVICE_MAC, "");
    document.add_input(devices::DEVICE_TYPE, "");
    document.add(devices::MODAL_MAC);
    document.add(devices::MODAL_TYPE);
    document.add_with_text(devices::SAVE_BUTTON, devices::SAVE_IDLE_LABEL);
    for device_id in devices {
        scaffold_led_form(document, &LedForm::row(device_id));
    }
}

pub fn scaffold_plant_library(document: &MemoryDocument) {
    document.add(MAIN_ALERT_BOX);
    document.add_with_text(library::ADD_BUTTON, "Add New Plant");
    document.add_with_text(library::LOOKUP_BUTTON, library::LOOKUP_IDLE_LABEL);
    document.add_with_text(library::SAVE_BUTTON, library::SAVE_IDLE_LABEL);
    document.add_with_text(library::DELETE_BUTTON, library::DELETE_IDLE_LABEL);
    document.add(library::PLANT_LIST);
    document.add_hidden(library::EDITOR);
    document.add(library::EDITOR_PLACEHOLDER);
    document.add(library::EDITOR_TITLE);
    document.add(library::MONTHLY_TBODY);
    for field in LIBRARY_TEXT_FIELDS.iter().chain(LIBRARY_THRESHOLD_FIELDS.iter()) {
        document.add_input(field, "");
    }
    scaffold_image_source(document, &ImageSource::with_url_input("image_url"));
}

pub fn scaffold_managed_plants(document: &MemoryDocument) {
    document.add(MAIN_ALERT_BOX);
    document.add_with_text(managed_plants::ADD_BUTTON, "Add New Plant");
    document.add_with_text(managed_plants::SAVE_BUTTON, managed_plants::SAVE_IDLE_LABEL);
    document.add_with_text(managed_plants::DELETE_BUTTON, managed_plants::DELETE_IDLE_LABEL);
    document.add(managed_plants::PLANT_LIST);
    document.add_hidden(managed_plants::EDITOR);
    document.add(managed_plants::EDITOR_PLACEHOLDER);
    document.add(managed_plants::EDITOR_TITLE);
    for field in managed_plants::FORM_FIELDS {
        document.add_input(field, "");
    }
    scaffold_image_source(document, &ImageSource::with_url_input("image-url"));
}

fn scaffold_watering_form(document: &MemoryDocument) {
    document.add_input(DRY_THRESHOLD_INPUT, "");
    document.add_input(WET_THRESHOLD_INPUT, "");
    for id in WATERING_DAYS_INPUTS {
        document.add_input(id, "");
    }
    document.add(SOIL_CHART);
}

pub fn scaffold_watering_profiles(document: &MemoryDocument) {
    document.add(MAIN_ALERT_BOX);
    document.add(profiles::PLANT_LIST);
    document.add_hidden(profiles::EDITOR);
    document.add(profiles::EDITOR_PLACEHOLDER);
    document.add(profiles::EDITOR_TITLE);
    document.add_input(profiles::LIBRARY_ID_INPUT, "");
    document.add_with_text(profiles::SAVE_BUTTON, profiles::SAVE_IDLE_LABEL);
    scaffold_watering_form(document);
    document.add_with_class(profiles::CHART_LOADER, "d-none");
}

pub fn scaffold_device_threshold(document: &MemoryDocument) {
    use threshold::ThresholdControl;

    document.add(threshold::ALERT_BOX);
    document.add_with_text(threshold::SAVE_BUTTON, threshold::SAVE_IDLE_LABEL);
    document.add_with_text(threshold::WRITE_BUTTON, threshold::WRITE_IDLE_LABEL);
    scaffold_watering_form(document);
    for (control, default) in [
        (ThresholdControl::Dry, DEFAULT_DRY_THRESHOLD),
        (ThresholdControl::Wet, DEFAULT_WET_THRESHOLD),
    ] {
        document.add_input(control.slider(), &default.to_string());
        document.add(control.value_label());
        document.add(control.voltage_label());
    }
    document.add_with_class(threshold::CHART_LOADER, "d-none");
}

pub fn scaffold_plant_detail(document: &MemoryDocument, managed_plant_id: &str, devices: &[String]) {
    document.add(MAIN_ALERT_BOX);
    scaffold_plant_card(document, managed_plant_id);
    scaffold_analysis_chart(document, managed_plant_id);
    for device_id in devices {
        scaffold_sensor_chart(document, device_id);
    }
    document.add(plant_detail::CLIMATE_CHART);
}
