// Device management page - BLE scan, add-device modal, per-device LED controls
use crate::application::alert::{AlertKind, MAIN_ALERT_BOX};
use crate::application::busy::BusyButton;
use crate::application::controllers::{alert_failure, LedForm};
use crate::application::document::{Document, Node};
use crate::application::router::{Outcome, PageController, PageId, Services, UiEvent, RELOAD_DELAY};
use crate::domain::device::{DeviceKind, NewDevice, ScannedDevice};
use async_trait::async_trait;

pub const SCAN_BUTTON: &str = "scan-button";
pub const SCAN_IDLE_LABEL: &str = "Start Scan";
pub const SCAN_ALERT_BOX: &str = "scan-alert-box";
pub const RESULTS_CONTAINER: &str = "scan-results-container";
pub const PLANT_SENSOR_TBODY: &str = "scan-results-plant-tbody";
pub const SWITCHBOT_TBODY: &str = "scan-results-switchbot-tbody";
pub const ADD_BUTTON_PREFIX: &str = "scan-add-";
pub const MODAL: &str = "add-device-modal";
pub const DEVICE_NAME: &str = "device-name";
pub const DEVICE_MAC: &str = "device-mac-address";
pub const DEVICE_TYPE: &str = "device-type";
pub const MODAL_MAC: &str = "modal-mac-address";
pub const MODAL_TYPE: &str = "modal-device-type";
pub const SAVE_BUTTON: &str = "save-device-button";
pub const SAVE_IDLE_LABEL: &str = "Save Device";
pub const LED_BUTTON_PREFIX: &str = "control-led-button-";

pub struct DeviceManagementController {
    services: Services,
    results: Vec<ScannedDevice>,
}

impl DeviceManagementController {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            results: Vec::new(),
        }
    }

    async fn scan(&mut self) {
        let document = self.services.document.clone();
        let _busy = BusyButton::engage(document.as_ref(), SCAN_BUTTON, "Scanning...", SCAN_IDLE_LABEL);
        document.set_displayed(RESULTS_CONTAINER, true);
        document.replace_children(PLANT_SENSOR_TBODY, Vec::new());
        document.replace_children(SWITCHBOT_TBODY, Vec::new());
        self.results.clear();
        self.services.alerts.show(
            AlertKind::Info,
            "Scanning for BLE devices for 10 seconds...",
            SCAN_ALERT_BOX,
        );

        match self.services.api.ble_scan().await {
            Ok(devices) if devices.is_empty() => {
                self.services
                    .alerts
                    .show(AlertKind::Warning, "No supported devices found.", SCAN_ALERT_BOX);
            }
            Ok(devices) => {
                tracing::info!("BLE scan found {} devices", devices.len());
                self.services.alerts.show(
                    AlertKind::Success,
                    &format!("Found {} devices.", devices.len()),
                    SCAN_ALERT_BOX,
                );
                self.render_results(devices);
            }
            Err(e) => alert_failure(&self.services, SCAN_ALERT_BOX, "Error: ", &e, "Scan failed on the server."),
        }
    }

    fn render_results(&mut self, devices: Vec<ScannedDevice>) {
        let document = self.services.document.as_ref();
        for (index, device) in devices.iter().enumerate() {
            let add_button = Node::new("button")
                .class("btn")
                .class("btn-sm")
                .class("btn-success")
                .class("btn-add")
                .attr("id", format!("{}{}", ADD_BUTTON_PREFIX, index))
                .attr("data-name", device.name.as_str())
                .attr("data-address", device.address.as_str())
                .attr("data-type", device.device_type.as_str())
                .text("Add");
            let cell = |text: String| Node::new("td").text(text);
            let signal = format!("{} dBm", device.rssi);

            match device.kind() {
                DeviceKind::PlantSensor => {
                    let row = Node::new("tr")
                        .child(cell(device.name.clone()))
                        .child(cell(device.address.clone()))
                        .child(cell(signal))
                        .child(Node::new("td").child(add_button));
                    document.append_child(PLANT_SENSOR_TBODY, row);
                }
                DeviceKind::SwitchBot(model) => {
                    let badge = Node::new("span").class("badge").class("bg-info").text(model);
                    let row = Node::new("tr")
                        .child(cell(device.name.clone()))
                        .child(cell(device.address.clone()))
                        .child(Node::new("td").child(badge))
                        .child(cell(signal))
                        .child(Node::new("td").child(add_button));
                    document.append_child(SWITCHBOT_TBODY, row);
                }
                DeviceKind::Unsupported => {
                    tracing::debug!("Skipping unsupported device type {}", device.device_type);
                }
            }
        }
        self.results = devices;
    }

    /// Opens the add-device modal pre-filled from a result row.
    fn open_modal(&self, index: usize) {
        let Some(device) = self.results.get(index) else {
            tracing::warn!("No scan result at index {}", index);
            return;
        };
        let document = self.services.document.as_ref();
        document.set_value(DEVICE_NAME, &device.name);
        document.set_value(DEVICE_MAC, &device.address);
        document.set_value(DEVICE_TYPE, &device.device_type);
        document.set_text(MODAL_MAC, &device.address);
        document.set_text(MODAL_TYPE, &device.device_type);
        document.set_displayed(MODAL, true);
    }

    async fn save_device(&self) -> Outcome {
        let document = self.services.document.as_ref();
        let value = |id: &str| document.value(id).unwrap_or_default();
        let device = match NewDevice::new(&value(DEVICE_NAME), &value(DEVICE_MAC), &value(DEVICE_TYPE)) {
            Ok(device) => device,
            Err(e) => {
                self.services.alerts.show(AlertKind::Danger, &e.to_string(), MAIN_ALERT_BOX);
                return Outcome::Idle;
            }
        };

        let _busy = BusyButton::engage(document, SAVE_BUTTON, "Saving...", SAVE_IDLE_LABEL);
        match self.services.api.add_device(&device).await {
            Ok(()) => {
                tracing::info!("Device {} added", device.mac_address);
                document.set_displayed(MODAL, false);
                self.services.alerts.show(
                    AlertKind::Success,
                    &format!("Device \"{}\" added successfully! Page will reload.", device.device_name),
                    MAIN_ALERT_BOX,
                );
                Outcome::Reload { after: RELOAD_DELAY }
            }
            Err(e) => {
                alert_failure(&self.services, MAIN_ALERT_BOX, "Error: ", &e, "Failed to add device.");
                Outcome::Idle
            }
        }
    }
}

#[async_trait]
impl PageController for DeviceManagementController {
    fn page(&self) -> PageId {
        PageId::Devices
    }

    async fn init(&mut self) {
        let document = self.services.document.as_ref();
        if !document.exists(SCAN_BUTTON) {
            tracing::warn!("Scan button not found, device scanning disabled");
        }
        document.set_displayed(RESULTS_CONTAINER, false);
        document.set_displayed(MODAL, false);
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        let UiEvent::Click { id } = &event else {
            return Outcome::Idle;
        };
        if id == SCAN_BUTTON {
            self.scan().await;
        } else if id == SAVE_BUTTON {
            return self.save_device().await;
        } else if let Some(index) = id.strip_prefix(ADD_BUTTON_PREFIX) {
            if let Ok(index) = index.parse() {
                self.open_modal(index);
            }
        } else if let Some(device_id) = id.strip_prefix(LED_BUTTON_PREFIX) {
            LedForm::row(device_id).submit(&self.services).await;
        }
        Outcome::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api::ApiError;
    use crate::application::testing::{last_alert, services, Call};
    use crate::infrastructure::layout;

    fn scanned(name: &str, address: &str, device_type: &str) -> ScannedDevice {
        ScannedDevice {
            name: name.to_string(),
            address: address.to_string(),
            device_type: device_type.to_string(),
            rssi: -61,
        }
    }

    #[tokio::test]
    async fn test_scan_renders_typed_tables() {
        let (services, document, api) = services();
        layout::scaffold_device_management(&document, &[]);
        api.set_scan(vec![
            scanned("Plant A", "AA:01", "plant_sensor"),
            scanned("Meter", "AA:02", "switchbot_meter"),
            scanned("Beacon", "AA:03", "ibeacon"),
        ]);
        let mut controller = DeviceManagementController::new(services);
        controller.init().await;
        controller.handle(UiEvent::click(SCAN_BUTTON)).await;

        let plants = document.children(PLANT_SENSOR_TBODY);
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].text_content(), "Plant AAA:01-61 dBmAdd");
        let bots = document.children(SWITCHBOT_TBODY);
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].children[2].children[0].text, "meter");
        assert_eq!(
            last_alert(&document, SCAN_ALERT_BOX),
            Some(("success".to_string(), "Found 3 devices.".to_string()))
        );
        assert!(document.is_displayed(RESULTS_CONTAINER));
        assert!(!document.is_disabled(SCAN_BUTTON));
        assert_eq!(document.text(SCAN_BUTTON).as_deref(), Some(SCAN_IDLE_LABEL));
    }

    #[tokio::test]
    async fn test_empty_scan_warns() {
        let (services, document, _) = services();
        layout::scaffold_device_management(&document, &[]);
        let mut controller = DeviceManagementController::new(services);
        controller.handle(UiEvent::click(SCAN_BUTTON)).await;
        assert_eq!(
            last_alert(&document, SCAN_ALERT_BOX),
            Some(("warning".to_string(), "No supported devices found.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_scan_failure_uses_fallback() {
        let (services, document, api) = services();
        layout::scaffold_device_management(&document, &[]);
        api.fail_with(ApiError::Rejected(None));
        let mut controller = DeviceManagementController::new(services);
        controller.handle(UiEvent::click(SCAN_BUTTON)).await;
        assert_eq!(
            last_alert(&document, SCAN_ALERT_BOX),
            Some(("danger".to_string(), "Error: Scan failed on the server.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_row_prefills_modal_and_save_reloads() {
        let (services, document, api) = services();
        layout::scaffold_device_management(&document, &[]);
        api.set_scan(vec![scanned("Plant A", "AA:01", "plant_sensor")]);
        let mut controller = DeviceManagementController::new(services);
        controller.init().await;
        controller.handle(UiEvent::click(SCAN_BUTTON)).await;
        controller.handle(UiEvent::click("scan-add-0")).await;

        assert!(document.is_displayed(MODAL));
        assert_eq!(document.value(DEVICE_MAC).as_deref(), Some("AA:01"));
        assert_eq!(document.text(MODAL_TYPE).as_deref(), Some("plant_sensor"));

        document.set_value(DEVICE_NAME, "Kitchen Fern");
        let outcome = controller.handle(UiEvent::click(SAVE_BUTTON)).await;
        assert_eq!(outcome, Outcome::Reload { after: RELOAD_DELAY });
        assert!(!document.is_displayed(MODAL));
        assert!(api.calls().contains(&Call::AddDevice(NewDevice {
            device_name: "Kitchen Fern".to_string(),
            mac_address: "AA:01".to_string(),
            device_type: "plant_sensor".to_string(),
        })));
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX).map(|(_, text)| text),
            Some("Device \"Kitchen Fern\" added successfully! Page will reload.".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_device_name_is_rejected() {
        let (services, document, api) = services();
        layout::scaffold_device_management(&document, &[]);
        let mut controller = DeviceManagementController::new(services);
        let outcome = controller.handle(UiEvent::click(SAVE_BUTTON)).await;
        assert_eq!(outcome, Outcome::Idle);
        assert!(api.calls().is_empty());
        assert_eq!(
            last_alert(&document, MAIN_ALERT_BOX),
            Some(("danger".to_string(), "Device name is required.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_row_led_controls() {
        let (services, document, api) = services();
        layout::scaffold_device_management(&document, &["d7".to_string()]);
        let mut controller = DeviceManagementController::new(services);
        controller.handle(UiEvent::click("control-led-button-d7")).await;

        assert!(matches!(api.calls().as_slice(), [Call::ControlLed(cmd)] if cmd.device_id == "d7"));
        assert_eq!(
            last_alert(&document, "profiles-alert-box"),
            Some(("success".to_string(), "LED command sent to d7!".to_string()))
        );
    }
}
