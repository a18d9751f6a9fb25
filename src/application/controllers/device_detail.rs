// Device detail page - sensor history panel and LED control
use crate::application::controllers::{HistoryPanel, LedForm};
use crate::application::router::{Outcome, PageContext, PageController, PageId, RouteError, Services, UiEvent};
use async_trait::async_trait;

pub const ALERT_BOX: &str = "device-detail-alert-box";

pub struct DeviceDetailController {
    services: Services,
    panel: HistoryPanel,
    led: LedForm,
}

impl DeviceDetailController {
    pub fn new(context: &PageContext, services: Services) -> Result<Self, RouteError> {
        let device_id = context.require("device_id")?;
        let date = context.date("selected_date")?.unwrap_or(services.today);
        Ok(Self {
            panel: HistoryPanel::sensor(device_id, date),
            led: LedForm::detail(device_id),
            services,
        })
    }
}

#[async_trait]
impl PageController for DeviceDetailController {
    fn page(&self) -> PageId {
        PageId::DeviceDetail
    }

    async fn init(&mut self) {
        self.panel.init(&self.services).await;
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        if let UiEvent::Click { id } = &event {
            if id == self.led.button_id() {
                self.led.submit(&self.services).await;
                return Outcome::Idle;
            }
        }
        self.panel.handle(&self.services, &event).await;
        Outcome::Idle
    }

    fn live_feed(&self) -> bool {
        self.panel.date() == self.services.today
    }

    fn teardown(&mut self) {
        self.services.charts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::document::Document;
    use crate::application::testing::{history_response, last_alert, services, Call};
    use crate::infrastructure::layout;

    fn context() -> PageContext {
        PageContext::new(PageId::DeviceDetail).with("device_id", "d1")
    }

    #[tokio::test]
    async fn test_led_command_is_sent() {
        let (services, document, api) = services();
        layout::scaffold_device_detail(&document, "d1");
        api.set_history(history_response(&[(8, 19.5)]));
        let mut controller = DeviceDetailController::new(&context(), services).unwrap();
        controller.init().await;

        document.set_value("led-color-select", "#00ff00");
        document.set_value("led-brightness-input", "40");
        document.set_value("led-duration-input", "1500");
        controller.handle(UiEvent::click("control-led-button")).await;

        let sent = api.calls().into_iter().find_map(|c| match c {
            Call::ControlLed(cmd) => Some(cmd),
            _ => None,
        });
        let sent = sent.unwrap();
        assert_eq!((sent.red, sent.green, sent.blue), (0, 255, 0));
        assert_eq!(sent.brightness, 40);
        assert_eq!(sent.duration_ms, 1500);
        assert_eq!(
            last_alert(&document, ALERT_BOX),
            Some(("success".to_string(), "LED control command sent successfully.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_invalid_color_is_not_sent() {
        let (services, document, api) = services();
        layout::scaffold_device_detail(&document, "d1");
        let mut controller = DeviceDetailController::new(&context(), services).unwrap();

        document.set_value("led-color-select", "purple");
        controller.handle(UiEvent::click("control-led-button")).await;

        assert!(api.calls().is_empty());
        assert_eq!(
            last_alert(&document, ALERT_BOX),
            Some(("danger".to_string(), "Invalid color selected.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_history_panel_events_are_forwarded() {
        let (services, document, api) = services();
        layout::scaffold_device_detail(&document, "d1");
        api.set_history(history_response(&[(8, 19.5)]));
        let mut controller = DeviceDetailController::new(&context(), services.clone()).unwrap();
        controller.init().await;
        controller.handle(UiEvent::click("period-btn-d1-1y")).await;

        assert_eq!(api.calls().len(), 2);
        assert!(document.has_class("period-btn-d1-1y", "active"));
        assert!(controller.live_feed());
    }
}
