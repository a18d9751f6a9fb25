// Page controllers and the widgets several pages share
pub mod dashboard;
pub mod device_detail;
pub mod device_management;
pub mod device_threshold;
pub mod managed_plants;
pub mod plant_detail;
pub mod plant_library;
pub mod watering_profiles;

use crate::application::alert::AlertKind;
use crate::application::api::{ApiError, ApiResult};
use crate::application::busy::BusyButton;
use crate::application::chart_view::{
    ChartTarget, Plot, RenderOutcome, ANALYSIS_PLACEHOLDERS, HISTORY_PLACEHOLDERS, SOIL_PLACEHOLDERS,
};
use crate::application::charts::analysis::plant_analysis_chart;
use crate::application::charts::config::{AxisId, TEMPERATURE_FIT_LABELS};
use crate::application::charts::history::sensor_history_chart;
use crate::application::charts::soil::soil_threshold_chart;
use crate::application::document::{activate_exclusive, set_shown, Document};
use crate::application::router::{period_from_id, Services, UiEvent};
use crate::domain::device::LedCommand;
use crate::domain::history::Period;
use crate::domain::watering::{parse_optional_days, parse_optional_f64, WateringProfile};
use chrono::NaiveDate;
use std::future::Future;

/// Shows `error` as a danger alert: the server's message when it sent
/// one, otherwise `fallback`.
pub(crate) fn alert_failure(services: &Services, container: &str, prefix: &str, error: &ApiError, fallback: &str) {
    tracing::error!("{}{}", prefix, error);
    services.alerts.show(
        AlertKind::Danger,
        &format!("{}{}", prefix, error.user_message(fallback)),
        container,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// Raw sensor history of one device.
    Sensor,
    /// Daily aggregates of one managed plant.
    Analysis,
}

/// A history chart with its period buttons, date picker, Fit button and
/// manual temperature range inputs.
#[derive(Debug, Clone)]
pub struct HistoryPanel {
    kind: PanelKind,
    entity_id: String,
    target: ChartTarget,
    period: Period,
    date: NaiveDate,
    fitted: bool,
}

impl HistoryPanel {
    pub fn sensor(device_id: &str, date: NaiveDate) -> Self {
        Self {
            kind: PanelKind::Sensor,
            entity_id: device_id.to_string(),
            target: ChartTarget::sensor(device_id),
            period: Period::Day,
            date,
            fitted: false,
        }
    }

    pub fn analysis(managed_plant_id: &str, date: NaiveDate) -> Self {
        Self {
            kind: PanelKind::Analysis,
            entity_id: managed_plant_id.to_string(),
            target: ChartTarget::analysis(managed_plant_id),
            period: Period::Week,
            date,
            fitted: false,
        }
    }

    pub fn target(&self) -> &ChartTarget {
        &self.target
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn id_stem(&self) -> &'static str {
        match self.kind {
            PanelKind::Sensor => "sensor",
            PanelKind::Analysis => "analysis",
        }
    }

    fn period_prefix(&self) -> String {
        match self.kind {
            PanelKind::Sensor => format!("period-btn-{}-", self.entity_id),
            PanelKind::Analysis => format!("analysis-period-btn-{}-", self.entity_id),
        }
    }

    pub fn period_button_id(&self, period: Period) -> String {
        format!("{}{}", self.period_prefix(), period)
    }

    pub fn period_button_ids(&self) -> Vec<String> {
        Period::ALL.iter().map(|p| self.period_button_id(*p)).collect()
    }

    pub fn date_picker_id(&self) -> String {
        format!("{}-date-picker-{}", self.id_stem(), self.entity_id)
    }

    pub fn fit_button_id(&self) -> String {
        format!("{}-temp-fit-{}", self.id_stem(), self.entity_id)
    }

    pub fn range_min_id(&self) -> String {
        format!("{}-temp-min-{}", self.id_stem(), self.entity_id)
    }

    pub fn range_max_id(&self) -> String {
        format!("{}-temp-max-{}", self.id_stem(), self.entity_id)
    }

    /// Syncs the controls with the panel state and draws the first chart.
    pub async fn init(&mut self, services: &Services) -> RenderOutcome {
        let document = services.document.as_ref();
        document.set_value(&self.date_picker_id(), &self.date.to_string());
        activate_exclusive(document, &self.period_button_ids(), &self.period_button_id(self.period));
        self.refresh(services).await
    }

    /// Loads and draws the chart for the current period and date. Any Fit
    /// or manual range is dropped.
    pub async fn refresh(&mut self, services: &Services) -> RenderOutcome {
        self.reset_range(services.document.as_ref());
        let view = services.chart_view();
        let api = services.api.clone();
        let (id, period, date) = (self.entity_id.clone(), self.period, self.date);
        match self.kind {
            PanelKind::Sensor => {
                view.render(&self.target, HISTORY_PLACEHOLDERS, async move {
                    let response = api.device_history(&id, period, date).await?;
                    Ok(Plot::new(sensor_history_chart(&response, period))
                        .with_options(response.thresholds().is_some()))
                })
                .await
            }
            PanelKind::Analysis => {
                view.render(&self.target, ANALYSIS_PLACEHOLDERS, async move {
                    let response = api.plant_analysis_history(&id, period, date).await?;
                    Ok(Plot::new(plant_analysis_chart(&response)).with_options(response.thresholds().is_some()))
                })
                .await
            }
        }
    }

    /// Returns `false` when the event is addressed to another control.
    pub async fn handle(&mut self, services: &Services, event: &UiEvent) -> bool {
        match event {
            UiEvent::Click { id } => {
                if let Some(period) = period_from_id(&self.period_prefix(), id) {
                    activate_exclusive(services.document.as_ref(), &self.period_button_ids(), id);
                    self.period = period;
                    self.refresh(services).await;
                    return true;
                }
                if *id == self.fit_button_id() {
                    self.toggle_fit(services);
                    return true;
                }
                false
            }
            UiEvent::DateChanged { id, value } if *id == self.date_picker_id() => {
                match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                    Ok(date) => {
                        self.date = date;
                        self.refresh(services).await;
                    }
                    Err(_) => tracing::warn!("Ignoring invalid date '{}' on {}", value, id),
                }
                true
            }
            UiEvent::Input { id, .. } if *id == self.range_min_id() || *id == self.range_max_id() => {
                self.apply_manual_range(services);
                true
            }
            UiEvent::Toggle { id, checked } => {
                let Some(prefix) = &self.target.toggle_prefix else {
                    return false;
                };
                if !id.starts_with(prefix.as_str()) {
                    return false;
                }
                services.document.set_checked(id, *checked);
                if let Some(group) = services.document.attribute(id, "data-dataset-label") {
                    services
                        .chart_view()
                        .toggle_group(&self.target.canvas_id, &group, *checked);
                }
                true
            }
            _ => false,
        }
    }

    fn toggle_fit(&mut self, services: &Services) {
        let document = services.document.as_ref();
        if self.fitted {
            self.reset_range(document);
            self.set_range(services, None, None);
            return;
        }

        let fit = services
            .charts
            .with_chart(&self.target.canvas_id, |chart| {
                let (min, max) = chart.config().temperature_fit(&TEMPERATURE_FIT_LABELS)?;
                chart
                    .config_mut()
                    .set_axis_range(AxisId::Temperature, Some(min), Some(max));
                chart.redraw();
                Some((min, max))
            })
            .flatten();
        let Some((min, max)) = fit else {
            tracing::debug!("No temperature data to fit on {}", self.target.canvas_id);
            return;
        };

        document.set_value(&self.range_min_id(), &min.to_string());
        document.set_value(&self.range_max_id(), &max.to_string());
        let button = self.fit_button_id();
        document.add_class(&button, "active");
        document.remove_class(&button, "btn-outline-info");
        document.add_class(&button, "btn-info");
        self.fitted = true;
    }

    fn apply_manual_range(&mut self, services: &Services) {
        let document = services.document.as_ref();
        let read = |id: String| document.value(&id).and_then(|v| parse_optional_f64(&v));
        let (min, max) = (read(self.range_min_id()), read(self.range_max_id()));
        if min.is_none() && max.is_none() {
            self.reset_range(document);
        }
        self.set_range(services, min, max);
    }

    fn set_range(&self, services: &Services, min: Option<f64>, max: Option<f64>) {
        services.charts.with_chart(&self.target.canvas_id, |chart| {
            if chart.config_mut().set_axis_range(AxisId::Temperature, min, max) {
                chart.redraw();
            }
        });
    }

    fn reset_range(&mut self, document: &dyn Document) {
        self.fitted = false;
        let button = self.fit_button_id();
        if document.has_class(&button, "active") {
            document.remove_class(&button, "active");
            document.remove_class(&button, "btn-info");
            document.add_class(&button, "btn-outline-info");
        }
        for id in [self.range_min_id(), self.range_max_id()] {
            if document.value(&id).is_some_and(|v| !v.is_empty()) {
                document.set_value(&id, "");
            }
        }
    }
}

/// Colour/brightness/duration inputs and a send button for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedForm {
    device_id: String,
    color_id: String,
    brightness_id: String,
    duration_id: String,
    button_id: String,
    alert_box: &'static str,
    success: String,
}

pub const LED_IDLE_LABEL: &str = "Send Command";

impl LedForm {
    /// The single form of the device detail page.
    pub fn detail(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            color_id: "led-color-select".to_string(),
            brightness_id: "led-brightness-input".to_string(),
            duration_id: "led-duration-input".to_string(),
            button_id: "control-led-button".to_string(),
            alert_box: "device-detail-alert-box",
            success: "LED control command sent successfully.".to_string(),
        }
    }

    /// One row of the device list on the management page.
    pub fn row(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            color_id: format!("led-color-select-{}", device_id),
            brightness_id: format!("led-brightness-input-{}", device_id),
            duration_id: format!("led-duration-input-{}", device_id),
            button_id: format!("control-led-button-{}", device_id),
            alert_box: "profiles-alert-box",
            success: format!("LED command sent to {}!", device_id),
        }
    }

    pub fn color_id(&self) -> &str {
        &self.color_id
    }

    pub fn brightness_id(&self) -> &str {
        &self.brightness_id
    }

    pub fn duration_id(&self) -> &str {
        &self.duration_id
    }

    pub fn button_id(&self) -> &str {
        &self.button_id
    }

    pub fn alert_box(&self) -> &'static str {
        self.alert_box
    }

    /// Validates the inputs and sends the command. Invalid input is
    /// reported without any request. Returns whether the command went out
    /// and was accepted.
    pub async fn submit(&self, services: &Services) -> bool {
        let document = services.document.as_ref();
        let value = |id: &str| document.value(id).unwrap_or_default();
        let command = match LedCommand::from_form(
            &self.device_id,
            &value(&self.color_id),
            &value(&self.brightness_id),
            &value(&self.duration_id),
        ) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Rejected LED input for {}: {}", self.device_id, e);
                services.alerts.show(AlertKind::Danger, &e.to_string(), self.alert_box);
                return false;
            }
        };

        let _busy = BusyButton::engage(document, &self.button_id, "Sending...", LED_IDLE_LABEL);
        match services.api.control_led(&command).await {
            Ok(()) => {
                tracing::info!("LED command sent to {}", self.device_id);
                services.alerts.show(AlertKind::Success, &self.success, self.alert_box);
                true
            }
            Err(e) => {
                alert_failure(services, self.alert_box, "Error: ", &e, "Failed to send LED command.");
                false
            }
        }
    }
}

pub const IMAGE_PLACEHOLDER: &str = "https://placehold.co/600x300/eee/ccc?text=Plant+Image";

/// URL-or-upload choice of the plant editors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub url_radio: &'static str,
    pub upload_radio: &'static str,
    pub url_group: &'static str,
    pub upload_group: &'static str,
    pub url_input: &'static str,
    pub file_input: &'static str,
    pub preview: &'static str,
}

impl ImageSource {
    pub fn with_url_input(url_input: &'static str) -> Self {
        Self {
            url_radio: "image-source-url",
            upload_radio: "image-source-upload",
            url_group: "image-url-group",
            upload_group: "image-upload-group",
            url_input,
            file_input: "plant-image-upload",
            preview: "plant-image-preview",
        }
    }

    pub fn uses_upload(&self, document: &dyn Document) -> bool {
        document.is_checked(self.upload_radio)
    }

    /// Shows the input group of the chosen source.
    pub fn sync(&self, document: &dyn Document) {
        let upload = self.uses_upload(document);
        set_shown(document, self.url_group, !upload);
        set_shown(document, self.upload_group, upload);
    }

    /// Resets to the URL source showing `url` (or the placeholder).
    pub fn show(&self, document: &dyn Document, url: Option<&str>) {
        let url = url.filter(|u| !u.trim().is_empty());
        document.set_value(self.url_input, url.unwrap_or_default());
        document.set_attribute(self.preview, "src", url.unwrap_or(IMAGE_PLACEHOLDER));
        document.set_checked(self.url_radio, true);
        document.set_checked(self.upload_radio, false);
        self.sync(document);
    }

    /// Handles the source radios and live preview of a typed URL.
    pub fn handle(&self, document: &dyn Document, event: &UiEvent) -> bool {
        match event {
            UiEvent::Toggle { id, checked } if id == self.url_radio || id == self.upload_radio => {
                let other = if id == self.url_radio { self.upload_radio } else { self.url_radio };
                document.set_checked(id, *checked);
                document.set_checked(other, !*checked);
                self.sync(document);
                true
            }
            UiEvent::Input { id, value } if id == self.url_input => {
                let src = if value.trim().is_empty() { IMAGE_PLACEHOLDER } else { value.as_str() };
                document.set_attribute(self.preview, "src", src);
                true
            }
            _ => false,
        }
    }

    /// The image URL to save: the freshly uploaded file when the upload
    /// source is chosen and a file is picked, otherwise the URL input.
    pub async fn resolve(&self, services: &Services) -> ApiResult<Option<String>> {
        let document = services.document.as_ref();
        if self.uses_upload(document) {
            if let Some(file) = document.selected_file(self.file_input) {
                tracing::info!("Uploading image {}", file.file_name);
                let url = services.api.upload_image(file).await?;
                document.set_value(self.url_input, &url);
                return Ok(Some(url));
            }
        }
        Ok(document
            .value(self.url_input)
            .filter(|u| !u.trim().is_empty()))
    }
}

pub const DRY_THRESHOLD_INPUT: &str = "dry-threshold";
pub const WET_THRESHOLD_INPUT: &str = "wet-threshold";
pub const SOIL_CHART: &str = "soil-history-chart";
pub const WATERING_DAYS_INPUTS: [&str; 4] = [
    "watering-days-fast-growth",
    "watering-days-slow-growth",
    "watering-days-hot-dormancy",
    "watering-days-cold-dormancy",
];

/// Reads the cadence inputs into `profile`.
pub(crate) fn read_watering_days(document: &dyn Document, profile: &mut WateringProfile) {
    let [fast, slow, hot, cold] =
        WATERING_DAYS_INPUTS.map(|id| document.value(id).and_then(|v| parse_optional_days(&v)).filter(|d| *d > 0));
    profile.watering_days_fast_growth = fast;
    profile.watering_days_slow_growth = slow;
    profile.watering_days_hot_dormancy = hot;
    profile.watering_days_cold_dormancy = cold;
}

/// Fills the cadence inputs; unset days clear the input.
pub(crate) fn show_watering_days(document: &dyn Document, profile: &WateringProfile) {
    let days = [
        profile.watering_days_fast_growth,
        profile.watering_days_slow_growth,
        profile.watering_days_hot_dormancy,
        profile.watering_days_cold_dormancy,
    ];
    for (id, value) in WATERING_DAYS_INPUTS.into_iter().zip(days) {
        document.set_value(id, &value.map(|d| d.to_string()).unwrap_or_default());
    }
}

/// Draws 30 days of soil moisture from `sensor_id` with the Dry/Wet lines
/// of the profile `profile` resolves to. A profile that fails to load
/// draws the chart without lines; a plant without a sensor gets the empty
/// placeholder.
pub(crate) async fn render_soil_chart<P>(
    services: &Services,
    target: &ChartTarget,
    sensor_id: Option<String>,
    profile: P,
    alert_box: &str,
) -> RenderOutcome
where
    P: Future<Output = ApiResult<WateringProfile>> + Send,
{
    let api = services.api.clone();
    let today = services.today;
    let outcome = services
        .chart_view()
        .render(target, SOIL_PLACEHOLDERS, async move {
            let Some(sensor_id) = sensor_id else {
                return Ok(Plot::new(None));
            };
            let (history, profile) = futures::join!(api.device_history(&sensor_id, Period::Month, today), profile);
            let history = history?;
            let profile = profile.unwrap_or_else(|e| {
                tracing::warn!("Drawing soil chart without thresholds: {}", e);
                WateringProfile::default()
            });
            Ok(Plot::new(soil_threshold_chart(
                &history,
                profile.dry_threshold(),
                profile.wet_threshold(),
            )))
        })
        .await;
    if outcome == RenderOutcome::Failed {
        services
            .alerts
            .show(AlertKind::Danger, SOIL_PLACEHOLDERS.failed, alert_box);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charts::history::TEMPERATURE_LABEL;
    use crate::application::testing::{history_response, services, Call};
    use crate::infrastructure::layout;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_period_button_reloads_with_new_period() {
        let (services, document, api) = services();
        layout::scaffold_sensor_chart(&document, "d1");
        api.set_history(history_response(&[(10, 21.0), (11, 22.5)]));

        let mut panel = HistoryPanel::sensor("d1", day());
        assert_eq!(panel.init(&services).await, RenderOutcome::Drawn);
        assert!(document.has_class("period-btn-d1-24h", "active"));

        assert!(panel.handle(&services, &UiEvent::click("period-btn-d1-7d")).await);
        assert_eq!(panel.period(), Period::Week);
        assert!(document.has_class("period-btn-d1-7d", "active"));
        assert!(!document.has_class("period-btn-d1-24h", "active"));
        assert_eq!(
            api.calls().last(),
            Some(&Call::DeviceHistory("d1".to_string(), Period::Week, day()))
        );
    }

    #[tokio::test]
    async fn test_fit_toggles_axis_and_resets_on_date_change() {
        let (services, document, api) = services();
        layout::scaffold_sensor_chart(&document, "d1");
        api.set_history(history_response(&[(10, 21.2), (11, 24.6)]));

        let mut panel = HistoryPanel::sensor("d1", day());
        panel.init(&services).await;
        panel.handle(&services, &UiEvent::click("sensor-temp-fit-d1")).await;

        assert!(panel.is_fitted());
        assert_eq!(document.value("sensor-temp-min-d1").as_deref(), Some("16"));
        assert_eq!(document.value("sensor-temp-max-d1").as_deref(), Some("30"));
        assert!(document.has_class("sensor-temp-fit-d1", "btn-info"));
        let live = services.charts.snapshot("history-chart-d1").unwrap();
        let axis = live.axis(AxisId::Temperature).unwrap();
        assert_eq!((axis.min, axis.max), (Some(16.0), Some(30.0)));
        assert!(live.dataset(TEMPERATURE_LABEL).is_some());

        panel
            .handle(&services, &UiEvent::date("sensor-date-picker-d1", "2025-05-30"))
            .await;
        assert!(!panel.is_fitted());
        assert_eq!(panel.date(), NaiveDate::from_ymd_opt(2025, 5, 30).unwrap());
        assert_eq!(document.value("sensor-temp-min-d1").as_deref(), Some(""));
        assert!(document.has_class("sensor-temp-fit-d1", "btn-outline-info"));
    }

    #[tokio::test]
    async fn test_second_fit_press_restores_auto_scale() {
        let (services, document, api) = services();
        layout::scaffold_sensor_chart(&document, "d1");
        api.set_history(history_response(&[(10, 21.2)]));

        let mut panel = HistoryPanel::sensor("d1", day());
        panel.init(&services).await;
        panel.handle(&services, &UiEvent::click("sensor-temp-fit-d1")).await;
        panel.handle(&services, &UiEvent::click("sensor-temp-fit-d1")).await;

        assert!(!panel.is_fitted());
        let live = services.charts.snapshot("history-chart-d1").unwrap();
        let axis = live.axis(AxisId::Temperature).unwrap();
        assert_eq!((axis.min, axis.max), (None, None));
    }

    #[tokio::test]
    async fn test_manual_range_inputs() {
        let (services, document, api) = services();
        layout::scaffold_sensor_chart(&document, "d1");
        api.set_history(history_response(&[(10, 21.2)]));

        let mut panel = HistoryPanel::sensor("d1", day());
        panel.init(&services).await;
        document.set_value("sensor-temp-min-d1", "10");
        panel
            .handle(&services, &UiEvent::input("sensor-temp-min-d1", "10"))
            .await;
        let live = services.charts.snapshot("history-chart-d1").unwrap();
        let axis = live.axis(AxisId::Temperature).unwrap();
        assert_eq!((axis.min, axis.max), (Some(10.0), None));
    }

    #[tokio::test]
    async fn test_invalid_date_is_ignored() {
        let (services, document, api) = services();
        layout::scaffold_sensor_chart(&document, "d1");
        api.set_history(history_response(&[(10, 21.2)]));

        let mut panel = HistoryPanel::sensor("d1", day());
        panel.init(&services).await;
        let calls = api.calls().len();
        assert!(
            panel
                .handle(&services, &UiEvent::date("sensor-date-picker-d1", "31/05/2025"))
                .await
        );
        assert_eq!(panel.date(), day());
        assert_eq!(api.calls().len(), calls);
    }

    #[tokio::test]
    async fn test_led_form_rejects_before_sending() {
        let (services, document, api) = services();
        layout::scaffold_led_form(&document, &LedForm::detail("d1"));
        document.set_value("led-color-select", "#ff0000");
        document.set_value("led-brightness-input", "150");

        assert!(!LedForm::detail("d1").submit(&services).await);
        assert!(api.calls().is_empty());
        let alert = document.children("device-detail-alert-box");
        assert_eq!(alert[0].text, "Brightness must be between 0 and 100.");
    }

    #[tokio::test]
    async fn test_led_form_server_rejection_restores_button() {
        let (services, document, api) = services();
        let form = LedForm::row("d2");
        layout::scaffold_led_form(&document, &form);
        api.fail_with(ApiError::Rejected(Some("Device offline".to_string())));

        assert!(!form.submit(&services).await);
        assert!(!document.is_disabled("control-led-button-d2"));
        assert_eq!(document.text("control-led-button-d2").as_deref(), Some(LED_IDLE_LABEL));
        let alert = document.children("profiles-alert-box");
        assert_eq!(alert[0].text, "Error: Device offline");
    }

    #[tokio::test]
    async fn test_image_source_upload_replaces_url() {
        let (services, document, api) = services();
        let source = ImageSource::with_url_input("image-url");
        layout::scaffold_image_source(&document, &source);
        source.handle(document.as_ref(), &UiEvent::toggle("image-source-upload", true));
        assert!(document.has_class("image-url-group", "d-none"));

        document.attach_file(
            "plant-image-upload",
            crate::domain::plant::ImageUpload {
                file_name: "fern.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                bytes: vec![1, 2, 3],
            },
        );
        api.set_upload_url("/static/uploads/fern.jpg");
        let url = source.resolve(&services).await.unwrap();
        assert_eq!(url.as_deref(), Some("/static/uploads/fern.jpg"));
        assert_eq!(document.value("image-url").as_deref(), Some("/static/uploads/fern.jpg"));
    }
}
