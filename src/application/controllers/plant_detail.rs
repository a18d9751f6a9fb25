// Plant detail page - daily analysis panel, sensor panels and the native climate chart
use crate::application::charts::climate::{monthly_climate_chart, parse_monthly_temps};
use crate::application::controllers::HistoryPanel;
use crate::application::document::CanvasMessage;
use crate::application::router::{Outcome, PageContext, PageController, PageId, RouteError, Services, UiEvent};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;

pub const SENSOR_CANVAS_PREFIX: &str = "history-chart-";
pub const CLIMATE_CHART: &str = "monthly-climate-chart";
pub const CLIMATE_ATTRIBUTE: &str = "data-monthly-temps";

pub struct PlantDetailController {
    services: Services,
    date: NaiveDate,
    analysis: HistoryPanel,
    sensors: Vec<HistoryPanel>,
    /// Raw climate data handed over by the server, if any.
    monthly_temps: Option<String>,
}

impl PlantDetailController {
    pub fn new(context: &PageContext, services: Services) -> Result<Self, RouteError> {
        let managed_plant_id = context.require("managed_plant_id")?;
        let date = context.date("selected_date")?.unwrap_or(services.today);
        let sensors = services
            .document
            .ids_with_prefix(SENSOR_CANVAS_PREFIX)
            .iter()
            .filter_map(|canvas| canvas.strip_prefix(SENSOR_CANVAS_PREFIX))
            .map(|device_id| HistoryPanel::sensor(device_id, date))
            .collect();
        let monthly_temps = context
            .get("monthly_temps")
            .map(str::to_string)
            .or_else(|| services.document.attribute(CLIMATE_CHART, CLIMATE_ATTRIBUTE));

        Ok(Self {
            analysis: HistoryPanel::analysis(managed_plant_id, date),
            services,
            date,
            sensors,
            monthly_temps,
        })
    }

    pub fn analysis(&self) -> &HistoryPanel {
        &self.analysis
    }

    pub fn sensors(&self) -> &[HistoryPanel] {
        &self.sensors
    }

    fn render_climate(&self) {
        let document = self.services.document.as_ref();
        if !document.exists(CLIMATE_CHART) {
            return;
        }
        let Some(raw) = self.monthly_temps.as_deref() else {
            tracing::debug!("No monthly climate data to render");
            return;
        };
        match parse_monthly_temps(raw) {
            Ok(Some(temps)) => {
                self.services
                    .charts
                    .replace(CLIMATE_CHART, || Some(monthly_climate_chart(&temps)));
            }
            Ok(None) => tracing::debug!("No monthly climate data to render"),
            Err(e) => {
                tracing::error!("Failed to parse monthly climate data: {}", e);
                self.services.charts.remove(CLIMATE_CHART);
                document.draw_canvas_message(CLIMATE_CHART, &CanvasMessage::failure("Could not load climate data."));
            }
        }
    }
}

#[async_trait]
impl PageController for PlantDetailController {
    fn page(&self) -> PageId {
        PageId::PlantDetail
    }

    async fn init(&mut self) {
        let services = &self.services;
        let (_, sensors) = futures::join!(
            self.analysis.init(services),
            join_all(self.sensors.iter_mut().map(|panel| panel.init(services)))
        );
        tracing::info!(
            "Plant detail loaded for {} with {} sensor charts",
            self.date,
            sensors.len()
        );
        self.render_climate();
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        if self.analysis.handle(&self.services, &event).await {
            return Outcome::Idle;
        }
        for panel in self.sensors.iter_mut() {
            if panel.handle(&self.services, &event).await {
                break;
            }
        }
        Outcome::Idle
    }

    fn teardown(&mut self) {
        self.services.charts.clear();
    }
}
