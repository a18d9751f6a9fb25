// Dashboard page - entity cards, one history panel per device, date navigation
use crate::application::controllers::HistoryPanel;
use crate::application::router::{Outcome, PageContext, PageController, PageId, RouteError, Services, UiEvent};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;

pub const DATE_PICKER: &str = "dashboard-date-picker";
pub const CANVAS_PREFIX: &str = "history-chart-";

pub struct DashboardController {
    services: Services,
    date: NaiveDate,
    is_today: bool,
    panels: Vec<HistoryPanel>,
}

impl DashboardController {
    pub fn new(context: &PageContext, services: Services) -> Result<Self, RouteError> {
        let date = context.date("selected_date")?.unwrap_or(services.today);
        let is_today = context.flag("is_today") || (context.get("is_today").is_none() && date == services.today);

        let panels = services
            .document
            .ids_with_prefix(CANVAS_PREFIX)
            .iter()
            .filter_map(|canvas| canvas.strip_prefix(CANVAS_PREFIX))
            .map(|device_id| HistoryPanel::sensor(device_id, date))
            .collect();

        Ok(Self {
            services,
            date,
            is_today,
            panels,
        })
    }

    pub fn panels(&self) -> &[HistoryPanel] {
        &self.panels
    }
}

#[async_trait]
impl PageController for DashboardController {
    fn page(&self) -> PageId {
        PageId::Dashboard
    }

    async fn init(&mut self) {
        self.services
            .document
            .set_value(DATE_PICKER, &self.date.to_string());
        let services = &self.services;
        let outcomes = join_all(self.panels.iter_mut().map(|panel| panel.init(services))).await;
        tracing::info!("Dashboard loaded {} history charts", outcomes.len());
    }

    async fn handle(&mut self, event: UiEvent) -> Outcome {
        if let UiEvent::DateChanged { id, value } = &event {
            if id == DATE_PICKER {
                return Outcome::Navigate(format!("/?date={}", value));
            }
        }
        for panel in self.panels.iter_mut() {
            if panel.handle(&self.services, &event).await {
                break;
            }
        }
        Outcome::Idle
    }

    fn live_feed(&self) -> bool {
        self.is_today
    }

    fn teardown(&mut self) {
        self.services.charts.clear();
    }
}
