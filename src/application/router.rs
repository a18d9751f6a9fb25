// Page router - maps the server-supplied page id to its controller
use crate::application::alert::AlertBanner;
use crate::application::api::DashboardApi;
use crate::application::cards::CardUpdater;
use crate::application::chart_view::{ChartRegistry, ChartView};
use crate::application::controllers::{
    dashboard::DashboardController, device_detail::DeviceDetailController,
    device_management::DeviceManagementController, device_threshold::DeviceThresholdController,
    managed_plants::ManagedPlantsController, plant_detail::PlantDetailController,
    plant_library::PlantLibraryController, watering_profiles::WateringProfilesController,
};
use crate::domain::history::Period;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Dashboard,
    DeviceDetail,
    Devices,
    Plants,
    Management,
    WateringProfiles,
    DeviceThreshold,
    PlantDetail,
}

impl PageId {
    pub const ALL: [PageId; 8] = [
        PageId::Dashboard,
        PageId::DeviceDetail,
        PageId::Devices,
        PageId::Plants,
        PageId::Management,
        PageId::WateringProfiles,
        PageId::DeviceThreshold,
        PageId::PlantDetail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Dashboard => "dashboard",
            PageId::DeviceDetail => "device-detail",
            PageId::Devices => "devices",
            PageId::Plants => "plants",
            PageId::Management => "management",
            PageId::WateringProfiles => "watering-profiles",
            PageId::DeviceThreshold => "device-threshold",
            PageId::PlantDetail => "plant-detail",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RouteError::UnknownPage(s.to_string()))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown page '{0}'")]
    UnknownPage(String),
    #[error("no controller registered for page '{0}'")]
    Unregistered(PageId),
    #[error("page '{page}' is missing data attribute '{key}'")]
    MissingData { page: PageId, key: String },
    #[error("invalid value '{value}' for data attribute '{key}'")]
    InvalidData { key: String, value: String },
}

/// Page identifier plus the data attributes the server rendered with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page: PageId,
    pub data: HashMap<String, String>,
}

impl PageContext {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            data: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    /// A non-blank attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, RouteError> {
        self.get(key).ok_or_else(|| RouteError::MissingData {
            page: self.page,
            key: key.to_string(),
        })
    }

    /// Boolean attribute as the templates render it (`True`/`true`/`1`).
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("True" | "true" | "1"))
    }

    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>, RouteError> {
        self.get(key)
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RouteError::InvalidData {
                    key: key.to_string(),
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}

/// Collaborators every controller is built from.
#[derive(Clone)]
pub struct Services {
    pub document: Arc<dyn crate::application::document::Document>,
    pub api: Arc<dyn DashboardApi>,
    pub charts: Arc<ChartRegistry>,
    pub alerts: Arc<AlertBanner>,
    /// Local calendar date; views of this date are "live".
    pub today: NaiveDate,
}

impl Services {
    pub fn chart_view(&self) -> ChartView {
        ChartView::new(self.document.clone(), self.charts.clone())
    }

    pub fn cards(&self) -> CardUpdater {
        CardUpdater::new(self.document.clone())
    }
}

/// A user interaction, addressed by element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click { id: String },
    /// `change` on a date input.
    DateChanged { id: String, value: String },
    /// `change` on a checkbox or radio.
    Toggle { id: String, checked: bool },
    /// `input`/`change` on a text, number or range input.
    Input { id: String, value: String },
}

impl UiEvent {
    pub fn click(id: &str) -> Self {
        UiEvent::Click { id: id.to_string() }
    }

    pub fn input(id: &str, value: &str) -> Self {
        UiEvent::Input {
            id: id.to_string(),
            value: value.to_string(),
        }
    }

    pub fn toggle(id: &str, checked: bool) -> Self {
        UiEvent::Toggle {
            id: id.to_string(),
            checked,
        }
    }

    pub fn date(id: &str, value: &str) -> Self {
        UiEvent::DateChanged {
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    /// Full navigation to another URL.
    Navigate(String),
    /// Reload the current page after a delay.
    Reload { after: Duration },
}

pub const RELOAD_DELAY: Duration = Duration::from_secs(2);

#[async_trait]
pub trait PageController: Send {
    fn page(&self) -> PageId;

    /// Initial data load and control setup.
    async fn init(&mut self);

    async fn handle(&mut self, event: UiEvent) -> Outcome;

    /// Whether this view shows live data and wants the push feed.
    fn live_feed(&self) -> bool {
        false
    }

    /// Navigation away.
    fn teardown(&mut self) {}
}

type Factory = Box<dyn Fn(&PageContext, Services) -> Result<Box<dyn PageController>, RouteError> + Send + Sync>;

#[derive(Default)]
pub struct PageRouter {
    factories: HashMap<PageId, Factory>,
}

impl PageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, page: PageId, factory: F) -> &mut Self
    where
        F: Fn(&PageContext, Services) -> Result<Box<dyn PageController>, RouteError> + Send + Sync + 'static,
    {
        self.factories.insert(page, Box::new(factory));
        self
    }

    pub fn with_default_pages() -> Self {
        let mut router = Self::new();
        router
            .register(PageId::Dashboard, |ctx, services| {
                Ok(Box::new(DashboardController::new(ctx, services)?))
            })
            .register(PageId::DeviceDetail, |ctx, services| {
                Ok(Box::new(DeviceDetailController::new(ctx, services)?))
            })
            .register(PageId::Devices, |_, services| {
                Ok(Box::new(DeviceManagementController::new(services)))
            })
            .register(PageId::Plants, |_, services| {
                Ok(Box::new(PlantLibraryController::new(services)))
            })
            .register(PageId::Management, |_, services| {
                Ok(Box::new(ManagedPlantsController::new(services)))
            })
            .register(PageId::WateringProfiles, |_, services| {
                Ok(Box::new(WateringProfilesController::new(services)))
            })
            .register(PageId::DeviceThreshold, |ctx, services| {
                Ok(Box::new(DeviceThresholdController::new(ctx, services)?))
            })
            .register(PageId::PlantDetail, |ctx, services| {
                Ok(Box::new(PlantDetailController::new(ctx, services)?))
            });
        router
    }

    /// Builds the controller for `context.page` and runs its initial load.
    pub async fn boot(
        &self,
        context: &PageContext,
        services: Services,
    ) -> Result<Box<dyn PageController>, RouteError> {
        let factory = self
            .factories
            .get(&context.page)
            .ok_or(RouteError::Unregistered(context.page))?;
        let mut controller = factory(context, services)?;
        tracing::info!("Initializing page '{}'", context.page);
        controller.init().await;
        Ok(controller)
    }
}

/// Parses the period suffix of a period button id (`<prefix>7d`).
pub fn period_from_id(prefix: &str, id: &str) -> Option<Period> {
    id.strip_prefix(prefix)?.parse().ok()
}
