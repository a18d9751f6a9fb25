use crate::application::feed::ReconnectPolicy;
use crate::application::router::{PageContext, PageId};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub status: StatusSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageSettings {
    #[serde(default = "default_page")]
    pub id: String,
    /// Data attributes the server renders on the page container.
    #[serde(default)]
    pub data: HashMap<String, String>,
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub plants: Vec<String>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            id: default_page(),
            data: HashMap::new(),
            devices: Vec::new(),
            plants: Vec::new(),
        }
    }
}

fn default_page() -> String {
    PageId::Dashboard.as_str().to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    pub max_attempts: Option<u32>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_attempts: None,
        }
    }
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

fn default_dismiss_after_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8090".to_string()
}

impl DashboardConfig {
    pub fn page_context(&self) -> anyhow::Result<PageContext> {
        let page: PageId = self.page.id.parse()?;
        Ok(self
            .page
            .data
            .iter()
            .fold(PageContext::new(page), |ctx, (key, value)| ctx.with(key, value)))
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_backoff: Duration::from_millis(self.feed.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.feed.max_backoff_ms),
            max_attempts: self.feed.max_attempts,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.alerts.dismiss_after_ms)
    }
}

/// `config/dashboard.toml` (optional) overridden by `PLANT_DASHBOARD__*`
/// environment variables, e.g. `PLANT_DASHBOARD__BACKEND__BASE_URL`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("PLANT_DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("page.devices")
                .with_list_parse_key("page.plants")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
