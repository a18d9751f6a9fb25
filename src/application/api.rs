// Dashboard API port - REST operations the page controllers depend on
use crate::domain::device::{LedCommand, NewDevice, ScannedDevice};
use crate::domain::history::{AnalysisPoint, HistoryPoint, HistoryResponse, Period};
use crate::domain::plant::{ImageUpload, LibraryPlant, LookupRequest, ManagedPlant};
use crate::domain::watering::{DeviceProfileCommand, WateringProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Failure of one backend call. Non-2xx statuses and `success: false`
/// bodies are handled the same way by callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status: {status}")]
    Status { status: u16, message: Option<String> },
    #[error("{}", .0.as_deref().unwrap_or("request rejected by server"))]
    Rejected(Option<String>),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected(message) => message.as_deref(),
            _ => None,
        }
    }

    /// The server's message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/history/{id}?period=&date=`
    async fn device_history(
        &self,
        device_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<HistoryPoint>>;

    /// `GET /api/plant-analysis-history/{id}?period=&date=`
    async fn plant_analysis_history(
        &self,
        managed_plant_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<AnalysisPoint>>;

    async fn list_plants(&self) -> ApiResult<Vec<LibraryPlant>>;
    async fn save_plant(&self, plant: &LibraryPlant) -> ApiResult<()>;
    async fn delete_plant(&self, plant_id: &str) -> ApiResult<()>;
    /// Uploads an image and returns the URL the backend stored it under.
    async fn upload_image(&self, image: ImageUpload) -> ApiResult<String>;
    /// AI-assisted lookup of a library entry by genus/species/variety.
    async fn lookup_plant(&self, request: &LookupRequest) -> ApiResult<LibraryPlant>;

    async fn list_managed_plants(&self) -> ApiResult<Vec<ManagedPlant>>;
    async fn save_managed_plant(&self, plant: &ManagedPlant) -> ApiResult<()>;
    async fn delete_managed_plant(&self, managed_plant_id: &str) -> ApiResult<()>;

    async fn managed_watering_profile(&self, managed_plant_id: &str) -> ApiResult<WateringProfile>;
    async fn save_managed_watering_profile(
        &self,
        managed_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()>;
    async fn library_watering_profile(&self, library_plant_id: &str) -> ApiResult<WateringProfile>;
    async fn save_library_watering_profile(
        &self,
        library_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()>;

    /// Pushes thresholds to the physical sensor (separate from saving).
    async fn write_device_profile(&self, device_id: &str, command: &DeviceProfileCommand) -> ApiResult<()>;
    async fn control_led(&self, command: &LedCommand) -> ApiResult<()>;
    async fn ble_scan(&self) -> ApiResult<Vec<ScannedDevice>>;
    async fn add_device(&self, device: &NewDevice) -> ApiResult<()>;
}
