// Test doubles shared by the controller tests
use crate::application::alert::{AlertBanner, DEFAULT_DISMISS_AFTER};
use crate::application::api::{ApiError, ApiResult, DashboardApi};
use crate::application::chart_view::ChartRegistry;
use crate::application::router::Services;
use crate::domain::device::{LedCommand, NewDevice, ScannedDevice};
use crate::domain::history::{AnalysisPoint, HistoryPoint, HistoryResponse, Period};
use crate::domain::plant::{ImageUpload, LibraryPlant, LookupRequest, ManagedPlant};
use crate::domain::watering::{DeviceProfileCommand, WateringProfile};
use crate::infrastructure::memory_document::MemoryDocument;
use crate::infrastructure::recording_charts::RecordingRenderer;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DeviceHistory(String, Period, NaiveDate),
    AnalysisHistory(String, Period, NaiveDate),
    ListPlants,
    SavePlant(LibraryPlant),
    DeletePlant(String),
    UploadImage(String),
    LookupPlant(LookupRequest),
    ListManagedPlants,
    SaveManagedPlant(ManagedPlant),
    DeleteManagedPlant(String),
    ManagedProfile(String),
    SaveManagedProfile(String, WateringProfile),
    LibraryProfile(String),
    SaveLibraryProfile(String, WateringProfile),
    WriteDeviceProfile(String, DeviceProfileCommand),
    ControlLed(LedCommand),
    BleScan,
    AddDevice(NewDevice),
}

impl Call {
    fn operation(&self) -> &'static str {
        match self {
            Call::DeviceHistory(..) => "device_history",
            Call::AnalysisHistory(..) => "plant_analysis_history",
            Call::ListPlants => "list_plants",
            Call::SavePlant(_) => "save_plant",
            Call::DeletePlant(_) => "delete_plant",
            Call::UploadImage(_) => "upload_image",
            Call::LookupPlant(_) => "lookup_plant",
            Call::ListManagedPlants => "list_managed_plants",
            Call::SaveManagedPlant(_) => "save_managed_plant",
            Call::DeleteManagedPlant(_) => "delete_managed_plant",
            Call::ManagedProfile(_) => "managed_watering_profile",
            Call::SaveManagedProfile(..) => "save_managed_watering_profile",
            Call::LibraryProfile(_) => "library_watering_profile",
            Call::SaveLibraryProfile(..) => "save_library_watering_profile",
            Call::WriteDeviceProfile(..) => "write_device_profile",
            Call::ControlLed(_) => "control_led",
            Call::BleScan => "ble_scan",
            Call::AddDevice(_) => "add_device",
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    history: Option<HistoryResponse<HistoryPoint>>,
    analysis: Option<HistoryResponse<AnalysisPoint>>,
    plants: Vec<LibraryPlant>,
    managed: Vec<ManagedPlant>,
    profile: WateringProfile,
    lookup: LibraryPlant,
    upload_url: String,
    scan: Vec<ScannedDevice>,
    /// Keyed by operation name; `*` fails every call.
    failures: HashMap<&'static str, ApiError>,
}

/// Records every call and answers from canned responses.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        let mut state = self.state();
        let operation = call.operation();
        state.calls.push(call);
        match state.failures.get(operation).or_else(|| state.failures.get("*")) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn set_history(&self, response: HistoryResponse<HistoryPoint>) {
        self.state().history = Some(response);
    }

    pub fn set_analysis(&self, response: HistoryResponse<AnalysisPoint>) {
        self.state().analysis = Some(response);
    }

    pub fn set_plants(&self, plants: Vec<LibraryPlant>) {
        self.state().plants = plants;
    }

    pub fn set_managed(&self, plants: Vec<ManagedPlant>) {
        self.state().managed = plants;
    }

    pub fn set_profile(&self, profile: WateringProfile) {
        self.state().profile = profile;
    }

    pub fn set_lookup(&self, plant: LibraryPlant) {
        self.state().lookup = plant;
    }

    pub fn set_upload_url(&self, url: &str) {
        self.state().upload_url = url.to_string();
    }

    pub fn set_scan(&self, devices: Vec<ScannedDevice>) {
        self.state().scan = devices;
    }

    pub fn fail_with(&self, error: ApiError) {
        self.state().failures.insert("*", error);
    }

    pub fn fail_call(&self, operation: &'static str, error: ApiError) {
        self.state().failures.insert(operation, error);
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn device_history(
        &self,
        device_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<HistoryPoint>> {
        self.record(Call::DeviceHistory(device_id.to_string(), period, date))?;
        Ok(self
            .state()
            .history
            .clone()
            .unwrap_or_else(|| HistoryResponse::new(Vec::new(), None)))
    }

    async fn plant_analysis_history(
        &self,
        managed_plant_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<AnalysisPoint>> {
        self.record(Call::AnalysisHistory(managed_plant_id.to_string(), period, date))?;
        Ok(self
            .state()
            .analysis
            .clone()
            .unwrap_or_else(|| HistoryResponse::new(Vec::new(), None)))
    }

    async fn list_plants(&self) -> ApiResult<Vec<LibraryPlant>> {
        self.record(Call::ListPlants)?;
        Ok(self.state().plants.clone())
    }

    async fn save_plant(&self, plant: &LibraryPlant) -> ApiResult<()> {
        self.record(Call::SavePlant(plant.clone()))
    }

    async fn delete_plant(&self, plant_id: &str) -> ApiResult<()> {
        self.record(Call::DeletePlant(plant_id.to_string()))
    }

    async fn upload_image(&self, image: ImageUpload) -> ApiResult<String> {
        self.record(Call::UploadImage(image.file_name))?;
        Ok(self.state().upload_url.clone())
    }

    async fn lookup_plant(&self, request: &LookupRequest) -> ApiResult<LibraryPlant> {
        self.record(Call::LookupPlant(request.clone()))?;
        Ok(self.state().lookup.clone())
    }

    async fn list_managed_plants(&self) -> ApiResult<Vec<ManagedPlant>> {
        self.record(Call::ListManagedPlants)?;
        Ok(self.state().managed.clone())
    }

    async fn save_managed_plant(&self, plant: &ManagedPlant) -> ApiResult<()> {
        self.record(Call::SaveManagedPlant(plant.clone()))
    }

    async fn delete_managed_plant(&self, managed_plant_id: &str) -> ApiResult<()> {
        self.record(Call::DeleteManagedPlant(managed_plant_id.to_string()))
    }

    async fn managed_watering_profile(&self, managed_plant_id: &str) -> ApiResult<WateringProfile> {
        self.record(Call::ManagedProfile(managed_plant_id.to_string()))?;
        Ok(self.state().profile.clone())
    }

    async fn save_managed_watering_profile(
        &self,
        managed_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()> {
        self.record(Call::SaveManagedProfile(managed_plant_id.to_string(), profile.clone()))
    }

    async fn library_watering_profile(&self, library_plant_id: &str) -> ApiResult<WateringProfile> {
        self.record(Call::LibraryProfile(library_plant_id.to_string()))?;
        Ok(self.state().profile.clone())
    }

    async fn save_library_watering_profile(
        &self,
        library_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()> {
        self.record(Call::SaveLibraryProfile(library_plant_id.to_string(), profile.clone()))
    }

    async fn write_device_profile(&self, device_id: &str, command: &DeviceProfileCommand) -> ApiResult<()> {
        self.record(Call::WriteDeviceProfile(device_id.to_string(), *command))
    }

    async fn control_led(&self, command: &LedCommand) -> ApiResult<()> {
        self.record(Call::ControlLed(command.clone()))
    }

    async fn ble_scan(&self) -> ApiResult<Vec<ScannedDevice>> {
        self.record(Call::BleScan)?;
        Ok(self.state().scan.clone())
    }

    async fn add_device(&self, device: &NewDevice) -> ApiResult<()> {
        self.record(Call::AddDevice(device.clone()))
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

/// Services over an empty in-memory page, a fake API and a recording
/// chart renderer.
pub fn services() -> (Services, Arc<MemoryDocument>, Arc<FakeApi>) {
    let document = Arc::new(MemoryDocument::new());
    let api = Arc::new(FakeApi::default());
    let renderer = Arc::new(RecordingRenderer::new());
    let services = Services {
        document: document.clone(),
        api: api.clone(),
        charts: Arc::new(ChartRegistry::new(renderer)),
        alerts: Arc::new(AlertBanner::new(document.clone(), DEFAULT_DISMISS_AFTER)),
        today: today(),
    };
    (services, document, api)
}

/// Hourly temperature samples on 2025-06-01.
pub fn history_response(samples: &[(u32, f64)]) -> HistoryResponse<HistoryPoint> {
    let history = samples
        .iter()
        .filter_map(|(hour, temperature)| {
            Some(HistoryPoint {
                timestamp: today().and_hms_opt(*hour, 0, 0)?,
                values: HashMap::from([("temperature".to_string(), serde_json::json!(temperature))]),
            })
        })
        .collect();
    HistoryResponse::new(history, None)
}

/// Soil moisture samples for the watering charts.
pub fn soil_response(values: &[f64]) -> HistoryResponse<HistoryPoint> {
    let history = values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            Some(HistoryPoint {
                timestamp: today().and_hms_opt(i as u32 % 24, 0, 0)?,
                values: HashMap::from([("soil_moisture".to_string(), serde_json::json!(value))]),
            })
        })
        .collect();
    HistoryResponse::new(history, None)
}

/// The last alert shown in `container`, as (kind class, text).
pub fn last_alert(document: &MemoryDocument, container: &str) -> Option<(String, String)> {
    use crate::application::document::Document;
    let node = document.children(container).pop()?;
    let kind = node
        .classes
        .iter()
        .find(|c| c.starts_with("alert-") && *c != "alert-dismissible")?
        .trim_start_matches("alert-")
        .to_string();
    Some((kind, node.text))
}
