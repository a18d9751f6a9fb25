// REST client - reqwest implementation of the dashboard API port
use crate::application::api::{ApiError, ApiResult, DashboardApi};
use crate::domain::device::{LedCommand, NewDevice, ScannedDevice};
use crate::domain::history::{AnalysisPoint, HistoryPoint, HistoryResponse, Period};
use crate::domain::plant::{ImageUpload, LibraryPlant, LookupRequest, ManagedPlant};
use crate::domain::watering::{DeviceProfileCommand, WateringProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Multipart field the upload endpoint reads the image from.
pub const IMAGE_UPLOAD_FIELD: &str = "plant-image-upload";

/// HTTP basic auth credentials; the backend requires them on every route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        username.map(|username| Self { username, password })
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, self.password.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

/// `{success, message?, ...payload}` body of a mutation route.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Debug, Deserialize)]
struct UploadPayload {
    url: String,
}

#[derive(Debug, Deserialize)]
struct LookupPayload {
    data: LibraryPlant,
}

#[derive(Debug, Deserialize)]
struct ScanPayload {
    #[serde(default)]
    devices: Vec<ScannedDevice>,
}

#[derive(Debug, Deserialize)]
struct MessageOnly {
    #[serde(default)]
    message: Option<String>,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, credentials)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.credentials {
            Some(credentials) => credentials.apply(request),
            None => request,
        }
    }

    /// Sends the request; any non-2xx status becomes `ApiError::Status`
    /// carrying the body's `message` when it has one.
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<MessageOnly>(&body)
            .ok()
            .and_then(|m| m.message);
        tracing::warn!("Backend responded with {}: {:?}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.fetch(self.request(Method::GET, path)).await
    }

    async fn history<T: DeserializeOwned>(
        &self,
        path: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<T>> {
        let request = self.request(Method::GET, path).query(&[
            ("period", period.as_str().to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ]);
        self.fetch(request).await
    }

    async fn mutate<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_envelope(&body)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let _: Empty = self.mutate(self.request(Method::POST, path).json(body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let _: Empty = self.mutate(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Splits a mutation body into payload or `Rejected`. A body without a
/// `success` flag counts as rejected.
fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected(envelope.message));
    }
    serde_json::from_value(serde_json::Value::Object(envelope.payload))
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn device_history(
        &self,
        device_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<HistoryPoint>> {
        self.history(&format!("/api/history/{}", segment(device_id)), period, date)
            .await
    }

    async fn plant_analysis_history(
        &self,
        managed_plant_id: &str,
        period: Period,
        date: NaiveDate,
    ) -> ApiResult<HistoryResponse<AnalysisPoint>> {
        self.history(
            &format!("/api/plant-analysis-history/{}", segment(managed_plant_id)),
            period,
            date,
        )
        .await
    }

    async fn list_plants(&self) -> ApiResult<Vec<LibraryPlant>> {
        self.get("/api/plants").await
    }

    async fn save_plant(&self, plant: &LibraryPlant) -> ApiResult<()> {
        self.post_json("/api/plants", plant).await
    }

    async fn delete_plant(&self, plant_id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/plants/{}", segment(plant_id))).await
    }

    async fn upload_image(&self, image: ImageUpload) -> ApiResult<String> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(IMAGE_UPLOAD_FIELD, part);
        let payload: UploadPayload = self
            .mutate(self.request(Method::POST, "/api/plants/upload-image").multipart(form))
            .await?;
        Ok(payload.url)
    }

    async fn lookup_plant(&self, request: &LookupRequest) -> ApiResult<LibraryPlant> {
        let payload: LookupPayload = self
            .mutate(self.request(Method::POST, "/api/plants/lookup").json(request))
            .await?;
        Ok(payload.data)
    }

    async fn list_managed_plants(&self) -> ApiResult<Vec<ManagedPlant>> {
        self.get("/api/managed-plants").await
    }

    async fn save_managed_plant(&self, plant: &ManagedPlant) -> ApiResult<()> {
        self.post_json("/api/managed-plants", plant).await
    }

    async fn delete_managed_plant(&self, managed_plant_id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/managed-plants/{}", segment(managed_plant_id)))
            .await
    }

    async fn managed_watering_profile(&self, managed_plant_id: &str) -> ApiResult<WateringProfile> {
        self.get(&format!(
            "/api/managed-plant-watering-profile/{}",
            segment(managed_plant_id)
        ))
        .await
    }

    async fn save_managed_watering_profile(
        &self,
        managed_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()> {
        self.post_json(
            &format!("/api/managed-plant-watering-profile/{}", segment(managed_plant_id)),
            profile,
        )
        .await
    }

    async fn library_watering_profile(&self, library_plant_id: &str) -> ApiResult<WateringProfile> {
        self.get(&format!("/api/plant-watering-profile/{}", segment(library_plant_id)))
            .await
    }

    async fn save_library_watering_profile(
        &self,
        library_plant_id: &str,
        profile: &WateringProfile,
    ) -> ApiResult<()> {
        self.post_json(
            &format!("/api/plant-watering-profile/{}", segment(library_plant_id)),
            profile,
        )
        .await
    }

    async fn write_device_profile(&self, device_id: &str, command: &DeviceProfileCommand) -> ApiResult<()> {
        self.post_json(
            &format!("/api/device/{}/write-watering-profile", segment(device_id)),
            command,
        )
        .await
    }

    async fn control_led(&self, command: &LedCommand) -> ApiResult<()> {
        self.post_json("/api/control-led", command).await
    }

    async fn ble_scan(&self) -> ApiResult<Vec<ScannedDevice>> {
        let payload: ScanPayload = self
            .mutate(self.request(Method::POST, "/api/ble-scan"))
            .await?;
        Ok(payload.devices)
    }

    async fn add_device(&self, device: &NewDevice) -> ApiResult<()> {
        self.post_json("/api/add-device", device).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_with_payload() {
        let payload: UploadPayload =
            decode_envelope(br#"{"success": true, "url": "/static/uploads/a.png"}"#).unwrap();
        assert_eq!(payload.url, "/static/uploads/a.png");
    }

    #[test]
    fn test_envelope_rejection_carries_message() {
        let result: ApiResult<Empty> =
            decode_envelope(br#"{"success": false, "message": "Device name is required."}"#);
        assert_eq!(
            result.unwrap_err(),
            ApiError::Rejected(Some("Device name is required.".to_string()))
        );
    }

    #[test]
    fn test_envelope_without_flag_is_rejected() {
        let result: ApiResult<Empty> = decode_envelope(br#"{"message": "ok?"}"#);
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[test]
    fn test_envelope_decode_errors() {
        let result: ApiResult<Empty> = decode_envelope(b"<html>");
        assert!(matches!(result, Err(ApiError::Decode(_))));

        let result: ApiResult<UploadPayload> = decode_envelope(br#"{"success": true}"#);
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_scan_payload() {
        let payload: ScanPayload = decode_envelope(
            br#"{"success": true, "devices": [{"name": "W1", "address": "AA:BB", "type": "plant_sensor", "rssi": -60}]}"#,
        )
        .unwrap();
        assert_eq!(payload.devices.len(), 1);
        assert_eq!(payload.devices[0].device_type, "plant_sensor");
    }

    #[test]
    fn test_url_joining() {
        let api = HttpDashboardApi::new("http://localhost:5000/", None);
        assert_eq!(api.url("/api/plants"), "http://localhost:5000/api/plants");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_credentials_need_username() {
        assert_eq!(Credentials::from_parts(None, Some("pw".to_string())), None);
        assert!(Credentials::from_parts(Some("admin".to_string()), None).is_some());
    }
}
