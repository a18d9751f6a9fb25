// HTTP request handlers
use crate::application::charts::config::ChartConfig;
use crate::infrastructure::memory_document::Element;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ElementsResponse {
    pub page: String,
    pub elements: Vec<Element>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Mirror of the document, in element order
pub async fn list_elements(State(state): State<Arc<AppState>>) -> Json<ElementsResponse> {
    Json(ElementsResponse {
        page: state.page.to_string(),
        elements: state.document.elements(),
    })
}

/// Live configuration of the chart on `canvas_id`
pub async fn chart_config(
    Path(canvas_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartConfig>, StatusCode> {
    match state.charts.snapshot(&canvas_id) {
        Some(config) => Ok(Json(config)),
        None => {
            tracing::debug!("No live chart on {}", canvas_id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_view::ChartRegistry;
    use crate::application::router::PageId;
    use crate::infrastructure::layout;
    use crate::infrastructure::memory_document::MemoryDocument;
    use crate::infrastructure::recording_charts::RecordingRenderer;

    fn state() -> Arc<AppState> {
        let document = Arc::new(MemoryDocument::new());
        layout::scaffold_device_card(&document, "d1");
        Arc::new(AppState {
            page: PageId::Dashboard,
            document,
            charts: Arc::new(ChartRegistry::new(Arc::new(RecordingRenderer::new()))),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_elements_mirror_document() {
        let Json(response) = list_elements(State(state())).await;
        assert_eq!(response.page, "dashboard");
        assert!(response.elements.iter().any(|e| e.id == "temp-d1" && e.text == "--"));
    }

    #[tokio::test]
    async fn test_missing_chart_is_not_found() {
        let result = chart_config(Path("history-chart-d1".to_string()), State(state())).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }
}
