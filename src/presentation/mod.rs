// Presentation layer - status server exposing the headless dashboard
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{chart_config, health_check, list_elements};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn status_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/elements", get(list_elements))
        .route("/charts/:canvas_id", get(chart_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
