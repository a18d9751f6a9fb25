// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use plant_dashboard::application::alert::AlertBanner;
use plant_dashboard::application::chart_view::ChartRegistry;
use plant_dashboard::application::feed::pump;
use plant_dashboard::application::router::{PageRouter, Services};
use plant_dashboard::infrastructure::config::load_dashboard_config;
use plant_dashboard::infrastructure::http_api::{Credentials, HttpDashboardApi};
use plant_dashboard::infrastructure::layout;
use plant_dashboard::infrastructure::memory_document::MemoryDocument;
use plant_dashboard::infrastructure::recording_charts::RecordingRenderer;
use plant_dashboard::infrastructure::sse::SseClient;
use plant_dashboard::presentation::app_state::AppState;
use plant_dashboard::presentation::status_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let context = config.page_context()?;
    let credentials = Credentials::from_parts(config.backend.username.clone(), config.backend.password.clone());

    // Document and charts (infrastructure layer)
    let document = Arc::new(MemoryDocument::new());
    layout::scaffold_page(&document, &context, &config.page.devices, &config.page.plants);
    let charts = Arc::new(ChartRegistry::new(Arc::new(RecordingRenderer::new())));

    let services = Services {
        document: document.clone(),
        api: Arc::new(HttpDashboardApi::new(&config.backend.base_url, credentials.clone())),
        charts: charts.clone(),
        alerts: Arc::new(AlertBanner::new(document.clone(), config.dismiss_after())),
        today: chrono::Local::now().date_naive(),
    };

    // Boot the page controller (application layer)
    let mut controller = PageRouter::with_default_pages()
        .boot(&context, services.clone())
        .await?;

    let feed = if controller.live_feed() {
        let client = SseClient::new(&config.backend.base_url, credentials, config.reconnect_policy());
        let cards = services.cards();
        Some(tokio::spawn(async move {
            pump(client.messages(), &cards).await;
        }))
    } else {
        tracing::info!("Historical view, live feed disabled");
        None
    };

    // Status server (presentation layer)
    let state = Arc::new(AppState {
        page: context.page,
        document,
        charts,
    });
    let listener = tokio::net::TcpListener::bind(&config.status.bind).await?;
    tracing::info!("Status server for page '{}' on {}", context.page, listener.local_addr()?);

    axum::serve(listener, status_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(feed) = feed {
        feed.abort();
    }
    controller.teardown();
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
