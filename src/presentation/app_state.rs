// Application state for HTTP handlers
use crate::application::chart_view::ChartRegistry;
use crate::application::router::PageId;
use crate::infrastructure::memory_document::MemoryDocument;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub page: PageId,
    pub document: Arc<MemoryDocument>,
    pub charts: Arc<ChartRegistry>,
}
