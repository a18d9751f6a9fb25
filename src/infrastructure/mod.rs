// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_api;
pub mod layout;
pub mod memory_document;
pub mod recording_charts;
pub mod sse;
