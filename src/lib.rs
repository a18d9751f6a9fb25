// Plant dashboard - headless page controllers for the plant monitoring web UI
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
