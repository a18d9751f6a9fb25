// Client-side input validation errors
use thiserror::Error;

/// Rejected user input. The Display text is what the alert banner shows,
/// and no request is sent when one of these is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Brightness must be between 0 and 100.")]
    Brightness,
    #[error("Duration (ms) must be a non-negative number.")]
    Duration,
    #[error("Invalid color selected.")]
    Color,
    #[error("Device name is required.")]
    DeviceName,
    #[error("Please enter at least a Genus or Species to search.")]
    LookupTerms,
    #[error("Threshold must be between 0 and 4095.")]
    Threshold,
    #[error("Unknown period '{0}'.")]
    Period(String),
}
