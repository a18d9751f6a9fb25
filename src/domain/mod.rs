// Domain layer - View-state models decoded from the backend
pub mod device;
pub mod history;
pub mod plant;
pub mod snapshot;
pub mod thresholds;
pub mod validation;
pub mod watering;
