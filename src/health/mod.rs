mod analyzer;
mod cooldown;
mod maintenance;
pub mod model;
mod rules;
mod service;
mod trend;

pub use analyzer::SensorHealthAnalyzer;
pub use model::{
    AlertCategory, FleetHealthSummary, HealthAlert, MaintenanceHint, OverallStatus, SensorStatus,
    Severity, TrendDirection, TruckHealthStatus,
};
pub use service::{analyze_truck, TruckAnalysisOptions};

#[cfg(test)]
mod tests;
