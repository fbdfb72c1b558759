//! Fleet mechanical-health analytics core.
//!
//! Three coupled pieces: a sensor health analyzer producing deduplicated
//! threshold/trend alerts per truck, a rolling baseline statistics service
//! behind a pluggable store, and a failure-prediction ensemble combining a
//! Weibull survival model with an ARIMA-style forecast. A fleet aggregator
//! runs the analyzer over every truck with bounded concurrency.
//!
//! The surrounding product (ingestion, HTTP surface, notification delivery,
//! dashboards) is out of scope; collaborators are consumed through the
//! traits in [`telemetry`] and [`baseline`].

pub mod baseline;
pub mod catalog;
pub mod fleet;
pub mod health;
pub mod predict;
pub mod telemetry;

pub use baseline::{
    compute_baseline, BaselineService, BaselineStore, MemoryBaselineStore, SensorBaseline,
    SledBaselineStore,
};
pub use catalog::{load_catalog, Catalog, CatalogError};
pub use fleet::FleetHealthAggregator;
pub use health::{
    analyze_truck, FleetHealthSummary, HealthAlert, OverallStatus, SensorHealthAnalyzer, Severity,
    TruckAnalysisOptions, TruckHealthStatus,
};
pub use predict::{ComponentFailureHistory, FailurePrediction, FailurePredictor};
pub use telemetry::{SensorSample, SensorSnapshot, TelemetryProvider};
