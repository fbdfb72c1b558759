use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Watch,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Normal,
    Watch,
    Warning,
    Critical,
}

impl SensorStatus {
    pub(crate) fn escalate_to(self, floor: SensorStatus) -> SensorStatus {
        self.max(floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Healthy,
    Warning,
    Critical,
    Offline,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Stable,
    Rising,
    Falling,
    RisingCritical,
    FallingCritical,
}

impl TrendDirection {
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            TrendDirection::RisingCritical | TrendDirection::FallingCritical
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    OilPressure,
    CoolantTemp,
    OilTemp,
    TransmissionTemp,
    DefLevel,
    BatteryVoltage,
    FuelPressure,
    IntakeTemp,
    Differential,
    Trend,
}

/// A single raised condition for one truck. Immutable once created; the
/// surrounding service owns persistence and resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAlert {
    pub truck_id: String,
    pub category: AlertCategory,
    pub severity: Severity,
    pub sensor_name: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub baseline_value: Option<f64>,
    pub trend_direction: Option<TrendDirection>,
    pub message: String,
    pub recommended_action: String,
    pub timestamp: DateTime<Utc>,
    pub active: bool,
}

/// Free-text maintenance hint derived from sensor state, with a rough
/// parts-and-labor cost band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceHint {
    pub component: String,
    pub recommendation: String,
    pub cost_low: f64,
    pub cost_high: f64,
}

/// Result of one analysis pass over a single truck. Built fresh on every
/// call; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckHealthStatus {
    pub truck_id: String,
    pub overall_status: OverallStatus,
    pub last_reading_time: DateTime<Utc>,
    pub data_age_minutes: i64,
    pub sensor_status: HashMap<String, SensorStatus>,
    pub active_alerts: Vec<HealthAlert>,
    pub critical_count: usize,
    pub warning_count: usize,
    pub maintenance_predictions: Vec<MaintenanceHint>,
}

impl TruckHealthStatus {
    pub(crate) fn offline(
        truck_id: String,
        last_reading_time: DateTime<Utc>,
        data_age_minutes: i64,
    ) -> Self {
        Self {
            truck_id,
            overall_status: OverallStatus::Offline,
            last_reading_time,
            data_age_minutes,
            sensor_status: HashMap::new(),
            active_alerts: Vec::new(),
            critical_count: 0,
            warning_count: 0,
            maintenance_predictions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetHealthSummary {
    pub timestamp: DateTime<Utc>,
    pub total_trucks: usize,
    pub trucks_healthy: usize,
    pub trucks_warning: usize,
    pub trucks_critical: usize,
    pub trucks_offline: usize,
    pub critical_alerts: Vec<HealthAlert>,
    pub warning_alerts: Vec<HealthAlert>,
    pub sensor_coverage: HashMap<String, usize>,
    pub trucks_by_status: HashMap<OverallStatus, Vec<String>>,
}
