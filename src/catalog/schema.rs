use serde::Deserialize;

use crate::health::model::AlertCategory;

use super::defaults::*;

/// Direction of the failure condition for a sensor: `High` means large
/// values are bad, `Low` means small values are bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    High,
    Low,
}

/// Static threshold bands and trend limits for one monitored sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRule {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub category: AlertCategory,
    pub direction: Direction,
    pub critical: f64,
    pub warning: f64,
    pub watch: f64,
    #[serde(default = "default_requires_engine_running")]
    pub requires_engine_running: bool,
    #[serde(default = "default_trend_warning_pct")]
    pub trend_warning_pct: f64,
    #[serde(default = "default_trend_critical_pct")]
    pub trend_critical_pct: f64,
    pub action_critical: String,
    pub action_warning: String,
    pub action_watch: String,
}

/// Cross-sensor relationship evaluated as `minuend - subtrahend` against a
/// high-direction band (e.g. oil temperature running hot over coolant).
#[derive(Debug, Clone, Deserialize)]
pub struct DifferentialRule {
    pub name: String,
    pub minuend: String,
    pub subtrahend: String,
    pub warning: f64,
    pub critical: f64,
    pub action: String,
}

/// ARIMA-style model order (p, d, q).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ForecastOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

/// Per-component model priors, ensemble weights and maintenance metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub label: String,
    pub primary_sensor: String,
    #[serde(default)]
    pub secondary_sensor: Option<String>,
    pub weibull_shape_prior: f64,
    pub weibull_scale_prior: f64,
    pub forecast_order: ForecastOrder,
    pub weight_weibull: f64,
    pub weight_arima: f64,
    pub failure_threshold: f64,
    pub cost_low: f64,
    pub cost_high: f64,
    pub maintenance_action: String,
}

/// The component threshold catalog: static configuration consumed by the
/// analyzer and the failure predictor. Loaded once at startup and validated
/// eagerly; an empty TOML file yields the built-in truck catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_staleness_minutes")]
    pub staleness_minutes: i64,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
    #[serde(default = "default_engine_running_rpm")]
    pub engine_running_rpm: f64,
    #[serde(default = "default_rpm_sensor")]
    pub rpm_sensor: String,
    #[serde(default = "default_max_summary_alerts")]
    pub max_summary_alerts: usize,
    #[serde(default = "default_sensor_rules")]
    pub sensors: Vec<SensorRule>,
    #[serde(default = "default_differential_rules")]
    pub differentials: Vec<DifferentialRule>,
    #[serde(default = "default_component_specs")]
    pub components: Vec<ComponentSpec>,
}

impl Catalog {
    pub fn sensor(&self, name: &str) -> Option<&SensorRule> {
        self.sensors.iter().find(|rule| rule.name == name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|spec| spec.name == name)
    }
}
