use std::collections::HashSet;

use thiserror::Error;

use super::schema::{Catalog, Direction};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid catalog: {0}")]
    Validation(String),
}

impl Catalog {
    /// Validates the whole catalog eagerly so that a bad entry fails at
    /// startup instead of at first use.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.staleness_minutes <= 0 {
            return Err(CatalogError::Validation(
                "staleness_minutes must be greater than 0".to_string(),
            ));
        }
        if self.cooldown_minutes <= 0 {
            return Err(CatalogError::Validation(
                "cooldown_minutes must be greater than 0".to_string(),
            ));
        }
        if self.engine_running_rpm < 0.0 || !self.engine_running_rpm.is_finite() {
            return Err(CatalogError::Validation(
                "engine_running_rpm must be a non-negative number".to_string(),
            ));
        }
        if self.rpm_sensor.trim().is_empty() {
            return Err(CatalogError::Validation(
                "rpm_sensor must not be empty".to_string(),
            ));
        }
        if self.max_summary_alerts == 0 {
            return Err(CatalogError::Validation(
                "max_summary_alerts must be at least 1".to_string(),
            ));
        }
        if self.sensors.is_empty() {
            return Err(CatalogError::Validation(
                "at least one sensor rule is required".to_string(),
            ));
        }

        let mut sensor_names = HashSet::new();
        for rule in &self.sensors {
            if rule.name.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "sensor name must not be empty".to_string(),
                ));
            }
            if !sensor_names.insert(rule.name.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate sensor rule: {}",
                    rule.name
                )));
            }
            for (field, value) in [
                ("critical", rule.critical),
                ("warning", rule.warning),
                ("watch", rule.watch),
            ] {
                if !value.is_finite() {
                    return Err(CatalogError::Validation(format!(
                        "sensor {}: {} threshold must be finite",
                        rule.name, field
                    )));
                }
            }
            let ordered = match rule.direction {
                Direction::Low => rule.critical < rule.warning && rule.warning < rule.watch,
                Direction::High => rule.critical > rule.warning && rule.warning > rule.watch,
            };
            if !ordered {
                return Err(CatalogError::Validation(format!(
                    "sensor {}: bands must be strictly ordered critical/warning/watch in the {:?} direction",
                    rule.name, rule.direction
                )));
            }
            if rule.trend_warning_pct <= 0.0 || rule.trend_critical_pct <= rule.trend_warning_pct {
                return Err(CatalogError::Validation(format!(
                    "sensor {}: trend thresholds must satisfy 0 < warning < critical",
                    rule.name
                )));
            }
        }

        let mut differential_names = HashSet::new();
        for rule in &self.differentials {
            if !differential_names.insert(rule.name.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate differential rule: {}",
                    rule.name
                )));
            }
            for sensor in [&rule.minuend, &rule.subtrahend] {
                if !sensor_names.contains(sensor.as_str()) {
                    return Err(CatalogError::Validation(format!(
                        "differential {}: unknown sensor {}",
                        rule.name, sensor
                    )));
                }
            }
            if rule.warning >= rule.critical {
                return Err(CatalogError::Validation(format!(
                    "differential {}: warning must be below critical",
                    rule.name
                )));
            }
        }

        let mut component_names = HashSet::new();
        for spec in &self.components {
            if !component_names.insert(spec.name.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate component: {}",
                    spec.name
                )));
            }
            if !sensor_names.contains(spec.primary_sensor.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "component {}: unknown primary sensor {}",
                    spec.name, spec.primary_sensor
                )));
            }
            if let Some(secondary) = &spec.secondary_sensor {
                if !sensor_names.contains(secondary.as_str()) {
                    return Err(CatalogError::Validation(format!(
                        "component {}: unknown secondary sensor {}",
                        spec.name, secondary
                    )));
                }
            }
            if spec.weibull_shape_prior <= 0.0 || spec.weibull_scale_prior <= 0.0 {
                return Err(CatalogError::Validation(format!(
                    "component {}: Weibull priors must be positive",
                    spec.name
                )));
            }
            let order = spec.forecast_order;
            if order.p > 4 || order.d > 2 || order.q > 4 || order.p + order.q == 0 {
                return Err(CatalogError::Validation(format!(
                    "component {}: forecast order must satisfy p<=4, d<=2, q<=4, p+q>=1",
                    spec.name
                )));
            }
            if spec.weight_weibull < 0.0 || spec.weight_arima < 0.0 {
                return Err(CatalogError::Validation(format!(
                    "component {}: ensemble weights must be non-negative",
                    spec.name
                )));
            }
            if spec.weight_weibull + spec.weight_arima == 0.0 {
                return Err(CatalogError::Validation(format!(
                    "component {}: at least one ensemble weight must be positive",
                    spec.name
                )));
            }
            if !spec.failure_threshold.is_finite() {
                return Err(CatalogError::Validation(format!(
                    "component {}: failure_threshold must be finite",
                    spec.name
                )));
            }
            if spec.cost_low < 0.0 || spec.cost_high < spec.cost_low {
                return Err(CatalogError::Validation(format!(
                    "component {}: cost band must satisfy 0 <= low <= high",
                    spec.name
                )));
            }
        }

        Ok(())
    }
}
