use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::baseline::SensorBaseline;
use crate::catalog::{Catalog, SensorRule};
use crate::telemetry::{SensorSample, SensorSnapshot};

use super::cooldown::AlertCooldown;
use super::maintenance::maintenance_hints;
use super::model::{
    AlertCategory, HealthAlert, OverallStatus, SensorStatus, Severity, TrendDirection,
    TruckHealthStatus,
};
use super::rules::{band_action, band_threshold, evaluate_band, severity_for};
use super::trend::{classify_trend, is_adverse, monotonic_run};

/// Sensor Health Analyzer: evaluates one truck's snapshot against static
/// bands, rolling baselines and cross-sensor differentials, with alert
/// deduplication shared across calls for the lifetime of the instance.
pub struct SensorHealthAnalyzer {
    catalog: Arc<Catalog>,
    cooldown: Mutex<AlertCooldown>,
}

impl SensorHealthAnalyzer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            cooldown: Mutex::new(AlertCooldown::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Analyzes one truck. `history` must be pre-sorted ascending by
    /// timestamp per sensor; `history` and `baselines` may be omitted for a
    /// lighter threshold-only evaluation. Never fails: degraded inputs
    /// degrade the result.
    pub async fn analyze(
        &self,
        snapshot: &SensorSnapshot,
        history: Option<&HashMap<String, Vec<SensorSample>>>,
        baselines: Option<&HashMap<String, SensorBaseline>>,
        now: DateTime<Utc>,
    ) -> TruckHealthStatus {
        let data_age_minutes = now
            .signed_duration_since(snapshot.timestamp)
            .num_minutes()
            .max(0);

        if data_age_minutes > self.catalog.staleness_minutes {
            log::info!(
                "truck_offline truck={} data_age_minutes={} staleness_minutes={}",
                snapshot.truck_id,
                data_age_minutes,
                self.catalog.staleness_minutes
            );
            return TruckHealthStatus::offline(
                snapshot.truck_id.clone(),
                snapshot.timestamp,
                data_age_minutes,
            );
        }

        let engine_running = snapshot
            .reading(&self.catalog.rpm_sensor)
            .map(|rpm| rpm > self.catalog.engine_running_rpm)
            .unwrap_or(false);

        let mut sensor_status: HashMap<String, SensorStatus> = HashMap::new();
        let mut trends: HashMap<String, TrendDirection> = HashMap::new();
        let mut raised: Vec<HealthAlert> = Vec::new();

        for rule in &self.catalog.sensors {
            let Some(value) = snapshot.reading(&rule.name) else {
                continue;
            };
            if rule.requires_engine_running && !engine_running {
                continue;
            }

            let mut status = evaluate_band(rule, value);

            let mut baseline_value = None;
            let mut trend_direction = None;
            if let Some(baseline) = baselines.and_then(|map| map.get(&rule.name)) {
                if let Some((direction, deviation_pct)) = classify_trend(rule, value, baseline) {
                    trends.insert(rule.name.clone(), direction);
                    baseline_value = Some(baseline.mean_30d);
                    trend_direction = Some(direction);

                    // A critical deviation in the bad direction is at least
                    // a warning even when the absolute band says otherwise.
                    if direction.is_critical() && is_adverse(rule.direction, direction) {
                        status = status.escalate_to(SensorStatus::Warning);
                        log::debug!(
                            "trend_escalation truck={} sensor={} deviation_pct={:.1}",
                            snapshot.truck_id,
                            rule.name,
                            deviation_pct
                        );
                    }
                }
            }

            sensor_status.insert(rule.name.clone(), status);

            if let Some(severity) = severity_for(status) {
                raised.push(self.band_alert(
                    snapshot,
                    rule,
                    value,
                    status,
                    severity,
                    baseline_value,
                    trend_direction,
                    now,
                ));
            }
        }

        if engine_running {
            self.evaluate_differentials(snapshot, now, &mut raised);
        }

        if let Some(history) = history {
            self.evaluate_runs(snapshot, history, now, &mut raised);
        }

        let maintenance_predictions = maintenance_hints(&self.catalog, &sensor_status, &trends);

        let cooldown_window = Duration::minutes(self.catalog.cooldown_minutes);
        let active_alerts = {
            let mut cooldown = self.cooldown.lock().await;
            raised
                .into_iter()
                .filter(|alert| cooldown.should_send(alert, cooldown_window, now))
                .collect::<Vec<_>>()
        };

        let critical_count = active_alerts
            .iter()
            .filter(|alert| alert.severity == Severity::Critical)
            .count();
        let warning_count = active_alerts
            .iter()
            .filter(|alert| alert.severity == Severity::Warning)
            .count();

        let overall_status = if sensor_status.is_empty() {
            OverallStatus::Unknown
        } else if critical_count > 0 {
            OverallStatus::Critical
        } else if warning_count > 0 {
            OverallStatus::Warning
        } else {
            OverallStatus::Healthy
        };

        TruckHealthStatus {
            truck_id: snapshot.truck_id.clone(),
            overall_status,
            last_reading_time: snapshot.timestamp,
            data_age_minutes,
            sensor_status,
            active_alerts,
            critical_count,
            warning_count,
            maintenance_predictions,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn band_alert(
        &self,
        snapshot: &SensorSnapshot,
        rule: &SensorRule,
        value: f64,
        status: SensorStatus,
        severity: Severity,
        baseline_value: Option<f64>,
        trend_direction: Option<TrendDirection>,
        now: DateTime<Utc>,
    ) -> HealthAlert {
        let threshold_value = band_threshold(rule, status);
        let message = match trend_direction {
            Some(direction) if direction.is_critical() && is_adverse(rule.direction, direction) => {
                format!(
                    "{} at {:.1} {} is deviating sharply from its 30-day baseline of {:.1}",
                    rule.label,
                    value,
                    rule.unit,
                    baseline_value.unwrap_or_default()
                )
            }
            _ => format!(
                "{} at {:.1} {} (threshold {:.1} {})",
                rule.label, value, rule.unit, threshold_value, rule.unit
            ),
        };

        HealthAlert {
            truck_id: snapshot.truck_id.clone(),
            category: rule.category,
            severity,
            sensor_name: rule.name.clone(),
            current_value: value,
            threshold_value,
            baseline_value,
            trend_direction,
            message,
            recommended_action: band_action(rule, status).to_string(),
            timestamp: now,
            active: true,
        }
    }

    fn evaluate_differentials(
        &self,
        snapshot: &SensorSnapshot,
        now: DateTime<Utc>,
        raised: &mut Vec<HealthAlert>,
    ) {
        for rule in &self.catalog.differentials {
            let (Some(minuend), Some(subtrahend)) = (
                snapshot.reading(&rule.minuend),
                snapshot.reading(&rule.subtrahend),
            ) else {
                continue;
            };

            let differential = minuend - subtrahend;
            let severity = if differential >= rule.critical {
                Severity::Critical
            } else if differential >= rule.warning {
                Severity::Warning
            } else {
                continue;
            };
            let threshold_value = if severity == Severity::Critical {
                rule.critical
            } else {
                rule.warning
            };

            raised.push(HealthAlert {
                truck_id: snapshot.truck_id.clone(),
                category: AlertCategory::Differential,
                severity,
                sensor_name: rule.name.clone(),
                current_value: differential,
                threshold_value,
                baseline_value: None,
                trend_direction: None,
                message: format!(
                    "{} differential at {:.1} (threshold {:.1})",
                    rule.name, differential, threshold_value
                ),
                recommended_action: rule.action.clone(),
                timestamp: now,
                active: true,
            });
        }
    }

    fn evaluate_runs(
        &self,
        snapshot: &SensorSnapshot,
        history: &HashMap<String, Vec<SensorSample>>,
        now: DateTime<Utc>,
        raised: &mut Vec<HealthAlert>,
    ) {
        for rule in &self.catalog.sensors {
            let Some(samples) = history.get(&rule.name) else {
                continue;
            };
            let Some(magnitude) = monotonic_run(rule, samples) else {
                continue;
            };
            let current_value = samples
                .last()
                .map(|sample| sample.value)
                .unwrap_or_default();

            raised.push(HealthAlert {
                truck_id: snapshot.truck_id.clone(),
                category: AlertCategory::Trend,
                severity: Severity::Watch,
                sensor_name: rule.name.clone(),
                current_value,
                threshold_value: rule.watch,
                baseline_value: None,
                trend_direction: None,
                message: format!(
                    "{} moved {:.1} {} over the last {} readings",
                    rule.label,
                    magnitude,
                    rule.unit,
                    super::trend::RUN_LENGTH
                ),
                recommended_action: rule.action_watch.clone(),
                timestamp: now,
                active: true,
            });
        }
    }
}
