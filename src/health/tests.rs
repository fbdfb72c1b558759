use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::baseline::{compute_baseline, BaselineService, MemoryBaselineStore};
use crate::catalog::Catalog;
use crate::telemetry::{MockTelemetryProvider, SensorSample, SensorSnapshot};

use super::model::{AlertCategory, OverallStatus, SensorStatus, Severity, TrendDirection};
use super::{analyze_truck, SensorHealthAnalyzer, TruckAnalysisOptions};

fn analyzer() -> SensorHealthAnalyzer {
    SensorHealthAnalyzer::new(Arc::new(Catalog::default()))
}

fn snapshot(truck_id: &str, readings: &[(&str, f64)]) -> SensorSnapshot {
    SensorSnapshot::new(
        truck_id,
        readings
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
        Utc::now(),
    )
}

fn rising_history(start: f64, step: f64, count: usize) -> Vec<SensorSample> {
    let begin = Utc::now() - Duration::hours(count as i64);
    (0..count)
        .map(|index| SensorSample {
            timestamp: begin + Duration::hours(index as i64),
            value: start + step * index as f64,
        })
        .collect()
}

#[tokio::test]
async fn low_oil_pressure_with_engine_running_is_critical() {
    let analyzer = analyzer();
    let snapshot = snapshot("T-1", &[("oil_pressure_psi", 18.0), ("rpm", 1500.0)]);

    let status = analyzer.analyze(&snapshot, None, None, Utc::now()).await;

    assert_eq!(status.overall_status, OverallStatus::Critical);
    assert_eq!(status.critical_count, 1);
    let alert = &status.active_alerts[0];
    assert_eq!(alert.category, AlertCategory::OilPressure);
    assert_eq!(alert.severity, Severity::Critical);
    assert!((alert.threshold_value - 20.0).abs() < 1e-9);
    assert!(!alert.recommended_action.is_empty());
}

#[tokio::test]
async fn coolant_heat_soak_is_critical_with_engine_off() {
    let analyzer = analyzer();
    let snapshot = snapshot("T-2", &[("coolant_temp_f", 235.0), ("rpm", 0.0)]);

    let status = analyzer.analyze(&snapshot, None, None, Utc::now()).await;

    assert_eq!(status.overall_status, OverallStatus::Critical);
    let alert = &status.active_alerts[0];
    assert_eq!(alert.category, AlertCategory::CoolantTemp);
    assert_eq!(alert.severity, Severity::Critical);
}

#[tokio::test]
async fn engine_gated_sensors_are_skipped_when_engine_is_off() {
    let analyzer = analyzer();
    let snapshot = snapshot(
        "T-3",
        &[
            ("oil_pressure_psi", 18.0),
            ("def_level_pct", 80.0),
            ("rpm", 0.0),
        ],
    );

    let status = analyzer.analyze(&snapshot, None, None, Utc::now()).await;

    assert_eq!(status.overall_status, OverallStatus::Healthy);
    assert!(!status.sensor_status.contains_key("oil_pressure_psi"));
    assert!(status.active_alerts.is_empty());
}

#[tokio::test]
async fn low_def_level_is_a_warning() {
    let analyzer = analyzer();
    let snapshot = snapshot("T-4", &[("def_level_pct", 8.0)]);

    let status = analyzer.analyze(&snapshot, None, None, Utc::now()).await;

    assert_eq!(status.overall_status, OverallStatus::Warning);
    assert_eq!(status.warning_count, 1);
    assert_eq!(status.active_alerts[0].severity, Severity::Warning);
}

#[tokio::test]
async fn stale_snapshot_short_circuits_to_offline() {
    let analyzer = analyzer();
    let mut stale = snapshot("T-5", &[("coolant_temp_f", 260.0), ("rpm", 1500.0)]);
    stale.timestamp = Utc::now() - Duration::minutes(20);

    let status = analyzer.analyze(&stale, None, None, Utc::now()).await;

    assert_eq!(status.overall_status, OverallStatus::Offline);
    assert_eq!(status.data_age_minutes, 20);
    assert!(status.active_alerts.is_empty());
    assert!(status.sensor_status.is_empty());
}

#[tokio::test]
async fn snapshot_without_monitored_sensors_is_unknown() {
    let analyzer = analyzer();
    let snapshot = snapshot("T-6", &[("unmonitored_sensor", 1.0)]);

    let status = analyzer.analyze(&snapshot, None, None, Utc::now()).await;
    assert_eq!(status.overall_status, OverallStatus::Unknown);
}

#[tokio::test]
async fn overall_status_follows_alert_counts() {
    let analyzer = analyzer();

    let healthy = analyzer
        .analyze(
            &snapshot("T-7", &[("coolant_temp_f", 195.0), ("rpm", 1400.0)]),
            None,
            None,
            Utc::now(),
        )
        .await;
    assert_eq!(healthy.overall_status, OverallStatus::Healthy);
    assert_eq!(healthy.critical_count + healthy.warning_count, 0);

    let warning = analyzer
        .analyze(
            &snapshot("T-8", &[("coolant_temp_f", 225.0), ("rpm", 1400.0)]),
            None,
            None,
            Utc::now(),
        )
        .await;
    assert_eq!(warning.overall_status, OverallStatus::Warning);

    // Critical wins over a simultaneous warning.
    let critical = analyzer
        .analyze(
            &snapshot(
                "T-9",
                &[
                    ("coolant_temp_f", 225.0),
                    ("oil_pressure_psi", 15.0),
                    ("rpm", 1400.0),
                ],
            ),
            None,
            None,
            Utc::now(),
        )
        .await;
    assert_eq!(critical.overall_status, OverallStatus::Critical);
    assert!(critical.critical_count > 0);
}

#[tokio::test]
async fn repeated_warning_key_within_cooldown_is_kept_once() {
    let analyzer = analyzer();
    let first = analyzer
        .analyze(
            &snapshot("T-10", &[("def_level_pct", 8.0)]),
            None,
            None,
            Utc::now(),
        )
        .await;
    assert_eq!(first.active_alerts.len(), 1);

    let second = analyzer
        .analyze(
            &snapshot("T-10", &[("def_level_pct", 8.0)]),
            None,
            None,
            Utc::now() + Duration::minutes(5),
        )
        .await;
    assert!(second.active_alerts.is_empty());
    assert_eq!(second.overall_status, OverallStatus::Healthy);
}

#[tokio::test]
async fn critical_trend_deviation_escalates_to_warning() {
    let analyzer = analyzer();
    let history: Vec<SensorSample> = rising_history(190.0, 0.0, 24);
    let baseline = compute_baseline("T-11", "coolant_temp_f", &history, Utc::now());
    let baselines = HashMap::from([("coolant_temp_f".to_string(), baseline)]);

    // 212 F sits in the watch band but is >10% above the 190 F baseline.
    let status = analyzer
        .analyze(
            &snapshot("T-11", &[("coolant_temp_f", 212.0), ("rpm", 1400.0)]),
            None,
            Some(&baselines),
            Utc::now(),
        )
        .await;

    assert_eq!(
        status.sensor_status["coolant_temp_f"],
        SensorStatus::Warning
    );
    let alert = &status.active_alerts[0];
    assert_eq!(alert.trend_direction, Some(TrendDirection::RisingCritical));
    assert_eq!(alert.severity, Severity::Warning);
    assert!(alert.baseline_value.is_some());
}

#[tokio::test]
async fn hot_running_differential_raises_its_own_alert() {
    let analyzer = analyzer();
    let status = analyzer
        .analyze(
            &snapshot(
                "T-12",
                &[
                    ("oil_temp_f", 236.0),
                    ("coolant_temp_f", 205.0),
                    ("rpm", 1400.0),
                ],
            ),
            None,
            None,
            Utc::now(),
        )
        .await;

    let differential = status
        .active_alerts
        .iter()
        .find(|alert| alert.category == AlertCategory::Differential)
        .expect("differential alert raised");
    assert_eq!(differential.severity, Severity::Warning);
    assert!((differential.current_value - 31.0).abs() < 1e-9);
    // The oil temperature watch alert is raised independently.
    assert!(status
        .active_alerts
        .iter()
        .any(|alert| alert.category == AlertCategory::OilTemp));
}

#[tokio::test]
async fn monotonic_history_run_emits_a_watch_trend_alert() {
    let analyzer = analyzer();
    let history = HashMap::from([(
        "coolant_temp_f".to_string(),
        rising_history(180.0, 2.5, 12),
    )]);

    let status = analyzer
        .analyze(
            &snapshot("T-13", &[("coolant_temp_f", 207.5), ("rpm", 1400.0)]),
            Some(&history),
            None,
            Utc::now(),
        )
        .await;

    let trend = status
        .active_alerts
        .iter()
        .find(|alert| alert.category == AlertCategory::Trend)
        .expect("trend alert raised");
    assert_eq!(trend.severity, Severity::Watch);
    assert!(trend.message.contains("coolant") || trend.message.contains("Coolant"));
}

#[tokio::test]
async fn warning_sensors_produce_maintenance_hints() {
    let analyzer = analyzer();
    let status = analyzer
        .analyze(
            &snapshot("T-14", &[("trans_temp_f", 230.0), ("rpm", 1400.0)]),
            None,
            None,
            Utc::now(),
        )
        .await;

    assert!(status
        .maintenance_predictions
        .iter()
        .any(|hint| hint.component == "transmission"));
}

#[tokio::test]
async fn detailed_analysis_pulls_history_and_baselines_from_collaborators() {
    let analyzer = analyzer();
    let baseline_service = BaselineService::new(MemoryBaselineStore::new());
    let provider = MockTelemetryProvider::new(vec![snapshot(
        "T-15",
        &[("coolant_temp_f", 207.5), ("rpm", 1400.0)],
    )])
    .with_history("T-15", "coolant_temp_f", rising_history(180.0, 2.5, 12));

    let status = analyze_truck(
        &provider,
        &baseline_service,
        &analyzer,
        "T-15",
        &TruckAnalysisOptions::default(),
    )
    .await;

    assert!(status
        .active_alerts
        .iter()
        .any(|alert| alert.category == AlertCategory::Trend));
}

#[tokio::test]
async fn missing_snapshot_degrades_to_unknown() {
    let analyzer = analyzer();
    let baseline_service = BaselineService::new(MemoryBaselineStore::new());
    let provider = MockTelemetryProvider::new(Vec::new());

    let status = analyze_truck(
        &provider,
        &baseline_service,
        &analyzer,
        "T-16",
        &TruckAnalysisOptions::default(),
    )
    .await;

    assert_eq!(status.overall_status, OverallStatus::Unknown);
    assert!(status.active_alerts.is_empty());
}
