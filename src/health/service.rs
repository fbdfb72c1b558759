use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;

use crate::baseline::{BaselineService, BaselineStore};
use crate::telemetry::{fetch_history_with_timeout, SensorSample, TelemetryProvider};

use super::analyzer::SensorHealthAnalyzer;
use super::model::{OverallStatus, TruckHealthStatus};

/// Knobs for the detailed single-truck analysis.
#[derive(Debug, Clone)]
pub struct TruckAnalysisOptions {
    pub history_days: u32,
    pub collaborator_timeout: Duration,
}

impl Default for TruckAnalysisOptions {
    fn default() -> Self {
        Self {
            history_days: 30,
            collaborator_timeout: Duration::from_secs(5),
        }
    }
}

/// Detailed single-truck analysis: fetches the latest snapshot, per-sensor
/// history and baselines from the collaborators, then runs the analyzer.
/// Collaborator timeouts degrade to threshold-only evaluation; a missing
/// snapshot degrades the truck to `Unknown` rather than failing.
pub async fn analyze_truck<P, S>(
    provider: &P,
    baseline_service: &BaselineService<S>,
    analyzer: &SensorHealthAnalyzer,
    truck_id: &str,
    options: &TruckAnalysisOptions,
) -> TruckHealthStatus
where
    P: TelemetryProvider,
    S: BaselineStore,
{
    let now = Utc::now();

    let snapshot = match tokio::time::timeout(
        options.collaborator_timeout,
        provider.latest_snapshot(truck_id),
    )
    .await
    {
        Ok(Ok(snapshot)) => snapshot,
        Ok(Err(error)) => {
            log::warn!(
                "truck_snapshot_unavailable truck={} reason=provider_error error={}",
                truck_id,
                error
            );
            return unknown_status(truck_id);
        }
        Err(_) => {
            log::warn!(
                "truck_snapshot_unavailable truck={} reason=timeout timeout_ms={}",
                truck_id,
                options.collaborator_timeout.as_millis()
            );
            return unknown_status(truck_id);
        }
    };

    let baselines = baseline_service.load(truck_id).await;

    let mut history: HashMap<String, Vec<SensorSample>> = HashMap::new();
    for rule in &analyzer.catalog().sensors {
        if snapshot.reading(&rule.name).is_none() {
            continue;
        }
        if let Some(samples) = fetch_history_with_timeout(
            provider,
            truck_id,
            &rule.name,
            options.history_days,
            options.collaborator_timeout,
        )
        .await
        {
            history.insert(rule.name.clone(), samples);
        }
    }

    let status = analyzer
        .analyze(&snapshot, Some(&history), Some(&baselines), now)
        .await;

    tracing::info!(
        target: "health",
        truck = truck_id,
        overall = ?status.overall_status,
        critical = status.critical_count,
        warning = status.warning_count,
        data_age_minutes = status.data_age_minutes,
        "truck_analyzed"
    );

    status
}

fn unknown_status(truck_id: &str) -> TruckHealthStatus {
    let now = Utc::now();
    TruckHealthStatus {
        truck_id: truck_id.to_string(),
        overall_status: OverallStatus::Unknown,
        last_reading_time: now,
        data_age_minutes: 0,
        sensor_status: HashMap::new(),
        active_alerts: Vec::new(),
        critical_count: 0,
        warning_count: 0,
        maintenance_predictions: Vec::new(),
    }
}
