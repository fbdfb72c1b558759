use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::health::model::{
    FleetHealthSummary, HealthAlert, OverallStatus, Severity, TruckHealthStatus,
};
use crate::health::SensorHealthAnalyzer;
use crate::telemetry::SensorSnapshot;

/// Default bound on concurrently analyzed trucks, sized for the downstream
/// collaborator connection budget rather than CPU count.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Fleet Health Aggregator: runs the analyzer over every truck and folds
/// the results into one fleet-wide summary. The scan is embarrassingly
/// parallel across trucks and bounded by a semaphore.
pub struct FleetHealthAggregator {
    analyzer: Arc<SensorHealthAnalyzer>,
    max_concurrent: usize,
}

impl FleetHealthAggregator {
    pub fn new(analyzer: Arc<SensorHealthAnalyzer>) -> Self {
        Self::with_max_concurrent(analyzer, DEFAULT_MAX_CONCURRENT)
    }

    pub fn with_max_concurrent(analyzer: Arc<SensorHealthAnalyzer>, max_concurrent: usize) -> Self {
        Self {
            analyzer,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Analyzes every snapshot with history and baselines omitted (the
    /// light fleet scan) and buckets trucks by status. `Unknown` trucks
    /// count toward the offline bucket so the four bucket counts always
    /// sum to the fleet size. A failed task degrades its truck to offline
    /// instead of failing the scan.
    pub async fn analyze_fleet(
        &self,
        snapshots: Vec<SensorSnapshot>,
        now: DateTime<Utc>,
    ) -> FleetHealthSummary {
        let total_trucks = snapshots.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        let mut handles = Vec::with_capacity(total_trucks);
        for snapshot in snapshots {
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let truck_id = snapshot.truck_id.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("fleet scan semaphore closed");

                let monitored: Vec<String> = analyzer
                    .catalog()
                    .sensors
                    .iter()
                    .filter(|rule| snapshot.reading(&rule.name).is_some())
                    .map(|rule| rule.name.clone())
                    .collect();

                let status = analyzer.analyze(&snapshot, None, None, now).await;
                (monitored, status)
            });
            handles.push((truck_id, handle));
        }

        let mut summary = SummaryBuilder::new(
            now,
            total_trucks,
            self.analyzer.catalog().max_summary_alerts,
        );
        for (truck_id, handle) in handles {
            match handle.await {
                Ok((monitored, status)) => summary.add(monitored, status),
                Err(error) => {
                    log::error!(
                        "fleet_scan_task_failed truck={} error={}",
                        truck_id,
                        error
                    );
                    summary.add(
                        Vec::new(),
                        TruckHealthStatus::offline(truck_id, now, 0),
                    );
                }
            }
        }

        let summary = summary.finish();
        tracing::info!(
            target: "fleet",
            total = summary.total_trucks,
            healthy = summary.trucks_healthy,
            warning = summary.trucks_warning,
            critical = summary.trucks_critical,
            offline = summary.trucks_offline,
            "fleet_scan_complete"
        );
        summary
    }
}

fn bucket_for(status: OverallStatus) -> OverallStatus {
    match status {
        OverallStatus::Healthy => OverallStatus::Healthy,
        OverallStatus::Warning => OverallStatus::Warning,
        OverallStatus::Critical => OverallStatus::Critical,
        // No usable data either way.
        OverallStatus::Offline | OverallStatus::Unknown => OverallStatus::Offline,
    }
}

struct SummaryBuilder {
    timestamp: DateTime<Utc>,
    total_trucks: usize,
    max_alerts: usize,
    trucks_healthy: usize,
    trucks_warning: usize,
    trucks_critical: usize,
    trucks_offline: usize,
    critical_alerts: Vec<HealthAlert>,
    warning_alerts: Vec<HealthAlert>,
    sensor_coverage: HashMap<String, usize>,
    trucks_by_status: HashMap<OverallStatus, Vec<String>>,
}

impl SummaryBuilder {
    fn new(timestamp: DateTime<Utc>, total_trucks: usize, max_alerts: usize) -> Self {
        Self {
            timestamp,
            total_trucks,
            max_alerts,
            trucks_healthy: 0,
            trucks_warning: 0,
            trucks_critical: 0,
            trucks_offline: 0,
            critical_alerts: Vec::new(),
            warning_alerts: Vec::new(),
            sensor_coverage: HashMap::new(),
            trucks_by_status: HashMap::new(),
        }
    }

    fn add(&mut self, monitored: Vec<String>, status: TruckHealthStatus) {
        let bucket = bucket_for(status.overall_status);
        match bucket {
            OverallStatus::Healthy => self.trucks_healthy += 1,
            OverallStatus::Warning => self.trucks_warning += 1,
            OverallStatus::Critical => self.trucks_critical += 1,
            OverallStatus::Offline | OverallStatus::Unknown => self.trucks_offline += 1,
        }
        self.trucks_by_status
            .entry(bucket)
            .or_default()
            .push(status.truck_id.clone());

        for sensor in monitored {
            *self.sensor_coverage.entry(sensor).or_insert(0) += 1;
        }

        for alert in status.active_alerts {
            match alert.severity {
                Severity::Critical => self.critical_alerts.push(alert),
                Severity::Warning => self.warning_alerts.push(alert),
                Severity::Watch | Severity::Info => {}
            }
        }
    }

    fn finish(mut self) -> FleetHealthSummary {
        for alerts in [&mut self.critical_alerts, &mut self.warning_alerts] {
            alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            alerts.truncate(self.max_alerts);
        }

        FleetHealthSummary {
            timestamp: self.timestamp,
            total_trucks: self.total_trucks,
            trucks_healthy: self.trucks_healthy,
            trucks_warning: self.trucks_warning,
            trucks_critical: self.trucks_critical,
            trucks_offline: self.trucks_offline,
            critical_alerts: self.critical_alerts,
            warning_alerts: self.warning_alerts,
            sensor_coverage: self.sensor_coverage,
            trucks_by_status: self.trucks_by_status,
        }
    }
}
