use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One reading for one sensor. Transient; supplied by the telemetry
/// collaborator and never persisted by the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// The latest reading set for one truck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub truck_id: String,
    pub readings: HashMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl SensorSnapshot {
    pub fn new(
        truck_id: impl Into<String>,
        readings: HashMap<String, f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            truck_id: truck_id.into(),
            readings,
            timestamp,
        }
    }

    pub fn reading(&self, sensor_name: &str) -> Option<f64> {
        self.readings.get(sensor_name).copied()
    }
}

#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct TelemetryError {
    message: String,
}

impl TelemetryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Read-side collaborator supplying current and historical sensor data.
/// Implementations live outside the core; tests use the scripted mock below.
pub trait TelemetryProvider {
    async fn latest_snapshot(&self, truck_id: &str) -> Result<SensorSnapshot, TelemetryError>;

    /// Historical readings for one sensor, sorted ascending by timestamp.
    async fn history(
        &self,
        truck_id: &str,
        sensor_name: &str,
        days: u32,
    ) -> Result<Vec<SensorSample>, TelemetryError>;

    async fn fleet_snapshots(&self) -> Result<Vec<SensorSnapshot>, TelemetryError>;
}

/// Fetches one sensor's history with a caller-supplied timeout. Timeouts and
/// provider errors degrade to `None` so the caller falls back to
/// threshold-only evaluation instead of failing the scan.
pub async fn fetch_history_with_timeout<P: TelemetryProvider>(
    provider: &P,
    truck_id: &str,
    sensor_name: &str,
    days: u32,
    timeout: Duration,
) -> Option<Vec<SensorSample>> {
    match tokio::time::timeout(timeout, provider.history(truck_id, sensor_name, days)).await {
        Ok(Ok(samples)) => Some(samples),
        Ok(Err(error)) => {
            log::warn!(
                "telemetry_history_degraded truck={} sensor={} reason=provider_error error={}",
                truck_id,
                sensor_name,
                error
            );
            None
        }
        Err(_) => {
            log::warn!(
                "telemetry_history_degraded truck={} sensor={} reason=timeout timeout_ms={}",
                truck_id,
                sensor_name,
                timeout.as_millis()
            );
            None
        }
    }
}

#[cfg(test)]
pub(crate) struct MockTelemetryProvider {
    pub(crate) snapshots: Vec<SensorSnapshot>,
    pub(crate) history: HashMap<(String, String), Vec<SensorSample>>,
}

#[cfg(test)]
impl MockTelemetryProvider {
    pub(crate) fn new(snapshots: Vec<SensorSnapshot>) -> Self {
        Self {
            snapshots,
            history: HashMap::new(),
        }
    }

    pub(crate) fn with_history(
        mut self,
        truck_id: &str,
        sensor_name: &str,
        samples: Vec<SensorSample>,
    ) -> Self {
        self.history
            .insert((truck_id.to_string(), sensor_name.to_string()), samples);
        self
    }
}

#[cfg(test)]
impl TelemetryProvider for MockTelemetryProvider {
    async fn latest_snapshot(&self, truck_id: &str) -> Result<SensorSnapshot, TelemetryError> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.truck_id == truck_id)
            .cloned()
            .ok_or_else(|| TelemetryError::new(format!("no snapshot for truck {truck_id}")))
    }

    async fn history(
        &self,
        truck_id: &str,
        sensor_name: &str,
        _days: u32,
    ) -> Result<Vec<SensorSample>, TelemetryError> {
        Ok(self
            .history
            .get(&(truck_id.to_string(), sensor_name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn fleet_snapshots(&self) -> Result<Vec<SensorSnapshot>, TelemetryError> {
        Ok(self.snapshots.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::Utc;

    use super::{
        fetch_history_with_timeout, MockTelemetryProvider, SensorSample, SensorSnapshot,
        TelemetryProvider,
    };

    #[tokio::test]
    async fn mock_provider_returns_scripted_snapshot() {
        let snapshot = SensorSnapshot::new(
            "T-100",
            HashMap::from([("oil_pressure_psi".to_string(), 42.0)]),
            Utc::now(),
        );
        let provider = MockTelemetryProvider::new(vec![snapshot]);

        let fetched = provider
            .latest_snapshot("T-100")
            .await
            .expect("snapshot should exist");
        assert_eq!(fetched.reading("oil_pressure_psi"), Some(42.0));
        assert!(provider.latest_snapshot("T-999").await.is_err());
    }

    #[tokio::test]
    async fn history_fetch_returns_samples_within_timeout() {
        let provider = MockTelemetryProvider::new(Vec::new()).with_history(
            "T-100",
            "coolant_temp_f",
            vec![SensorSample {
                timestamp: Utc::now(),
                value: 195.0,
            }],
        );

        let samples = fetch_history_with_timeout(
            &provider,
            "T-100",
            "coolant_temp_f",
            30,
            Duration::from_secs(1),
        )
        .await
        .expect("history should be returned");
        assert_eq!(samples.len(), 1);
    }
}
