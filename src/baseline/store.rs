use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SensorBaseline;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("baseline store backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("baseline store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence collaborator for baselines. Injected into the
/// `BaselineService` so tests can substitute a fresh store per case.
pub trait BaselineStore: Send + Sync {
    fn load_baselines(
        &self,
        truck_id: &str,
        max_age_days: i64,
    ) -> Result<Vec<SensorBaseline>, StoreError>;

    fn upsert_baseline(&self, baseline: &SensorBaseline) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBaseline {
    truck_id: String,
    sensor_name: String,
    mean_7d: f64,
    std_7d: f64,
    mean_30d: f64,
    std_30d: f64,
    min_30d: f64,
    max_30d: f64,
    sample_count: u64,
    last_updated_utc: String,
}

impl StoredBaseline {
    fn from_baseline(baseline: &SensorBaseline) -> Self {
        Self {
            truck_id: baseline.truck_id.clone(),
            sensor_name: baseline.sensor_name.clone(),
            mean_7d: baseline.mean_7d,
            std_7d: baseline.std_7d,
            mean_30d: baseline.mean_30d,
            std_30d: baseline.std_30d,
            min_30d: baseline.min_30d,
            max_30d: baseline.max_30d,
            sample_count: baseline.sample_count,
            last_updated_utc: baseline.last_updated.to_rfc3339(),
        }
    }

    fn into_baseline(self) -> Option<SensorBaseline> {
        let last_updated = DateTime::parse_from_rfc3339(&self.last_updated_utc)
            .ok()?
            .with_timezone(&Utc);
        Some(SensorBaseline {
            truck_id: self.truck_id,
            sensor_name: self.sensor_name,
            mean_7d: self.mean_7d,
            std_7d: self.std_7d,
            mean_30d: self.mean_30d,
            std_30d: self.std_30d,
            min_30d: self.min_30d,
            max_30d: self.max_30d,
            sample_count: self.sample_count,
            last_updated,
        })
    }
}

/// Sled-backed store: one tree, keys `truck_id/sensor_name`, JSON payloads.
#[derive(Clone)]
pub struct SledBaselineStore {
    baselines: sled::Tree,
}

impl SledBaselineStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let baselines = db.open_tree("baselines")?;
        Ok(Self { baselines })
    }

    fn key(truck_id: &str, sensor_name: &str) -> Vec<u8> {
        format!("{truck_id}/{sensor_name}").into_bytes()
    }
}

impl BaselineStore for SledBaselineStore {
    fn load_baselines(
        &self,
        truck_id: &str,
        max_age_days: i64,
    ) -> Result<Vec<SensorBaseline>, StoreError> {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        let prefix = format!("{truck_id}/");

        let mut result = Vec::new();
        for item in self.baselines.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let Ok(stored) = serde_json::from_slice::<StoredBaseline>(&value) else {
                continue;
            };
            let Some(baseline) = stored.into_baseline() else {
                continue;
            };
            if baseline.last_updated >= cutoff {
                result.push(baseline);
            }
        }
        Ok(result)
    }

    fn upsert_baseline(&self, baseline: &SensorBaseline) -> Result<(), StoreError> {
        let key = Self::key(&baseline.truck_id, &baseline.sensor_name);
        let payload = serde_json::to_vec(&StoredBaseline::from_baseline(baseline))?;
        self.baselines.insert(key, payload)?;
        Ok(())
    }
}

/// In-memory store for tests and embedders that do not persist baselines.
#[derive(Default)]
pub struct MemoryBaselineStore {
    inner: Mutex<HashMap<(String, String), SensorBaseline>>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load_baselines(
        &self,
        truck_id: &str,
        max_age_days: i64,
    ) -> Result<Vec<SensorBaseline>, StoreError> {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        let inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(inner
            .iter()
            .filter(|((truck, _), baseline)| {
                truck == truck_id && baseline.last_updated >= cutoff
            })
            .map(|(_, baseline)| baseline.clone())
            .collect())
    }

    fn upsert_baseline(&self, baseline: &SensorBaseline) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.insert(
            (baseline.truck_id.clone(), baseline.sensor_name.clone()),
            baseline.clone(),
        );
        Ok(())
    }
}
