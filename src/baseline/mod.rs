use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::telemetry::SensorSample;

mod store;

pub use store::{BaselineStore, MemoryBaselineStore, SledBaselineStore, StoreError};

/// A baseline older than this is treated as absent and must be recomputed.
pub const MAX_BASELINE_AGE_DAYS: i64 = 60;

const SHORT_WINDOW_DAYS: i64 = 7;
const LONG_WINDOW_DAYS: i64 = 30;

/// Rolling statistics for one (truck, sensor) pair. `sample_count` refers to
/// the 30-day window; a count of zero means no statistics are available and
/// the numeric fields must not be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorBaseline {
    pub truck_id: String,
    pub sensor_name: String,
    pub mean_7d: f64,
    pub std_7d: f64,
    pub mean_30d: f64,
    pub std_30d: f64,
    pub min_30d: f64,
    pub max_30d: f64,
    pub sample_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl SensorBaseline {
    pub fn has_statistics(&self) -> bool {
        self.sample_count > 0
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_updated) > Duration::days(MAX_BASELINE_AGE_DAYS)
    }
}

fn window_stats(samples: &[SensorSample], cutoff: DateTime<Utc>) -> (f64, f64, u64) {
    let values: Vec<f64> = samples
        .iter()
        .filter(|sample| sample.timestamp >= cutoff)
        .map(|sample| sample.value)
        .collect();
    if values.is_empty() {
        return (0.0, 0.0, 0);
    }

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    (mean, variance.sqrt(), values.len() as u64)
}

/// Computes a baseline over the 7- and 30-day windows ending at `now`.
/// Standard deviation is the population form. A window with no samples is
/// not an error; the result carries `sample_count = 0`.
pub fn compute_baseline(
    truck_id: &str,
    sensor_name: &str,
    samples: &[SensorSample],
    now: DateTime<Utc>,
) -> SensorBaseline {
    let (mean_7d, std_7d, _) = window_stats(samples, now - Duration::days(SHORT_WINDOW_DAYS));
    let (mean_30d, std_30d, sample_count) =
        window_stats(samples, now - Duration::days(LONG_WINDOW_DAYS));

    let cutoff_30d = now - Duration::days(LONG_WINDOW_DAYS);
    let mut min_30d = f64::INFINITY;
    let mut max_30d = f64::NEG_INFINITY;
    for sample in samples.iter().filter(|sample| sample.timestamp >= cutoff_30d) {
        min_30d = min_30d.min(sample.value);
        max_30d = max_30d.max(sample.value);
    }
    if sample_count == 0 {
        min_30d = 0.0;
        max_30d = 0.0;
    }

    SensorBaseline {
        truck_id: truck_id.to_string(),
        sensor_name: sensor_name.to_string(),
        mean_7d,
        std_7d,
        mean_30d,
        std_30d,
        min_30d,
        max_30d,
        sample_count,
        last_updated: now,
    }
}

/// Baseline Statistics Service: computes rolling per-sensor statistics and
/// keeps a per-truck in-memory cache in front of the persistence
/// collaborator. Store failures never propagate to the read path.
pub struct BaselineService<S: BaselineStore> {
    store: S,
    cache: Mutex<HashMap<String, HashMap<String, SensorBaseline>>>,
}

impl<S: BaselineStore> BaselineService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns all usable baselines for a truck, keyed by sensor name.
    /// Served from cache when present; otherwise loaded from the store,
    /// filtered to entries updated within the staleness horizon. A load
    /// failure degrades to an empty map.
    pub async fn load(&self, truck_id: &str) -> HashMap<String, SensorBaseline> {
        let now = Utc::now();

        {
            let cache = self.cache.lock().await;
            if let Some(baselines) = cache.get(truck_id) {
                return baselines
                    .iter()
                    .filter(|(_, baseline)| !baseline.is_stale(now))
                    .map(|(name, baseline)| (name.clone(), baseline.clone()))
                    .collect();
            }
        }

        let loaded = match self.store.load_baselines(truck_id, MAX_BASELINE_AGE_DAYS) {
            Ok(baselines) => baselines,
            Err(error) => {
                log::warn!(
                    "baseline_load_degraded truck={} error={}",
                    truck_id,
                    error
                );
                Vec::new()
            }
        };

        let by_sensor: HashMap<String, SensorBaseline> = loaded
            .into_iter()
            .filter(|baseline| !baseline.is_stale(now))
            .map(|baseline| (baseline.sensor_name.clone(), baseline))
            .collect();

        let mut cache = self.cache.lock().await;
        cache.insert(truck_id.to_string(), by_sensor.clone());
        by_sensor
    }

    /// Upserts each baseline to the store and refreshes the cache.
    /// Persistence is best-effort: a write failure is logged and the
    /// in-memory result stands.
    pub async fn save(&self, truck_id: &str, baselines: Vec<SensorBaseline>) {
        for baseline in &baselines {
            if let Err(error) = self.store.upsert_baseline(baseline) {
                log::warn!(
                    "baseline_store_write_failed truck={} sensor={} error={}",
                    truck_id,
                    baseline.sensor_name,
                    error
                );
            }
        }

        let mut cache = self.cache.lock().await;
        let entry = cache.entry(truck_id.to_string()).or_default();
        for baseline in baselines {
            entry.insert(baseline.sensor_name.clone(), baseline);
        }
    }

    /// Recomputes baselines from raw history and persists them.
    pub async fn recompute(
        &self,
        truck_id: &str,
        samples_by_sensor: &HashMap<String, Vec<SensorSample>>,
        now: DateTime<Utc>,
    ) -> HashMap<String, SensorBaseline> {
        let baselines: Vec<SensorBaseline> = samples_by_sensor
            .iter()
            .map(|(sensor_name, samples)| compute_baseline(truck_id, sensor_name, samples, now))
            .collect();

        self.save(truck_id, baselines.clone()).await;
        baselines
            .into_iter()
            .map(|baseline| (baseline.sensor_name.clone(), baseline))
            .collect()
    }
}
