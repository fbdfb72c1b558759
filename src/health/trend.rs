use crate::baseline::SensorBaseline;
use crate::catalog::{Direction, SensorRule};
use crate::telemetry::SensorSample;

use super::model::TrendDirection;

/// History points required before the monotonic-run rule applies.
pub(crate) const MIN_HISTORY_POINTS: usize = 10;

/// Length of the monotonic run that raises a trend alert. A coarse
/// substitute for formal SPC run rules.
pub(crate) const RUN_LENGTH: usize = 6;

const MEAN_EPSILON: f64 = 1e-6;

/// Classifies the deviation of `value` from the 30-day mean against the
/// sensor's trend thresholds. Returns the direction and the signed percent
/// deviation, or `None` when the baseline carries no usable statistics.
pub(crate) fn classify_trend(
    rule: &SensorRule,
    value: f64,
    baseline: &SensorBaseline,
) -> Option<(TrendDirection, f64)> {
    if !baseline.has_statistics() || baseline.mean_30d.abs() < MEAN_EPSILON {
        return None;
    }

    let deviation_pct = (value - baseline.mean_30d) / baseline.mean_30d.abs() * 100.0;
    let direction = if deviation_pct >= rule.trend_critical_pct {
        TrendDirection::RisingCritical
    } else if deviation_pct >= rule.trend_warning_pct {
        TrendDirection::Rising
    } else if deviation_pct <= -rule.trend_critical_pct {
        TrendDirection::FallingCritical
    } else if deviation_pct <= -rule.trend_warning_pct {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };

    Some((direction, deviation_pct))
}

/// Whether a trend moves in the sensor's bad direction.
pub(crate) fn is_adverse(direction: Direction, trend: TrendDirection) -> bool {
    match direction {
        Direction::High => matches!(
            trend,
            TrendDirection::Rising | TrendDirection::RisingCritical
        ),
        Direction::Low => matches!(
            trend,
            TrendDirection::Falling | TrendDirection::FallingCritical
        ),
    }
}

/// Checks the last `RUN_LENGTH` readings for a strictly monotonic move in
/// the sensor's bad direction. Requires at least `MIN_HISTORY_POINTS`
/// samples, pre-sorted ascending by timestamp (caller precondition).
/// Returns the magnitude of change over the run.
pub(crate) fn monotonic_run(rule: &SensorRule, history: &[SensorSample]) -> Option<f64> {
    if history.len() < MIN_HISTORY_POINTS {
        return None;
    }

    let tail = &history[history.len() - RUN_LENGTH..];
    let monotonic = tail.windows(2).all(|pair| match rule.direction {
        Direction::High => pair[1].value > pair[0].value,
        Direction::Low => pair[1].value < pair[0].value,
    });
    if !monotonic {
        return None;
    }

    Some((tail[RUN_LENGTH - 1].value - tail[0].value).abs())
}
