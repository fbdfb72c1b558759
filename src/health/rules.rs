use crate::catalog::{Direction, SensorRule};

use super::model::{SensorStatus, Severity};

/// Classifies a value against a sensor's static bands. A value exactly on a
/// cutoff belongs to the band on the critical side.
pub(crate) fn evaluate_band(rule: &SensorRule, value: f64) -> SensorStatus {
    match rule.direction {
        Direction::Low => {
            if value <= rule.critical {
                SensorStatus::Critical
            } else if value <= rule.warning {
                SensorStatus::Warning
            } else if value <= rule.watch {
                SensorStatus::Watch
            } else {
                SensorStatus::Normal
            }
        }
        Direction::High => {
            if value >= rule.critical {
                SensorStatus::Critical
            } else if value >= rule.warning {
                SensorStatus::Warning
            } else if value >= rule.watch {
                SensorStatus::Watch
            } else {
                SensorStatus::Normal
            }
        }
    }
}

pub(crate) fn band_threshold(rule: &SensorRule, status: SensorStatus) -> f64 {
    match status {
        SensorStatus::Critical => rule.critical,
        SensorStatus::Warning => rule.warning,
        SensorStatus::Watch | SensorStatus::Normal => rule.watch,
    }
}

pub(crate) fn band_action(rule: &SensorRule, status: SensorStatus) -> &str {
    match status {
        SensorStatus::Critical => &rule.action_critical,
        SensorStatus::Warning => &rule.action_warning,
        SensorStatus::Watch | SensorStatus::Normal => &rule.action_watch,
    }
}

pub(crate) fn severity_for(status: SensorStatus) -> Option<Severity> {
    match status {
        SensorStatus::Critical => Some(Severity::Critical),
        SensorStatus::Warning => Some(Severity::Warning),
        SensorStatus::Watch => Some(Severity::Watch),
        SensorStatus::Normal => None,
    }
}
