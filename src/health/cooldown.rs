use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::model::{AlertCategory, HealthAlert, Severity};

type CooldownKey = (String, AlertCategory, String);

/// Per-analyzer alert deduplication state. A critical alert is always kept
/// and refreshes its key; a non-critical alert is kept only when its key is
/// unseen or the cooldown has elapsed since the last kept alert.
#[derive(Debug, Default)]
pub struct AlertCooldown {
    last_sent: HashMap<CooldownKey, DateTime<Utc>>,
}

impl AlertCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn should_send(
        &mut self,
        alert: &HealthAlert,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let key = (
            alert.truck_id.clone(),
            alert.category,
            alert.sensor_name.clone(),
        );

        if alert.severity == Severity::Critical {
            self.last_sent.insert(key, now);
            return true;
        }

        match self.last_sent.get(&key) {
            Some(last) if now.signed_duration_since(*last) <= cooldown => false,
            _ => {
                self.last_sent.insert(key, now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::health::model::{AlertCategory, HealthAlert, Severity};

    use super::AlertCooldown;

    fn alert(severity: Severity) -> HealthAlert {
        HealthAlert {
            truck_id: "T-1".to_string(),
            category: AlertCategory::OilPressure,
            severity,
            sensor_name: "oil_pressure_psi".to_string(),
            current_value: 18.0,
            threshold_value: 20.0,
            baseline_value: None,
            trend_direction: None,
            message: "oil pressure low".to_string(),
            recommended_action: "stop".to_string(),
            timestamp: Utc::now(),
            active: true,
        }
    }

    #[test]
    fn repeated_warning_within_cooldown_is_suppressed() {
        let mut cooldown = AlertCooldown::new();
        let window = Duration::minutes(30);
        let start = Utc::now();

        assert!(cooldown.should_send(&alert(Severity::Warning), window, start));
        assert!(!cooldown.should_send(
            &alert(Severity::Warning),
            window,
            start + Duration::minutes(5)
        ));
        assert!(cooldown.should_send(
            &alert(Severity::Warning),
            window,
            start + Duration::minutes(31)
        ));
    }

    #[test]
    fn critical_alerts_are_never_suppressed() {
        let mut cooldown = AlertCooldown::new();
        let window = Duration::minutes(30);
        let start = Utc::now();

        for minute in 0..5 {
            assert!(cooldown.should_send(
                &alert(Severity::Critical),
                window,
                start + Duration::minutes(minute)
            ));
        }
    }

    #[test]
    fn critical_refreshes_the_cooldown_for_its_key() {
        let mut cooldown = AlertCooldown::new();
        let window = Duration::minutes(30);
        let start = Utc::now();

        assert!(cooldown.should_send(&alert(Severity::Critical), window, start));
        // The warning arrives 10 minutes later under the same key and is
        // still inside the window refreshed by the critical alert.
        assert!(!cooldown.should_send(
            &alert(Severity::Warning),
            window,
            start + Duration::minutes(10)
        ));
    }

    #[test]
    fn distinct_keys_do_not_share_cooldown() {
        let mut cooldown = AlertCooldown::new();
        let window = Duration::minutes(30);
        let now = Utc::now();

        let mut other = alert(Severity::Warning);
        other.sensor_name = "coolant_temp_f".to_string();
        other.category = AlertCategory::CoolantTemp;

        assert!(cooldown.should_send(&alert(Severity::Warning), window, now));
        assert!(cooldown.should_send(&other, window, now));
    }
}
