use std::collections::HashMap;

use crate::catalog::Catalog;

use super::model::{MaintenanceHint, SensorStatus, TrendDirection};
use super::trend::is_adverse;

/// Derives per-component maintenance hints from the sensor statuses and
/// trends computed during analysis. A component is flagged when any of its
/// sensors sits in Warning/Watch or is trending in its bad direction.
pub(crate) fn maintenance_hints(
    catalog: &Catalog,
    sensor_status: &HashMap<String, SensorStatus>,
    trends: &HashMap<String, TrendDirection>,
) -> Vec<MaintenanceHint> {
    let mut hints = Vec::new();

    for spec in &catalog.components {
        let mut sensors = vec![spec.primary_sensor.as_str()];
        if let Some(secondary) = &spec.secondary_sensor {
            sensors.push(secondary.as_str());
        }

        let worst = sensors
            .iter()
            .filter_map(|name| sensor_status.get(*name))
            .copied()
            .max()
            .unwrap_or(SensorStatus::Normal);

        let trending_adversely = sensors.iter().any(|name| {
            let Some(trend) = trends.get(*name) else {
                return false;
            };
            let Some(rule) = catalog.sensor(name) else {
                return false;
            };
            is_adverse(rule.direction, *trend)
        });

        if worst == SensorStatus::Normal && !trending_adversely {
            continue;
        }

        let recommendation = match worst {
            SensorStatus::Critical => format!("Urgent: {}", spec.maintenance_action),
            SensorStatus::Warning => spec.maintenance_action.clone(),
            SensorStatus::Watch | SensorStatus::Normal => {
                format!("Plan ahead: {}", spec.maintenance_action)
            }
        };

        hints.push(MaintenanceHint {
            component: spec.name.clone(),
            recommendation,
            cost_low: spec.cost_low,
            cost_high: spec.cost_high,
        });
    }

    hints
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::catalog::Catalog;
    use crate::health::model::{SensorStatus, TrendDirection};

    use super::maintenance_hints;

    #[test]
    fn warning_sensor_flags_its_component() {
        let catalog = Catalog::default();
        let status = HashMap::from([(
            "trans_temp_f".to_string(),
            SensorStatus::Warning,
        )]);

        let hints = maintenance_hints(&catalog, &status, &HashMap::new());
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].component, "transmission");
        assert!(hints[0].cost_low <= hints[0].cost_high);
    }

    #[test]
    fn adverse_trend_alone_flags_the_component() {
        let catalog = Catalog::default();
        let status = HashMap::from([(
            "coolant_temp_f".to_string(),
            SensorStatus::Normal,
        )]);
        let trends = HashMap::from([(
            "coolant_temp_f".to_string(),
            TrendDirection::Rising,
        )]);

        let hints = maintenance_hints(&catalog, &status, &trends);
        let components: Vec<&str> = hints.iter().map(|hint| hint.component.as_str()).collect();
        assert!(components.contains(&"water_pump"));
        assert!(hints
            .iter()
            .all(|hint| hint.recommendation.starts_with("Plan ahead")));
    }

    #[test]
    fn healthy_sensors_produce_no_hints() {
        let catalog = Catalog::default();
        let status = HashMap::from([
            ("oil_pressure_psi".to_string(), SensorStatus::Normal),
            ("coolant_temp_f".to_string(), SensorStatus::Normal),
        ]);

        assert!(maintenance_hints(&catalog, &status, &HashMap::new()).is_empty());
    }
}
