use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::catalog::Catalog;
use crate::telemetry::SensorSample;

use super::{ComponentFailureHistory, FailurePredictor, FALLBACK_TTF_HOURS};

fn predictor() -> FailurePredictor {
    FailurePredictor::new(Arc::new(Catalog::default()))
}

fn sensor_series(values: &[f64]) -> Vec<SensorSample> {
    let start = Utc::now() - Duration::hours(values.len() as i64);
    values
        .iter()
        .enumerate()
        .map(|(index, value)| SensorSample {
            timestamp: start + Duration::hours(index as i64),
            value: *value,
        })
        .collect()
}

fn failure_history(
    component: &str,
    ttfs: &[f64],
    censored: &[bool],
    sensor_values: &[f64],
) -> ComponentFailureHistory {
    ComponentFailureHistory {
        component_name: component.to_string(),
        time_to_failures: ttfs.to_vec(),
        censored: censored.to_vec(),
        sensor_history: sensor_series(sensor_values),
    }
}

#[test]
fn survival_only_prediction_passes_through_with_full_weight() {
    let predictor = predictor();
    let history = failure_history(
        "engine",
        &[5000.0, 6000.0, 7000.0, 8000.0, 9000.0],
        &[false; 5],
        &[],
    );

    let prediction = predictor.predict(&history, 4000.0, None);

    let weibull = prediction.weibull_ttf.expect("survival model fitted");
    assert!(prediction.arima_ttf.is_none());
    assert_eq!(prediction.predicted_ttf_hours, weibull);
    assert_eq!(prediction.weight_weibull, 1.0);
    assert_eq!(prediction.weight_arima, 0.0);
    assert!(weibull > 0.0);
}

#[test]
fn censored_samples_are_excluded_before_the_fit() {
    let predictor = predictor();
    // Only two uncensored samples remain: below the minimum, so the
    // survival model is skipped entirely.
    let history = failure_history(
        "engine",
        &[5000.0, 6000.0, 7000.0, 8000.0],
        &[false, true, true, false],
        &[],
    );

    let prediction = predictor.predict(&history, 4000.0, None);
    assert!(prediction.weibull_ttf.is_none());
}

#[test]
fn forecast_only_prediction_passes_through_with_full_weight() {
    let predictor = predictor();
    // Coolant trending up toward the water pump failure threshold (230).
    let series: Vec<f64> = (0..24).map(|i| 195.0 + 1.0 * i as f64).collect();
    let history = failure_history("water_pump", &[], &[], &series);

    let prediction = predictor.predict(&history, 3000.0, None);

    let arima = prediction.arima_ttf.expect("forecast model fitted");
    assert!(prediction.weibull_ttf.is_none());
    assert_eq!(prediction.predicted_ttf_hours, arima);
    assert_eq!(prediction.weight_weibull, 0.0);
    assert_eq!(prediction.weight_arima, 1.0);
    // Placeholder survival figures when the survival model is absent.
    assert_eq!(prediction.reliability_at_current_age, 0.9);
    assert_eq!(prediction.probability_failure_30d, 0.1);
}

#[test]
fn both_models_combine_with_renormalized_catalog_weights() {
    let predictor = predictor();
    let series: Vec<f64> = (0..24).map(|i| 195.0 + 1.0 * i as f64).collect();
    let history = failure_history(
        "water_pump",
        &[7000.0, 8000.0, 9000.0, 10000.0],
        &[false; 4],
        &series,
    );

    let prediction = predictor.predict(&history, 3000.0, None);

    let weibull = prediction.weibull_ttf.expect("survival model fitted");
    let arima = prediction.arima_ttf.expect("forecast model fitted");
    // water_pump carries 0.5/0.5 base weights.
    assert!((prediction.weight_weibull - 0.5).abs() < 1e-9);
    assert!((prediction.weight_arima - 0.5).abs() < 1e-9);
    let expected = 0.5 * weibull + 0.5 * arima;
    assert!((prediction.predicted_ttf_hours - expected).abs() < 1e-9);
}

#[test]
fn no_usable_inputs_fall_back_to_the_default_estimate() {
    let predictor = predictor();
    let history = failure_history("engine", &[5000.0, 6000.0], &[false, false], &[]);

    let prediction = predictor.predict(&history, 1000.0, None);

    assert_eq!(prediction.predicted_ttf_hours, FALLBACK_TTF_HOURS);
    assert_eq!(prediction.weight_weibull, 0.0);
    assert_eq!(prediction.weight_arima, 0.0);
    assert_eq!(prediction.reliability_at_current_age, 0.9);
}

#[test]
fn confidence_band_is_twenty_percent_of_the_estimate() {
    let predictor = predictor();
    let history = failure_history(
        "engine",
        &[5000.0, 6000.0, 7000.0, 8000.0, 9000.0],
        &[false; 5],
        &[],
    );

    let prediction = predictor.predict(&history, 4000.0, None);
    let estimate = prediction.predicted_ttf_hours;
    assert!((prediction.confidence_lower - estimate * 0.8).abs() < 1e-9);
    assert!((prediction.confidence_upper - estimate * 1.2).abs() < 1e-9);
}

#[test]
fn failure_probability_is_a_valid_probability() {
    let predictor = predictor();
    let history = failure_history(
        "engine",
        &[5000.0, 6000.0, 7000.0, 8000.0, 9000.0],
        &[false; 5],
        &[],
    );

    let prediction = predictor.predict(&history, 4000.0, None);
    assert!(prediction.reliability_at_current_age > 0.0);
    assert!(prediction.reliability_at_current_age <= 1.0);
    assert!(prediction.probability_failure_30d >= 0.0);
    assert!(prediction.probability_failure_30d <= 1.0);
}

#[test]
fn recommendation_bands_follow_the_estimate() {
    let predictor = predictor();

    // Forecast-only setup where the crossing lands within a week.
    let near_failure: Vec<f64> = (0..24).map(|i| 225.0 + 0.2 * i as f64).collect();
    let history = failure_history("water_pump", &[], &[], &near_failure);
    let urgent = predictor.predict(&history, 8000.0, None);
    assert!(urgent.predicted_ttf_hours < 168.0);
    assert!(urgent.recommendation.contains("Immediate"));

    // Fallback estimate of 720 h sits in the 90-day band.
    let empty = failure_history("engine", &[], &[], &[]);
    let fallback = predictor.predict(&empty, 1000.0, None);
    assert!(fallback.recommendation.contains("90 days"));
}

#[test]
fn explicit_threshold_overrides_the_catalog_value() {
    let predictor = predictor();
    let series: Vec<f64> = (0..24).map(|i| 195.0 + 1.0 * i as f64).collect();
    let history = failure_history("water_pump", &[], &[], &series);

    let with_catalog = predictor.predict(&history, 3000.0, None);
    let with_override = predictor.predict(&history, 3000.0, Some(260.0));

    let catalog_ttf = with_catalog.arima_ttf.expect("catalog threshold crossing");
    let override_ttf = with_override.arima_ttf.expect("override threshold crossing");
    assert!(override_ttf > catalog_ttf);
}
