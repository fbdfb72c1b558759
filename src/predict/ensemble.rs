use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ComponentSpec, ForecastOrder};
use crate::telemetry::SensorSample;

use super::forecast::{ArimaForecaster, DEFAULT_HORIZON_HOURS, MIN_FORECAST_POINTS};
use super::weibull::{WeibullFit, MIN_SURVIVAL_SAMPLES};

/// Fallback estimate when neither sub-model produces one.
pub const FALLBACK_TTF_HOURS: f64 = 720.0;

const DEFAULT_RELIABILITY: f64 = 0.9;
const DEFAULT_FAILURE_PROBABILITY_30D: f64 = 0.1;
const CONFIDENCE_SPREAD: f64 = 0.2;

const IMMEDIATE_HOURS: f64 = 168.0;
const PLAN_HOURS: f64 = 720.0;
const MONITOR_HOURS: f64 = 2160.0;

/// Historical failure data for one component, supplied by a collaborator.
/// `censored[i] = true` marks a unit still in service; those samples are
/// excluded before the survival fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFailureHistory {
    pub component_name: String,
    pub time_to_failures: Vec<f64>,
    pub censored: Vec<bool>,
    pub sensor_history: Vec<SensorSample>,
}

/// Combined prediction for one (truck, component) query. Stateless; not
/// persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePrediction {
    pub component_name: String,
    pub predicted_ttf_hours: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub reliability_at_current_age: f64,
    pub probability_failure_30d: f64,
    pub weibull_ttf: Option<f64>,
    pub arima_ttf: Option<f64>,
    pub weight_weibull: f64,
    pub weight_arima: f64,
    pub recommendation: String,
}

/// Failure Prediction Ensemble: a Weibull survival model and an ARIMA-style
/// forecast combined by catalog weights. Sub-model failures drop that
/// contribution; the caller always receives a prediction.
pub struct FailurePredictor {
    catalog: Arc<Catalog>,
}

impl FailurePredictor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn predict(
        &self,
        history: &ComponentFailureHistory,
        current_age_hours: f64,
        failure_threshold: Option<f64>,
    ) -> FailurePrediction {
        let spec = self.catalog.component(&history.component_name);
        if spec.is_none() {
            log::warn!(
                "prediction_component_unknown component={}",
                history.component_name
            );
        }

        let (shape_prior, order, base_weibull, base_arima, catalog_threshold) = match spec {
            Some(spec) => (
                spec.weibull_shape_prior,
                spec.forecast_order,
                spec.weight_weibull,
                spec.weight_arima,
                spec.failure_threshold,
            ),
            None => (2.0, ForecastOrder { p: 1, d: 1, q: 1 }, 0.5, 0.5, 0.0),
        };
        let threshold = failure_threshold.unwrap_or(catalog_threshold);

        let survival = self.fit_survival(history, shape_prior);
        let weibull_ttf = survival
            .as_ref()
            .map(|fit| fit.predict_ttf(current_age_hours, 0.5));
        let arima_ttf = self.fit_forecast(history, order, threshold, spec);

        let (predicted_ttf_hours, weight_weibull, weight_arima) =
            combine(weibull_ttf, arima_ttf, base_weibull, base_arima);
        if weibull_ttf.is_none() && arima_ttf.is_none() {
            log::warn!(
                "prediction_fallback component={} fallback_hours={}",
                history.component_name,
                FALLBACK_TTF_HOURS
            );
        }

        let (reliability_at_current_age, probability_failure_30d) = match &survival {
            Some(fit) => {
                let now = fit.reliability(current_age_hours);
                let in_30d = fit.reliability(current_age_hours + 720.0);
                (now, (now - in_30d).clamp(0.0, 1.0))
            }
            None => (DEFAULT_RELIABILITY, DEFAULT_FAILURE_PROBABILITY_30D),
        };

        FailurePrediction {
            component_name: history.component_name.clone(),
            predicted_ttf_hours,
            // Heuristic spread, not a derived statistical interval.
            confidence_lower: predicted_ttf_hours * (1.0 - CONFIDENCE_SPREAD),
            confidence_upper: predicted_ttf_hours * (1.0 + CONFIDENCE_SPREAD),
            reliability_at_current_age,
            probability_failure_30d,
            weibull_ttf,
            arima_ttf,
            weight_weibull,
            weight_arima,
            recommendation: recommendation_for(predicted_ttf_hours).to_string(),
        }
    }

    fn fit_survival(
        &self,
        history: &ComponentFailureHistory,
        shape_prior: f64,
    ) -> Option<WeibullFit> {
        let uncensored: Vec<f64> = history
            .time_to_failures
            .iter()
            .enumerate()
            .filter(|(index, _)| !history.censored.get(*index).copied().unwrap_or(false))
            .map(|(_, ttf)| *ttf)
            .collect();

        if uncensored.len() < MIN_SURVIVAL_SAMPLES {
            log::debug!(
                "survival_model_skipped component={} uncensored={}",
                history.component_name,
                uncensored.len()
            );
            return None;
        }

        match WeibullFit::fit(&uncensored, shape_prior) {
            Ok(fit) => Some(fit),
            Err(error) => {
                log::debug!(
                    "survival_model_failed component={} error={}",
                    history.component_name,
                    error
                );
                None
            }
        }
    }

    fn fit_forecast(
        &self,
        history: &ComponentFailureHistory,
        order: ForecastOrder,
        threshold: f64,
        spec: Option<&ComponentSpec>,
    ) -> Option<f64> {
        if history.sensor_history.len() < MIN_FORECAST_POINTS || spec.is_none() {
            return None;
        }

        let series: Vec<f64> = history
            .sensor_history
            .iter()
            .map(|sample| sample.value)
            .collect();

        let model = match ArimaForecaster::fit(&series, order) {
            Ok(model) => model,
            Err(error) => {
                log::debug!(
                    "forecast_model_failed component={} error={}",
                    history.component_name,
                    error
                );
                return None;
            }
        };

        match model.steps_to_threshold(threshold, DEFAULT_HORIZON_HOURS) {
            Some(steps) => Some(steps as f64),
            None => {
                log::debug!(
                    "forecast_threshold_not_reached component={} horizon_hours={}",
                    history.component_name,
                    DEFAULT_HORIZON_HOURS
                );
                None
            }
        }
    }
}

fn combine(
    weibull_ttf: Option<f64>,
    arima_ttf: Option<f64>,
    base_weibull: f64,
    base_arima: f64,
) -> (f64, f64, f64) {
    match (weibull_ttf, arima_ttf) {
        (Some(weibull), Some(arima)) => {
            let total = base_weibull + base_arima;
            let weight_weibull = base_weibull / total;
            let weight_arima = base_arima / total;
            (
                weight_weibull * weibull + weight_arima * arima,
                weight_weibull,
                weight_arima,
            )
        }
        (Some(weibull), None) => (weibull, 1.0, 0.0),
        (None, Some(arima)) => (arima, 0.0, 1.0),
        (None, None) => (FALLBACK_TTF_HOURS, 0.0, 0.0),
    }
}

fn recommendation_for(predicted_ttf_hours: f64) -> &'static str {
    if predicted_ttf_hours < IMMEDIATE_HOURS {
        "Immediate action required: schedule service now"
    } else if predicted_ttf_hours < PLAN_HOURS {
        "Plan maintenance within 30 days"
    } else if predicted_ttf_hours < MONITOR_HOURS {
        "Monitor closely; schedule maintenance within 90 days"
    } else {
        "Component healthy; continue routine monitoring"
    }
}
