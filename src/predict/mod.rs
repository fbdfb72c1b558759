mod ensemble;
mod forecast;
mod weibull;

pub use ensemble::{
    ComponentFailureHistory, FailurePrediction, FailurePredictor, FALLBACK_TTF_HOURS,
};
pub use forecast::{ArimaForecaster, Forecast, DEFAULT_HORIZON_HOURS, MIN_FORECAST_POINTS};
pub use weibull::{FitError, WeibullFit, MIN_SURVIVAL_SAMPLES};

#[cfg(test)]
mod tests;
