use crate::catalog::ForecastOrder;

use super::weibull::FitError;

/// Sensor-history points required before the forecast sub-model fits.
pub const MIN_FORECAST_POINTS: usize = 10;

/// Forecast horizon bound; one step is one operating hour.
pub const DEFAULT_HORIZON_HOURS: usize = 720;

const VARIANCE_EPSILON: f64 = 1e-12;

/// Low-order ARIMA(p, d, q) model fitted by conditional least squares
/// (Hannan-Rissanen: a long-AR pass supplies residual proxies, then one
/// regression estimates the AR and MA coefficients together).
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    order: ForecastOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    residual_std: f64,
    // State needed to continue the series: differenced tail, recent
    // residuals and the integration tail of the original series.
    diff_tail: Vec<f64>,
    residual_tail: Vec<f64>,
    integration_tail: Vec<f64>,
    last_observed: f64,
}

/// Point forecast with a sigma-scaled confidence band.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub values: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ArimaForecaster {
    pub fn fit(series: &[f64], order: ForecastOrder) -> Result<Self, FitError> {
        if series.len() < MIN_FORECAST_POINTS {
            return Err(FitError::NotEnoughSamples {
                got: series.len(),
                need: MIN_FORECAST_POINTS,
            });
        }
        if series.iter().any(|value| !value.is_finite()) {
            return Err(FitError::InvalidSamples);
        }

        let mut working = series.to_vec();
        let mut integration_tail = Vec::with_capacity(order.d);
        for _ in 0..order.d {
            let Some(last) = working.last().copied() else {
                return Err(FitError::NonConvergent);
            };
            integration_tail.push(last);
            working = working.windows(2).map(|pair| pair[1] - pair[0]).collect();
        }

        if working.len() <= order.p + order.q + 2 {
            return Err(FitError::NotEnoughSamples {
                got: series.len(),
                need: order.p + order.q + 2 + order.d + 1,
            });
        }

        let n = working.len() as f64;
        let mean = working.iter().sum::<f64>() / n;
        let variance = working
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / n;

        // A (near-)constant differenced series carries no AR/MA structure:
        // the model collapses to pure drift.
        if variance < VARIANCE_EPSILON {
            return Ok(Self {
                order,
                ar: Vec::new(),
                ma: Vec::new(),
                intercept: mean,
                residual_std: 0.0,
                diff_tail: working,
                residual_tail: Vec::new(),
                integration_tail,
                last_observed: *series.last().unwrap_or(&0.0),
            });
        }

        let residual_proxies = long_ar_residuals(&working)?;
        let (ar, ma, intercept, residual_std) =
            regress_arma(&working, &residual_proxies, order)?;

        let residual_tail = residual_proxies
            .iter()
            .rev()
            .take(order.q)
            .rev()
            .copied()
            .collect();

        Ok(Self {
            order,
            ar,
            ma,
            intercept,
            residual_std,
            diff_tail: working,
            residual_tail,
            integration_tail,
            last_observed: *series.last().unwrap_or(&0.0),
        })
    }

    /// Forecasts up to `horizon` steps ahead; the band is
    /// `±1.96·σ·√step`, widening with lead time.
    pub fn forecast(&self, horizon: usize) -> Forecast {
        let mut diffs = self.diff_tail.clone();
        let mut residuals = self.residual_tail.clone();
        let mut values = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        let mut tail = self.integration_tail.clone();
        let mut level = self.last_observed;

        for step in 1..=horizon {
            let mut next = self.intercept;
            for (lag, coefficient) in self.ar.iter().enumerate() {
                if let Some(past) = diffs.get(diffs.len().wrapping_sub(lag + 1)) {
                    next += coefficient * past;
                }
            }
            for (lag, coefficient) in self.ma.iter().enumerate() {
                if let Some(past) = residuals.get(residuals.len().wrapping_sub(lag + 1)) {
                    next += coefficient * past;
                }
            }
            diffs.push(next);
            // Future shocks are unknown and enter the recursion as zero.
            residuals.push(0.0);

            let integrated = integrate_step(next, &mut tail, &mut level, self.order.d);
            let band = 1.96 * self.residual_std * (step as f64).sqrt();
            values.push(integrated);
            lower.push(integrated - band);
            upper.push(integrated + band);
        }

        Forecast {
            values,
            lower,
            upper,
        }
    }

    /// First forecast step whose value crosses `threshold`, starting from
    /// the side the last observation sits on. Direction-agnostic: works for
    /// failure conditions of either polarity. `None` when the horizon is
    /// exhausted without a crossing.
    pub fn steps_to_threshold(&self, threshold: f64, horizon: usize) -> Option<usize> {
        let starts_above = self.last_observed >= threshold;
        let forecast = self.forecast(horizon);
        forecast
            .values
            .iter()
            .position(|value| (*value >= threshold) != starts_above)
            .map(|index| index + 1)
    }

    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }
}

fn integrate_step(diff_value: f64, tail: &mut [f64], level: &mut f64, d: usize) -> f64 {
    match d {
        0 => diff_value,
        1 => {
            *level += diff_value;
            *level
        }
        _ => {
            // d == 2: diff_value is the change of the first difference.
            tail[1] += diff_value;
            *level += tail[1];
            *level
        }
    }
}

/// Long autoregression used only to obtain residual proxies for the MA
/// regression. Order grows with the sample but stays small.
fn long_ar_residuals(series: &[f64]) -> Result<Vec<f64>, FitError> {
    let order = (series.len() / 4).clamp(1, 8);
    let rows = series.len() - order;

    let mut design = Vec::with_capacity(rows);
    let mut target = Vec::with_capacity(rows);
    for t in order..series.len() {
        let mut row = Vec::with_capacity(order + 1);
        row.push(1.0);
        for lag in 1..=order {
            row.push(series[t - lag]);
        }
        design.push(row);
        target.push(series[t]);
    }

    let coefficients = least_squares(&design, &target).ok_or(FitError::NonConvergent)?;

    let mut residuals = vec![0.0; order];
    for t in order..series.len() {
        let mut predicted = coefficients[0];
        for lag in 1..=order {
            predicted += coefficients[lag] * series[t - lag];
        }
        residuals.push(series[t] - predicted);
    }
    Ok(residuals)
}

type ArmaCoefficients = (Vec<f64>, Vec<f64>, f64, f64);

fn regress_arma(
    series: &[f64],
    residual_proxies: &[f64],
    order: ForecastOrder,
) -> Result<ArmaCoefficients, FitError> {
    let start = order.p.max(order.q).max(series.len() / 4);
    if series.len() <= start {
        return Err(FitError::NonConvergent);
    }

    let mut design = Vec::with_capacity(series.len() - start);
    let mut target = Vec::with_capacity(series.len() - start);
    for t in start..series.len() {
        let mut row = Vec::with_capacity(1 + order.p + order.q);
        row.push(1.0);
        for lag in 1..=order.p {
            row.push(series[t - lag]);
        }
        for lag in 1..=order.q {
            row.push(residual_proxies[t - lag]);
        }
        design.push(row);
        target.push(series[t]);
    }

    let coefficients = least_squares(&design, &target).ok_or(FitError::NonConvergent)?;
    let intercept = coefficients[0];
    let ar = coefficients[1..=order.p].to_vec();
    let ma = coefficients[1 + order.p..1 + order.p + order.q].to_vec();

    let mut squared_error = 0.0;
    for (row, observed) in design.iter().zip(&target) {
        let predicted: f64 = row
            .iter()
            .zip(&coefficients)
            .map(|(x, c)| x * c)
            .sum();
        squared_error += (observed - predicted).powi(2);
    }
    let residual_std = (squared_error / target.len() as f64).sqrt();
    if !residual_std.is_finite() {
        return Err(FitError::NonConvergent);
    }

    Ok((ar, ma, intercept, residual_std))
}

/// Ordinary least squares via the normal equations and Gaussian elimination
/// with partial pivoting. Returns `None` for a singular system.
fn least_squares(design: &[Vec<f64>], target: &[f64]) -> Option<Vec<f64>> {
    let columns = design.first()?.len();
    let mut normal = vec![vec![0.0; columns + 1]; columns];

    for (row, observed) in design.iter().zip(target) {
        for i in 0..columns {
            for j in 0..columns {
                normal[i][j] += row[i] * row[j];
            }
            normal[i][columns] += row[i] * observed;
        }
    }

    for pivot in 0..columns {
        let best = (pivot..columns).max_by(|a, b| {
            normal[*a][pivot]
                .abs()
                .partial_cmp(&normal[*b][pivot].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if normal[best][pivot].abs() < 1e-12 {
            return None;
        }
        normal.swap(pivot, best);

        for row in pivot + 1..columns {
            let factor = normal[row][pivot] / normal[pivot][pivot];
            for column in pivot..=columns {
                normal[row][column] -= factor * normal[pivot][column];
            }
        }
    }

    let mut solution = vec![0.0; columns];
    for pivot in (0..columns).rev() {
        let mut value = normal[pivot][columns];
        for column in pivot + 1..columns {
            value -= normal[pivot][column] * solution[column];
        }
        solution[pivot] = value / normal[pivot][pivot];
    }

    if solution.iter().any(|value| !value.is_finite()) {
        return None;
    }
    Some(solution)
}
