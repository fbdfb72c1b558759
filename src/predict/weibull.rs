use thiserror::Error;

/// Uncensored samples required before the survival sub-model fits.
pub const MIN_SURVIVAL_SAMPLES: usize = 3;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-10;
const SHAPE_MIN: f64 = 1e-3;
const SHAPE_MAX: f64 = 100.0;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("not enough samples: got {got}, need {need}")]
    NotEnoughSamples { got: usize, need: usize },
    #[error("samples must be positive and finite")]
    InvalidSamples,
    #[error("model fit did not converge")]
    NonConvergent,
}

/// Two-parameter Weibull distribution fitted by maximum likelihood.
#[derive(Debug, Clone, Copy)]
pub struct WeibullFit {
    pub shape: f64,
    pub scale: f64,
}

impl WeibullFit {
    /// Fits shape and scale to uncensored time-to-failure samples via the
    /// profile-likelihood equation for the shape, solved by Newton
    /// iteration seeded at the catalog prior. Degenerate inputs (identical
    /// samples push the shape to infinity) surface as `NonConvergent`.
    pub fn fit(samples: &[f64], shape_seed: f64) -> Result<Self, FitError> {
        if samples.len() < MIN_SURVIVAL_SAMPLES {
            return Err(FitError::NotEnoughSamples {
                got: samples.len(),
                need: MIN_SURVIVAL_SAMPLES,
            });
        }
        if samples.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(FitError::InvalidSamples);
        }

        let n = samples.len() as f64;
        let log_samples: Vec<f64> = samples.iter().map(|t| t.ln()).collect();
        let mean_log = log_samples.iter().sum::<f64>() / n;

        let mut shape = shape_seed.clamp(0.1, 10.0);
        let mut converged = false;

        for _ in 0..MAX_ITERATIONS {
            let mut s0 = 0.0;
            let mut s1 = 0.0;
            let mut s2 = 0.0;
            for (t, log_t) in samples.iter().zip(&log_samples) {
                let weighted = t.powf(shape);
                s0 += weighted;
                s1 += weighted * log_t;
                s2 += weighted * log_t * log_t;
            }

            let objective = s1 / s0 - 1.0 / shape - mean_log;
            let derivative = (s2 * s0 - s1 * s1) / (s0 * s0) + 1.0 / (shape * shape);
            if derivative.abs() < f64::EPSILON {
                return Err(FitError::NonConvergent);
            }

            let next = shape - objective / derivative;
            if !next.is_finite() || next <= SHAPE_MIN || next >= SHAPE_MAX {
                return Err(FitError::NonConvergent);
            }

            if (next - shape).abs() < TOLERANCE {
                shape = next;
                converged = true;
                break;
            }
            shape = next;
        }

        if !converged {
            return Err(FitError::NonConvergent);
        }

        let s0: f64 = samples.iter().map(|t| t.powf(shape)).sum();
        let scale = (s0 / n).powf(1.0 / shape);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(FitError::NonConvergent);
        }

        Ok(Self { shape, scale })
    }

    /// Probability the component has not yet failed by time `t`.
    /// `R(0) = 1`, non-increasing in `t`.
    pub fn reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        (-(t / self.scale).powf(self.shape)).exp()
    }

    /// Remaining life until reliability drops to `target_reliability`
    /// (0.5 = median life), measured from `current_age`. Clamped at zero
    /// for components already past the target.
    pub fn predict_ttf(&self, current_age: f64, target_reliability: f64) -> f64 {
        let total_life = self.scale * (-target_reliability.ln()).powf(1.0 / self.shape);
        (total_life - current_age).max(0.0)
    }

    /// Expected life `η·Γ(1 + 1/β)`.
    pub fn mean_life(&self) -> f64 {
        self.scale * gamma(1.0 + 1.0 / self.shape)
    }
}

// Lanczos approximation, g = 7, n = 9. Accurate to ~15 significant digits
// for the argument range seen here (1 < x < 2).
fn gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        return std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let mut accumulator = COEFFICIENTS[0];
    for (index, coefficient) in COEFFICIENTS.iter().enumerate().skip(1) {
        accumulator += coefficient / (x + index as f64);
    }
    let t = x + 7.5;
    (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * accumulator
}

#[cfg(test)]
mod tests {
    use super::{FitError, WeibullFit, MIN_SURVIVAL_SAMPLES};

    const SAMPLES: [f64; 5] = [5000.0, 6000.0, 7000.0, 8000.0, 9000.0];

    #[test]
    fn reliability_starts_at_one_and_never_increases() {
        let fit = WeibullFit::fit(&SAMPLES, 2.1).expect("fit should converge");

        assert!((fit.reliability(0.0) - 1.0).abs() < 1e-12);
        let mut previous = 1.0;
        for step in 1..50 {
            let current = fit.reliability(step as f64 * 400.0);
            assert!(current <= previous + 1e-12);
            previous = current;
        }
    }

    #[test]
    fn remaining_life_at_characteristic_life_is_zero() {
        let fit = WeibullFit::fit(&SAMPLES, 2.1).expect("fit should converge");
        // R(eta) = e^-1 by construction, so the remaining life at age eta
        // with that target reliability is exactly zero.
        let target = (-1.0f64).exp();
        let remaining = fit.predict_ttf(fit.scale, target);
        assert!(remaining.abs() < 1e-6);
    }

    #[test]
    fn median_remaining_life_is_positive_and_below_mean_life() {
        let fit = WeibullFit::fit(&SAMPLES, 2.1).expect("fit should converge");
        let remaining = fit.predict_ttf(4000.0, 0.5);

        assert!(remaining > 0.0);
        assert!(remaining < fit.mean_life());
    }

    #[test]
    fn fitted_scale_sits_within_the_sample_range() {
        let fit = WeibullFit::fit(&SAMPLES, 2.1).expect("fit should converge");
        assert!(fit.scale > 5000.0 && fit.scale < 9000.0);
        // Spread-out samples around 7000 h imply a wear-out shape.
        assert!(fit.shape > 1.0);
    }

    #[test]
    fn too_few_samples_are_rejected() {
        let result = WeibullFit::fit(&[5000.0, 6000.0], 2.0);
        assert!(matches!(
            result,
            Err(FitError::NotEnoughSamples { got: 2, need }) if need == MIN_SURVIVAL_SAMPLES
        ));
    }

    #[test]
    fn identical_samples_do_not_converge() {
        let result = WeibullFit::fit(&[7000.0, 7000.0, 7000.0, 7000.0], 2.0);
        assert!(matches!(result, Err(FitError::NonConvergent)));
    }

    #[test]
    fn non_positive_samples_are_rejected() {
        let result = WeibullFit::fit(&[5000.0, -1.0, 7000.0], 2.0);
        assert!(matches!(result, Err(FitError::InvalidSamples)));
    }
}
