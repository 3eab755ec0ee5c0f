//! Seasonal autoregressive model on log-returns.
//!
//! `r[t] = c + sum(phi_i * r[t-i]) + Phi * r[t-period]`, estimated by least
//! squares. Candidate orders share one estimation window so their AIC values
//! are comparable.

use analysis_core::AnalysisError;
use nalgebra::{DMatrix, DVector};

pub const SEASONAL_PERIOD: usize = 12;
pub const MAX_SEASONAL_AR_ORDER: usize = 3;

/// Seasonal lag is only considered with at least this many full periods.
const MIN_SEASONAL_CYCLES: usize = 3;

/// A Cholesky pivot of the column-normalized design below this fraction of
/// the largest one means the regressors are collinear.
const COLLINEARITY_TOLERANCE: f64 = 1e-4;

/// Companion eigenvalues above this modulus make the recursion explosive.
/// Unit roots are kept so an exact seasonal cycle can still be repeated.
const MAX_ROOT_MODULUS: f64 = 1.0 + 1e-3;

#[derive(Debug, Clone)]
pub struct SeasonalArModel {
    order: usize,
    seasonal: bool,
    period: usize,
    intercept: f64,
    coeffs: Vec<f64>,
    seasonal_coeff: f64,
    sigma2: f64,
    aic: f64,
    /// Enough trailing observations to evaluate every lag, oldest first
    recent: Vec<f64>,
}

impl SeasonalArModel {
    /// Fit every (p, seasonal) candidate and keep the lowest AIC.
    pub fn fit_auto(data: &[f64]) -> Result<Self, AnalysisError> {
        Self::fit_auto_with_period(data, SEASONAL_PERIOD)
    }

    pub fn fit_auto_with_period(data: &[f64], period: usize) -> Result<Self, AnalysisError> {
        if data.is_empty() {
            return Err(AnalysisError::ModelFit("empty return series".to_string()));
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::ModelFit(
                "return series contains NaN or infinite values".to_string(),
            ));
        }

        let n = data.len();
        let allow_seasonal = period > 0 && n >= MIN_SEASONAL_CYCLES * period;
        let max_order = MAX_SEASONAL_AR_ORDER.min((n - 1) / 3);
        let window_start = if allow_seasonal {
            max_order.max(period)
        } else {
            max_order
        };

        let mut best: Option<SeasonalArModel> = None;
        let seasonal_options: &[bool] = if allow_seasonal { &[false, true] } else { &[false] };
        for &seasonal in seasonal_options {
            for order in 0..=max_order {
                let Some(model) = Self::fit_ols(data, order, seasonal, period, window_start) else {
                    continue;
                };
                if !model.is_stable() {
                    tracing::debug!(
                        "Seasonal AR({}{}) rejected: explosive coefficients",
                        order,
                        if seasonal { "+seasonal" } else { "" }
                    );
                    continue;
                }
                if best.as_ref().map_or(true, |b| model.aic < b.aic) {
                    best = Some(model);
                }
            }
        }

        best.ok_or_else(|| {
            AnalysisError::ModelFit("seasonal model: no candidate could be estimated".to_string())
        })
    }

    fn fit_ols(
        data: &[f64],
        order: usize,
        seasonal: bool,
        period: usize,
        window_start: usize,
    ) -> Option<Self> {
        let n = data.len();
        let n_eff = n.checked_sub(window_start)?;
        let k = 1 + order + usize::from(seasonal);
        if n_eff < k {
            return None;
        }

        let x = DMatrix::from_fn(n_eff, k, |row, col| {
            let t = window_start + row;
            match col {
                0 => 1.0,
                c if c <= order => data[t - c],
                _ => data[t - period],
            }
        });
        let y = DVector::from_iterator(n_eff, data[window_start..].iter().copied());

        // unit-norm columns keep the pivot test independent of return scale
        let norms: Vec<f64> = (0..k).map(|c| x.column(c).norm()).collect();
        if norms.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return None;
        }
        let scaled = DMatrix::from_fn(n_eff, k, |row, col| x[(row, col)] / norms[col]);

        let st = scaled.transpose();
        let chol = (&st * &scaled).cholesky()?;
        let diag = chol.l_dirty().diagonal();
        if diag.min() <= diag.max() * COLLINEARITY_TOLERANCE {
            return None;
        }
        let scaled_beta = chol.solve(&(&st * &y));
        let beta = DVector::from_fn(k, |i, _| scaled_beta[i] / norms[i]);
        if beta.iter().any(|b| !b.is_finite()) {
            return None;
        }

        let residuals = &y - &x * &beta;
        let sigma2 = residuals.norm_squared() / n_eff as f64;
        let aic = n_eff as f64 * sigma2.max(f64::MIN_POSITIVE).ln() + 2.0 * k as f64;

        let keep = if seasonal { order.max(period) } else { order };
        Some(Self {
            order,
            seasonal,
            period,
            intercept: beta[0],
            coeffs: (1..=order).map(|i| beta[i]).collect(),
            seasonal_coeff: if seasonal { beta[k - 1] } else { 0.0 },
            sigma2,
            aic,
            recent: data[n - keep..].to_vec(),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn uses_seasonal_lag(&self) -> bool {
        self.seasonal
    }

    pub fn seasonal_coefficient(&self) -> f64 {
        self.seasonal_coeff
    }

    pub fn innovation_variance(&self) -> f64 {
        self.sigma2
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Every eigenvalue of the lag companion matrix lies within
    /// [`MAX_ROOT_MODULUS`].
    pub fn is_stable(&self) -> bool {
        let lags = if self.seasonal {
            self.order.max(self.period)
        } else {
            self.order
        };
        if lags == 0 {
            return true;
        }

        let mut phi = vec![0.0; lags];
        for (i, c) in self.coeffs.iter().enumerate() {
            phi[i] += c;
        }
        if self.seasonal {
            phi[self.period - 1] += self.seasonal_coeff;
        }

        let companion = DMatrix::from_fn(lags, lags, |row, col| {
            if row == 0 {
                phi[col]
            } else if row == col + 1 {
                1.0
            } else {
                0.0
            }
        });
        companion
            .complex_eigenvalues()
            .iter()
            .all(|z| z.norm() <= MAX_ROOT_MODULUS)
    }

    /// Iterated multi-step point forecast.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut window = self.recent.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let len = window.len();
            let mut next = self.intercept;
            for (j, phi) in self.coeffs.iter().enumerate() {
                next += phi * window[len - 1 - j];
            }
            if self.seasonal {
                next += self.seasonal_coeff * window[len - self.period];
            }
            out.push(next);
            window.push(next);
        }

        out
    }
}
