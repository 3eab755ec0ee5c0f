//! Non-seasonal autoregressive model on log-returns.
//!
//! Coefficients come from the Yule-Walker equations solved with the
//! Levinson-Durbin recursion; the order is picked by AIC.

use analysis_core::AnalysisError;

/// Highest AR order considered by [`ArModel::fit_auto`].
pub const MAX_AR_ORDER: usize = 5;

#[derive(Debug, Clone)]
pub struct ArModel {
    order: usize,
    mean: f64,
    coeffs: Vec<f64>,
    sigma2: f64,
    aic: f64,
    /// Most recent `order` observations, oldest first
    recent: Vec<f64>,
}

impl ArModel {
    /// Fit AR(0..=p_max) and keep the lowest-AIC model. `p_max` shrinks with
    /// short samples so a single observation still yields a mean model.
    pub fn fit_auto(data: &[f64]) -> Result<Self, AnalysisError> {
        validate(data)?;
        let max_order = MAX_AR_ORDER.min((data.len() - 1) / 3);

        let autocov = autocovariance(data, max_order);
        let mut best: Option<ArModel> = None;
        for order in 0..=max_order {
            let model = Self::from_autocov(data, &autocov, order);
            if best.as_ref().map_or(true, |b| model.aic < b.aic) {
                best = Some(model);
            }
        }

        best.ok_or_else(|| AnalysisError::ModelFit("no AR order could be fitted".to_string()))
    }

    /// Fit a fixed-order AR model.
    pub fn fit(data: &[f64], order: usize) -> Result<Self, AnalysisError> {
        validate(data)?;
        if order >= data.len() {
            return Err(AnalysisError::InsufficientHistory {
                symbol: String::new(),
                required: order + 1,
                actual: data.len(),
            });
        }
        let autocov = autocovariance(data, order);
        Ok(Self::from_autocov(data, &autocov, order))
    }

    fn from_autocov(data: &[f64], autocov: &[f64], order: usize) -> Self {
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let (coeffs, sigma2) = levinson_durbin(&autocov[..=order], order);
        let aic = n as f64 * sigma2.max(f64::MIN_POSITIVE).ln() + 2.0 * (order + 1) as f64;

        Self {
            order,
            mean,
            coeffs,
            sigma2,
            aic,
            recent: data[n - order..].to_vec(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn innovation_variance(&self) -> f64 {
        self.sigma2
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Iterated multi-step point forecast.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut window = self.recent.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let mut next = self.mean;
            for (j, phi) in self.coeffs.iter().enumerate() {
                next += phi * (window[window.len() - 1 - j] - self.mean);
            }
            out.push(next);
            window.push(next);
        }

        out
    }
}

fn validate(data: &[f64]) -> Result<(), AnalysisError> {
    if data.is_empty() {
        return Err(AnalysisError::ModelFit("empty return series".to_string()));
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(AnalysisError::ModelFit(
            "return series contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Biased sample autocovariances for lags 0..=max_lag.
fn autocovariance(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    let mean = data.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

    (0..=max_lag)
        .map(|k| {
            if k >= n {
                return 0.0;
            }
            centered[k..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

/// Solve Yule-Walker for `order` coefficients. Returns the coefficients and
/// the innovation variance.
fn levinson_durbin(autocov: &[f64], order: usize) -> (Vec<f64>, f64) {
    let mut coeffs = vec![0.0; order];
    let mut error = autocov[0];
    if order == 0 || error.abs() < 1e-300 {
        return (coeffs, error.max(0.0));
    }

    for k in 0..order {
        let mut acc = autocov[k + 1];
        for j in 0..k {
            acc -= coeffs[j] * autocov[k - j];
        }
        if error.abs() < 1e-300 {
            break;
        }
        let reflection = acc / error;

        let previous = coeffs.clone();
        coeffs[k] = reflection;
        for j in 0..k {
            coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        error *= 1.0 - reflection * reflection;
    }

    (coeffs, error.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic AR(1) sample: x[t] = phi * x[t-1] + e[t]
    fn ar1_series(phi: f64, n: usize) -> Vec<f64> {
        let mut state: u64 = 42;
        let mut x = 0.0;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let e = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
                x = phi * x + e * 0.02;
                x
            })
            .collect()
    }

    #[test]
    fn test_recovers_ar1_coefficient() {
        let data = ar1_series(0.6, 2000);
        let model = ArModel::fit(&data, 1).unwrap();
        assert!((model.coefficients()[0] - 0.6).abs() < 0.08);
    }

    #[test]
    fn test_auto_order_picks_nonzero_for_ar_process() {
        let data = ar1_series(0.7, 1000);
        let model = ArModel::fit_auto(&data).unwrap();
        assert!(model.order() >= 1);
        assert!(model.order() <= MAX_AR_ORDER);
    }

    #[test]
    fn test_single_observation_is_mean_model() {
        let model = ArModel::fit_auto(&[0.05]).unwrap();
        assert_eq!(model.order(), 0);
        let f = model.forecast(3);
        assert_eq!(f, vec![0.05, 0.05, 0.05]);
    }

    #[test]
    fn test_constant_series_is_mean_model() {
        let model = ArModel::fit_auto(&[0.01; 40]).unwrap();
        assert_eq!(model.order(), 0);
        assert!(model.forecast(5).iter().all(|v| (v - 0.01).abs() < 1e-15));
    }

    #[test]
    fn test_forecast_reverts_to_mean() {
        let data = ar1_series(0.5, 500);
        let model = ArModel::fit(&data, 1).unwrap();
        let f = model.forecast(50);
        assert_eq!(f.len(), 50);
        assert!((f[49] - model.mean()).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(ArModel::fit_auto(&[0.1, f64::NAN]).is_err());
        assert!(ArModel::fit_auto(&[]).is_err());
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let data = ar1_series(0.3, 300);
        let model = ArModel::fit_auto(&data).unwrap();
        assert_eq!(model.forecast(10), model.forecast(10));
    }
}
