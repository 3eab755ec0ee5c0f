//! Zero-mean GARCH(1,1) volatility model.
//!
//! `sigma2[t] = omega + alpha * r[t-1]^2 + beta * sigma2[t-1]`
//!
//! omega is pinned by variance targeting (`v * (1 - alpha - beta)` with `v`
//! the mean squared return) and (alpha, beta) maximise the Gaussian
//! likelihood over a coarse grid followed by a local refinement.

use analysis_core::AnalysisError;

/// Below this many returns the likelihood surface is too flat to trust.
pub const MIN_RETURNS_FOR_MLE: usize = 10;

const DEFAULT_ALPHA: f64 = 0.10;
const DEFAULT_BETA: f64 = 0.85;
const MAX_PERSISTENCE: f64 = 0.999;

#[derive(Debug, Clone, PartialEq)]
pub struct GarchModel {
    omega: f64,
    alpha: f64,
    beta: f64,
    last_return: f64,
    last_variance: f64,
}

impl GarchModel {
    pub fn fit(returns: &[f64]) -> Result<Self, AnalysisError> {
        if returns.is_empty() {
            return Err(AnalysisError::ModelFit("GARCH: empty return series".to_string()));
        }
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(AnalysisError::ModelFit(
                "GARCH: return series contains NaN or infinite values".to_string(),
            ));
        }

        let target = returns.iter().map(|r| r * r).sum::<f64>() / returns.len() as f64;
        let (alpha, beta) = if returns.len() < MIN_RETURNS_FOR_MLE || target == 0.0 {
            (DEFAULT_ALPHA, DEFAULT_BETA)
        } else {
            Self::estimate(returns, target)?
        };

        let omega = target * (1.0 - alpha - beta);
        let last_variance = filter_variances(returns, omega, alpha, beta, target)
            .last()
            .copied()
            .unwrap_or(target);

        Ok(Self {
            omega,
            alpha,
            beta,
            last_return: returns[returns.len() - 1],
            last_variance,
        })
    }

    fn estimate(returns: &[f64], target: f64) -> Result<(f64, f64), AnalysisError> {
        let coarse = (1..=30)
            .flat_map(|a| (50..=98).map(move |b| (a as f64 * 0.01, b as f64 * 0.01)));
        let (coarse_alpha, coarse_beta, coarse_nll) = best_candidate(returns, target, coarse)
            .ok_or_else(|| {
                AnalysisError::ModelFit("GARCH: likelihood not finite on parameter grid".to_string())
            })?;

        let refine = (-10..=10).flat_map(|da| {
            (-10..=10).map(move |db| {
                (
                    coarse_alpha + da as f64 * 0.001,
                    coarse_beta + db as f64 * 0.001,
                )
            })
        });
        let (alpha, beta, nll) = match best_candidate(returns, target, refine) {
            Some(refined) if refined.2 < coarse_nll => refined,
            _ => (coarse_alpha, coarse_beta, coarse_nll),
        };
        tracing::debug!(
            "GARCH fit: alpha={:.4} beta={:.4} nll={:.4}",
            alpha,
            beta,
            nll
        );
        Ok((alpha, beta))
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Conditional variance forecasts for steps 1..=steps.
    pub fn variance_forecast(&self, steps: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(steps);
        if steps == 0 {
            return out;
        }

        let mut next = self.omega
            + self.alpha * self.last_return * self.last_return
            + self.beta * self.last_variance;
        out.push(next);
        for _ in 1..steps {
            next = self.omega + (self.alpha + self.beta) * next;
            out.push(next);
        }
        out
    }
}

/// In-sample conditional variances, seeded with the target variance.
fn filter_variances(returns: &[f64], omega: f64, alpha: f64, beta: f64, seed: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(returns.len());
    let mut sigma2 = seed;
    out.push(sigma2);
    for r in &returns[..returns.len() - 1] {
        sigma2 = omega + alpha * r * r + beta * sigma2;
        out.push(sigma2);
    }
    out
}

/// Lowest finite negative log-likelihood among admissible (alpha, beta).
fn best_candidate(
    returns: &[f64],
    target: f64,
    candidates: impl Iterator<Item = (f64, f64)>,
) -> Option<(f64, f64, f64)> {
    let mut best: Option<(f64, f64, f64)> = None;
    for (alpha, beta) in candidates {
        if alpha <= 0.0 || beta < 0.0 || alpha + beta >= MAX_PERSISTENCE {
            continue;
        }
        let nll = negative_log_likelihood(returns, alpha, beta, target);
        if nll.is_finite() && best.map_or(true, |(_, _, b)| nll < b) {
            best = Some((alpha, beta, nll));
        }
    }
    best
}

fn negative_log_likelihood(returns: &[f64], alpha: f64, beta: f64, target: f64) -> f64 {
    let omega = target * (1.0 - alpha - beta);
    filter_variances(returns, omega, alpha, beta, target)
        .iter()
        .zip(returns)
        .map(|(s2, r)| 0.5 * (s2.ln() + r * r / s2))
        .sum()
}
