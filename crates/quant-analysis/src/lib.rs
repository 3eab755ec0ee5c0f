use analysis_core::stats::{mean, simple_returns, std_dev};
use analysis_core::{PriceMatrix, RiskMetric};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS: f64 = 252.0;

/// Minimum observed prices before a symbol is ranked.
pub const MIN_OBSERVATIONS: usize = 300;

/// Ranked slices of the risk table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopStocks {
    pub top_10: Vec<RiskMetric>,
    pub top_5: Vec<RiskMetric>,
    pub all_ranked: Vec<RiskMetric>,
}

pub struct RiskMetricsEngine;

impl RiskMetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Annualized return, volatility and Sharpe for one price history.
    ///
    /// The mean daily return is compounded over a trading year and the daily
    /// sample deviation scaled by sqrt(252). Sharpe has no risk-free leg and
    /// is 0 when volatility is 0.
    pub fn metric_for(&self, symbol: &str, prices: &[f64]) -> Option<RiskMetric> {
        if prices.len() < MIN_OBSERVATIONS {
            tracing::debug!(
                "Skipping {}: {} prices below floor of {}",
                symbol,
                prices.len(),
                MIN_OBSERVATIONS
            );
            return None;
        }

        let returns = simple_returns(prices);
        if returns.len() < 2 {
            return None;
        }

        let mean_return = mean(&returns);
        let daily_vol = std_dev(&returns);

        let annualized_return = (1.0 + mean_return).powf(TRADING_DAYS) - 1.0;
        let annualized_volatility = daily_vol * TRADING_DAYS.sqrt();
        let sharpe_ratio = if annualized_volatility != 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        Some(RiskMetric {
            symbol: symbol.to_string(),
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
        })
    }

    /// Risk metrics for every eligible symbol, best Sharpe first.
    ///
    /// Symbols are evaluated in parallel; results keep matrix column order
    /// before the stable sort so exact ties stay in input order.
    pub fn compute_all(&self, matrix: &PriceMatrix) -> Vec<RiskMetric> {
        if matrix.is_empty() {
            return Vec::new();
        }

        let mut metrics: Vec<RiskMetric> = matrix
            .symbols()
            .par_iter()
            .filter_map(|symbol| {
                let series = market_data::extract(matrix, symbol);
                self.metric_for(symbol, &series.prices())
            })
            .collect();

        metrics.sort_by(|a, b| {
            b.sharpe_ratio
                .partial_cmp(&a.sharpe_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            "Ranked {} of {} symbols by Sharpe",
            metrics.len(),
            matrix.symbols().len()
        );
        metrics
    }

    /// Top-10 / top-5 / full ranking bundle.
    pub fn top_stocks(&self, matrix: &PriceMatrix) -> TopStocks {
        let all_ranked = self.compute_all(matrix);
        TopStocks {
            top_10: all_ranked.iter().take(10).cloned().collect(),
            top_5: all_ranked.iter().take(5).cloned().collect(),
            all_ranked,
        }
    }
}

impl Default for RiskMetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
