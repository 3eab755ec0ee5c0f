//! Short-term momentum ranking.

use analysis_core::stats::round_to;
use analysis_core::PriceMatrix;
use serde::{Deserialize, Serialize};

pub const SHORT_LOOKBACK: usize = 5;
pub const LONG_LOOKBACK: usize = 20;
pub const MOMENTUM_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumRow {
    pub symbol: String,
    pub pct_5d: f64,
    pub pct_20d: f64,
    /// `2 * pct_5d + pct_20d`
    pub momentum_score: f64,
}

impl MomentumRow {
    pub fn new(symbol: impl Into<String>, pct_5d: f64, pct_20d: f64) -> Self {
        Self {
            symbol: symbol.into(),
            pct_5d: round_to(pct_5d, 2),
            pct_20d: round_to(pct_20d, 2),
            momentum_score: round_to(2.0 * pct_5d + pct_20d, 2),
        }
    }
}

/// Percent change over the last `days` observations.
///
/// Needs strictly more than `days` prices and a non-zero base.
pub fn pct_change_over_days(prices: &[f64], days: usize) -> Option<f64> {
    if prices.len() <= days {
        return None;
    }
    let latest = prices[prices.len() - 1];
    let past = prices[prices.len() - 1 - days];
    analysis_core::stats::pct_change(past, latest)
}

/// Top symbols by momentum score, strongest first. Symbols without enough
/// history for both lookbacks are left out.
pub fn momentum(matrix: &PriceMatrix) -> Vec<MomentumRow> {
    let mut rows: Vec<MomentumRow> = matrix
        .symbols()
        .iter()
        .filter_map(|symbol| {
            let prices = market_data::extract(matrix, symbol).prices();
            let pct_5d = pct_change_over_days(&prices, SHORT_LOOKBACK)?;
            let pct_20d = pct_change_over_days(&prices, LONG_LOOKBACK)?;
            Some(MomentumRow::new(symbol.as_str(), pct_5d, pct_20d))
        })
        .collect();

    rows.sort_by(|a, b| {
        b.momentum_score
            .partial_cmp(&a.momentum_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(MOMENTUM_TOP_N);
    rows
}
