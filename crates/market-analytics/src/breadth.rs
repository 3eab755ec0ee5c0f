//! Market breadth
//!
//! Advancers versus decliners on the last trading day, overall and grouped
//! by sector prefix.

use analysis_core::stats::round_to;
use analysis_core::PriceMatrix;
use serde::{Deserialize, Serialize};

/// Sector bucket for symbols without a `_` prefix.
pub const OTHER_SECTOR: &str = "OTHER";

/// Last-day move of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub symbol: String,
    /// Last traded price
    pub ltp: f64,
    pub previous: f64,
    pub change: f64,
    /// Percent move, 0 when the previous price is 0
    pub pct_change: f64,
}

/// Advance/decline counts across all symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadth {
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
    /// `None` when there are no decliners
    pub advance_decline_ratio: Option<f64>,
}

/// Breadth within one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBreadth {
    pub sector: String,
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
    /// Mean percent move of the sector's symbols, 2 decimals
    pub average_move: f64,
}

/// Per-symbol change between the previous and last rows, in column order.
///
/// With a single row both rows coincide and every change is zero.
pub fn daily_changes(matrix: &PriceMatrix) -> Vec<DailyChange> {
    let (Some(last), Some(prev)) = (matrix.last_row(), matrix.previous_row()) else {
        return Vec::new();
    };

    matrix
        .symbols()
        .iter()
        .zip(last.prices.iter().zip(&prev.prices))
        .map(|(symbol, (&ltp, &previous))| {
            let change = ltp - previous;
            let pct_change = if previous != 0.0 {
                change / previous * 100.0
            } else {
                0.0
            };
            DailyChange {
                symbol: symbol.clone(),
                ltp,
                previous,
                change,
                pct_change,
            }
        })
        .collect()
}

/// Sector is the text before the first `_`, else [`OTHER_SECTOR`].
pub fn sector_of(symbol: &str) -> &str {
    match symbol.split_once('_') {
        Some((sector, _)) => sector,
        None => OTHER_SECTOR,
    }
}

pub fn breadth(matrix: &PriceMatrix) -> Option<Breadth> {
    if matrix.is_empty() {
        return None;
    }

    let changes = daily_changes(matrix);
    let advancers = changes.iter().filter(|c| c.change > 0.0).count();
    let decliners = changes.iter().filter(|c| c.change < 0.0).count();
    let unchanged = changes.len() - advancers - decliners;

    let advance_decline_ratio = if decliners != 0 {
        Some(advancers as f64 / decliners as f64)
    } else {
        None
    };

    Some(Breadth {
        advancers,
        decliners,
        unchanged,
        advance_decline_ratio,
    })
}

/// Sector breadth in order of each sector's first appearance.
pub fn sector_breadth(matrix: &PriceMatrix) -> Vec<SectorBreadth> {
    let mut sectors: Vec<(SectorBreadth, f64)> = Vec::new();

    for change in daily_changes(matrix) {
        let name = sector_of(&change.symbol);
        let idx = match sectors.iter().position(|(s, _)| s.sector == name) {
            Some(idx) => idx,
            None => {
                sectors.push((
                    SectorBreadth {
                        sector: name.to_string(),
                        advancers: 0,
                        decliners: 0,
                        unchanged: 0,
                        average_move: 0.0,
                    },
                    0.0,
                ));
                sectors.len() - 1
            }
        };

        let (stat, sum) = &mut sectors[idx];
        if change.pct_change > 0.0 {
            stat.advancers += 1;
        } else if change.pct_change < 0.0 {
            stat.decliners += 1;
        } else {
            stat.unchanged += 1;
        }
        *sum += change.pct_change;
    }

    sectors
        .into_iter()
        .map(|(mut stat, sum)| {
            let count = stat.advancers + stat.decliners + stat.unchanged;
            stat.average_move = if count > 0 {
                round_to(sum / count as f64, 2)
            } else {
                0.0
            };
            stat
        })
        .collect()
}
