//! Market-wide analytics over the price matrix: breadth, sector moves,
//! momentum, movers, the equal-weight index and a demo portfolio.

pub mod breadth;
pub mod momentum;
pub mod portfolio;
pub mod snapshots;

pub use breadth::{Breadth, DailyChange, SectorBreadth, OTHER_SECTOR};
pub use momentum::MomentumRow;
pub use portfolio::{Holding, PortfolioSummary, PortfolioTotals};
pub use snapshots::{
    IndexPoint, IndexSnapshot, MarketMovers, Mover, StockSnapshot, INDEX_HISTORY_POINTS,
};

use analysis_core::PriceMatrix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Breadth, sector breadth and momentum for the last trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInsights {
    pub date: NaiveDate,
    pub breadth: Breadth,
    pub sectors: Vec<SectorBreadth>,
    pub momentum: Vec<MomentumRow>,
}

pub struct MarketAnalyticsEngine;

impl MarketAnalyticsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn breadth(&self, matrix: &PriceMatrix) -> Option<Breadth> {
        breadth::breadth(matrix)
    }

    pub fn sector_breadth(&self, matrix: &PriceMatrix) -> Vec<SectorBreadth> {
        breadth::sector_breadth(matrix)
    }

    pub fn momentum(&self, matrix: &PriceMatrix) -> Vec<MomentumRow> {
        momentum::momentum(matrix)
    }

    /// Full insights bundle; `None` when there is no data.
    pub fn insights(&self, matrix: &PriceMatrix) -> Option<MarketInsights> {
        let date = matrix.last_date()?;
        let breadth = self.breadth(matrix)?;
        let sectors = self.sector_breadth(matrix);
        let momentum = self.momentum(matrix);

        tracing::info!(
            "Market insights {}: {} up / {} down, {} sectors, {} momentum rows",
            date,
            breadth.advancers,
            breadth.decliners,
            sectors.len(),
            momentum.len()
        );

        Some(MarketInsights {
            date,
            breadth,
            sectors,
            momentum,
        })
    }

    pub fn market_movers(&self, matrix: &PriceMatrix) -> Option<MarketMovers> {
        snapshots::market_movers(matrix)
    }

    pub fn most_bought(&self, matrix: &PriceMatrix) -> Option<Mover> {
        snapshots::most_bought(matrix)
    }

    pub fn index_snapshot(&self, matrix: &PriceMatrix) -> Option<IndexSnapshot> {
        snapshots::index_snapshot(matrix)
    }

    pub fn index_history(&self, matrix: &PriceMatrix, points: usize) -> Vec<IndexPoint> {
        snapshots::index_history(matrix, points)
    }

    pub fn stock_snapshot(&self, matrix: &PriceMatrix, symbol: &str) -> Option<StockSnapshot> {
        snapshots::stock_snapshot(matrix, symbol)
    }

    pub fn portfolio(&self, matrix: &PriceMatrix) -> Option<PortfolioSummary> {
        portfolio::portfolio(matrix)
    }
}

impl Default for MarketAnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}
