//! Synthetic demo portfolio: one share of every symbol bought at its first
//! available price.

use analysis_core::stats::round_to;
use analysis_core::PriceMatrix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: u32,
    pub avg_cost: f64,
    pub ltp: f64,
    pub invested: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    /// Change since the previous session
    pub today_pl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_invested: f64,
    pub total_current_value: f64,
    pub total_profit_loss: f64,
    pub total_today_pl: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub totals: PortfolioTotals,
}

const QUANTITY: u32 = 1;

pub fn portfolio(matrix: &PriceMatrix) -> Option<PortfolioSummary> {
    if matrix.is_empty() {
        return None;
    }
    let first = matrix.rows().first()?;
    let last = matrix.last_row()?;
    let prev = matrix.previous_row()?;

    let holdings: Vec<Holding> = matrix
        .symbols()
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let qty = f64::from(QUANTITY);
            let avg_cost = first.prices[i];
            let ltp = last.prices[i];
            let invested = avg_cost * qty;
            let current_value = ltp * qty;
            let profit_loss = current_value - invested;
            let profit_loss_pct = if invested != 0.0 {
                profit_loss / invested * 100.0
            } else {
                0.0
            };

            Holding {
                symbol: symbol.clone(),
                quantity: QUANTITY,
                avg_cost: round_to(avg_cost, 2),
                ltp,
                invested: round_to(invested, 2),
                current_value: round_to(current_value, 2),
                profit_loss: round_to(profit_loss, 2),
                profit_loss_pct: round_to(profit_loss_pct, 2),
                today_pl: round_to((ltp - prev.prices[i]) * qty, 2),
            }
        })
        .collect();

    let totals = PortfolioTotals {
        total_invested: holdings.iter().map(|h| h.invested).sum(),
        total_current_value: holdings.iter().map(|h| h.current_value).sum(),
        total_profit_loss: holdings.iter().map(|h| h.profit_loss).sum(),
        total_today_pl: holdings.iter().map(|h| h.today_pl).sum(),
        date: last.date,
    };

    Some(PortfolioSummary { holdings, totals })
}
