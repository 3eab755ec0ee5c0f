//! Point-in-time market views: movers, the equal-weight index and single
//! stock quotes.

use crate::breadth::daily_changes;
use analysis_core::stats::{pct_change, round_to};
use analysis_core::PriceMatrix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MOVERS_TOP_N: usize = 10;

/// Number of index values returned for charting.
pub const INDEX_HISTORY_POINTS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub symbol: String,
    pub ltp: f64,
    pub pct_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMovers {
    pub date: NaiveDate,
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub value: f64,
    pub change_pct: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub latest_value: f64,
    pub change: f64,
    pub change_pct: f64,
    pub date: NaiveDate,
}

/// Last-day movers, skipping symbols whose previous price is 0.
fn movers_by_change(matrix: &PriceMatrix) -> Vec<Mover> {
    daily_changes(matrix)
        .into_iter()
        .filter_map(|c| {
            let pct = pct_change(c.previous, c.ltp)?;
            Some(Mover {
                symbol: c.symbol,
                ltp: c.ltp,
                pct_change: round_to(pct, 2),
            })
        })
        .collect()
}

fn sort_by_change(movers: &mut [Mover], descending: bool) {
    movers.sort_by(|a, b| {
        let ord = a
            .pct_change
            .partial_cmp(&b.pct_change)
            .unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Top gainers and losers by last-day percent change.
pub fn market_movers(matrix: &PriceMatrix) -> Option<MarketMovers> {
    let date = matrix.last_date()?;
    let movers = movers_by_change(matrix);

    let mut gainers = movers.clone();
    sort_by_change(&mut gainers, true);
    gainers.truncate(MOVERS_TOP_N);

    let mut losers = movers;
    sort_by_change(&mut losers, false);
    losers.truncate(MOVERS_TOP_N);

    Some(MarketMovers {
        date,
        gainers,
        losers,
    })
}

/// The single biggest gainer of the last day.
pub fn most_bought(matrix: &PriceMatrix) -> Option<Mover> {
    let mut movers = movers_by_change(matrix);
    sort_by_change(&mut movers, true);
    movers.into_iter().next()
}

/// Equal-weight mean of every symbol per row.
pub fn index_series(matrix: &PriceMatrix) -> Vec<IndexPoint> {
    if matrix.symbols().is_empty() {
        return Vec::new();
    }
    matrix
        .rows()
        .iter()
        .map(|row| IndexPoint {
            date: row.date,
            value: row.prices.iter().sum::<f64>() / row.prices.len() as f64,
        })
        .collect()
}

pub fn index_snapshot(matrix: &PriceMatrix) -> Option<IndexSnapshot> {
    let series = index_series(matrix);
    let [.., prev, last] = series.as_slice() else {
        return None;
    };
    Some(IndexSnapshot {
        value: round_to(last.value, 2),
        change_pct: round_to(pct_change(prev.value, last.value).unwrap_or(0.0), 2),
        date: last.date,
    })
}

/// Most recent `points` index values, oldest first.
pub fn index_history(matrix: &PriceMatrix, points: usize) -> Vec<IndexPoint> {
    let series = index_series(matrix);
    let start = series.len().saturating_sub(points);
    series[start..].to_vec()
}

pub fn stock_snapshot(matrix: &PriceMatrix, symbol: &str) -> Option<StockSnapshot> {
    let series = market_data::extract(matrix, symbol);
    let [.., prev, last] = series.points.as_slice() else {
        return None;
    };
    let change = last.price - prev.price;
    Some(StockSnapshot {
        symbol: symbol.to_string(),
        latest_value: round_to(last.price, 2),
        change: round_to(change, 2),
        change_pct: round_to(pct_change(prev.price, last.price).unwrap_or(0.0), 2),
        date: last.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PriceRow;
    use chrono::Duration;

    fn create_matrix(symbols: &[&str], rows: &[&[f64]]) -> PriceMatrix {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        PriceMatrix::new(
            symbols.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .enumerate()
                .map(|(i, prices)| PriceRow {
                    date: start + Duration::days(i as i64),
                    prices: prices.to_vec(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_movers_sorted_both_ways() {
        let m = create_matrix(
            &["A", "B", "C"],
            &[&[100.0, 100.0, 100.0], &[105.0, 90.0, 101.0]],
        );
        let movers = market_movers(&m).unwrap();
        let gainers: Vec<&str> = movers.gainers.iter().map(|g| g.symbol.as_str()).collect();
        let losers: Vec<&str> = movers.losers.iter().map(|g| g.symbol.as_str()).collect();
        assert_eq!(gainers, vec!["A", "C", "B"]);
        assert_eq!(losers, vec!["B", "C", "A"]);
        assert_eq!(movers.gainers[0].pct_change, 5.0);
        assert_eq!(movers.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_movers_capped_at_ten() {
        let names: Vec<String> = (0..15).map(|i| format!("S{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let prev = vec![10.0; 15];
        let last: Vec<f64> = (0..15).map(|i| 10.0 + i as f64 * 0.1).collect();
        let m = create_matrix(&refs, &[&prev, &last]);
        let movers = market_movers(&m).unwrap();
        assert_eq!(movers.gainers.len(), MOVERS_TOP_N);
        assert_eq!(movers.losers.len(), MOVERS_TOP_N);
        assert_eq!(movers.gainers[0].symbol, "S14");
        assert_eq!(movers.losers[0].symbol, "S0");
    }

    #[test]
    fn test_most_bought() {
        let m = create_matrix(&["A", "B"], &[&[10.0, 10.0], &[10.5, 12.0]]);
        let top = most_bought(&m).unwrap();
        assert_eq!(top.symbol, "B");
        assert_eq!(top.ltp, 12.0);
        assert_eq!(top.pct_change, 20.0);
        assert!(most_bought(&PriceMatrix::empty()).is_none());
    }

    #[test]
    fn test_index_snapshot_and_history() {
        let m = create_matrix(
            &["A", "B"],
            &[&[10.0, 30.0], &[20.0, 40.0], &[30.0, 36.0]],
        );
        let snap = index_snapshot(&m).unwrap();
        assert_eq!(snap.value, 33.0);
        assert_eq!(snap.change_pct, 10.0);

        let history = index_history(&m, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].value, 30.0);
        assert_eq!(index_history(&m, INDEX_HISTORY_POINTS).len(), 3);
    }

    #[test]
    fn test_index_needs_two_rows() {
        let m = create_matrix(&["A"], &[&[10.0]]);
        assert!(index_snapshot(&m).is_none());
        assert!(index_history(&PriceMatrix::empty(), 200).is_empty());
    }

    #[test]
    fn test_stock_snapshot() {
        let m = create_matrix(&["A", "B"], &[&[100.0, 1.0], &[97.5, 1.0]]);
        let snap = stock_snapshot(&m, "A").unwrap();
        assert_eq!(snap.latest_value, 97.5);
        assert_eq!(snap.change, -2.5);
        assert_eq!(snap.change_pct, -2.5);
        assert!(stock_snapshot(&m, "MISSING").is_none());
    }
}
