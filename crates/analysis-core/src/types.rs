use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading day of the wide price table: a date plus one price per symbol,
/// aligned with [`PriceMatrix::symbols`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub prices: Vec<f64>,
}

/// Dense date x symbol price matrix.
///
/// Rows are strictly increasing by date and every cell holds a finite price
/// once produced by the market-data loader. An empty matrix means "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMatrix {
    symbols: Vec<String>,
    rows: Vec<PriceRow>,
}

impl PriceMatrix {
    /// Build a matrix from already-normalized rows. Row width must equal the
    /// symbol count; mismatched rows are rejected.
    pub fn new(symbols: Vec<String>, rows: Vec<PriceRow>) -> Result<Self, crate::AnalysisError> {
        if let Some(bad) = rows.iter().find(|r| r.prices.len() != symbols.len()) {
            return Err(crate::AnalysisError::InvalidData(format!(
                "row {} has {} prices for {} symbols",
                bad.date,
                bad.prices.len(),
                symbols.len()
            )));
        }
        if rows.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(crate::AnalysisError::InvalidData(
                "row dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { symbols, rows })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.symbols.is_empty()
    }

    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbol_index(symbol).is_some()
    }

    /// All prices of one symbol in date order.
    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let idx = self.symbol_index(symbol)?;
        Some(self.rows.iter().map(|r| r.prices[idx]).collect())
    }

    pub fn last_row(&self) -> Option<&PriceRow> {
        self.rows.last()
    }

    /// Second-to-last row, or the last row when only one exists.
    pub fn previous_row(&self) -> Option<&PriceRow> {
        match self.rows.len() {
            0 => None,
            1 => self.rows.last(),
            n => self.rows.get(n - 2),
        }
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

/// A single dated price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Clean, date-ordered price history for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The most recent `n` points (all of them when shorter).
    pub fn tail(&self, n: usize) -> Vec<PricePoint> {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].to_vec()
    }
}

/// Annualized risk profile of one symbol. Values are fractions, not percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetric {
    pub symbol: String,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
}

/// Forecast direction of the primary model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters chosen while fitting, reported alongside the paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub ar_order: usize,
    pub seasonal_ar_order: usize,
    pub seasonal_lag_used: bool,
    pub garch_omega: f64,
    pub garch_alpha: f64,
    pub garch_beta: f64,
}

/// Output of the three forecasting models for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub symbol: String,
    pub direction: Direction,
    pub last_actual: f64,
    pub last_date: NaiveDate,
    pub arima_path: Vec<PricePoint>,
    pub sarima_path: Vec<PricePoint>,
    pub garch_path: Vec<PricePoint>,
    pub fit: FitSummary,
}

/// Categorical news sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const POSITIVE_THRESHOLD: f64 = 0.1;
    pub const NEGATIVE_THRESHOLD: f64 = -0.1;

    pub fn from_score(score: f64) -> Self {
        if score > Self::POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < Self::NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// News headline as seen by the sentiment collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub published_date: Option<String>,
}

/// Scored headline returned with a sentiment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub published_date: String,
    pub sentiment_score: f64,
}

/// Aggregated sentiment for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub symbol: String,
    pub score: f64,
    pub label: SentimentLabel,
    pub news: Vec<NewsItem>,
}

impl SentimentReport {
    /// The degraded answer used whenever the news source cannot help.
    pub fn neutral(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            score: 0.0,
            label: SentimentLabel::Neutral,
            news: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_matrix_rejects_unordered_rows() {
        let rows = vec![
            PriceRow { date: day(2), prices: vec![1.0] },
            PriceRow { date: day(1), prices: vec![2.0] },
        ];
        assert!(PriceMatrix::new(vec!["A".into()], rows).is_err());
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let rows = vec![PriceRow { date: day(1), prices: vec![1.0, 2.0] }];
        assert!(PriceMatrix::new(vec!["A".into()], rows).is_err());
    }

    #[test]
    fn test_previous_row_single_row() {
        let rows = vec![PriceRow { date: day(1), prices: vec![5.0] }];
        let m = PriceMatrix::new(vec!["A".into()], rows).unwrap();
        assert_eq!(m.previous_row().unwrap().date, day(1));
        assert_eq!(m.column("A"), Some(vec![5.0]));
        assert_eq!(m.column("B"), None);
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.11), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Negative);
    }

    #[test]
    fn test_labels_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"UP\"");
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Negative).unwrap(),
            "\"NEGATIVE\""
        );
    }

    #[test]
    fn test_series_tail() {
        let pts: Vec<PricePoint> = (1..=5)
            .map(|d| PricePoint { date: day(d), price: d as f64 })
            .collect();
        let s = PriceSeries::new("A", pts);
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(2)[0].price, 4.0);
        assert_eq!(s.tail(10).len(), 5);
    }
}
