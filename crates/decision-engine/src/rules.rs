use analysis_core::{Direction, ForecastResult, PricePoint, PriceSeries, SentimentLabel, SentimentReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price history points attached to a decision.
pub const HISTORY_WINDOW: usize = 800;

/// Trade signal derived from forecast direction and news sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Wait,
    Avoid,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Wait => "WAIT",
            Signal::Avoid => "AVOID",
            Signal::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule table. Every combination not listed explicitly is HOLD.
pub fn signal_for(direction: Direction, sentiment: SentimentLabel) -> Signal {
    match (direction, sentiment) {
        (Direction::Up, SentimentLabel::Positive) => Signal::Buy,
        (Direction::Up, SentimentLabel::Negative) => Signal::Wait,
        (Direction::Down, SentimentLabel::Negative) => Signal::Avoid,
        _ => Signal::Hold,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSignal {
    pub symbol: String,
    pub signal: Signal,
    pub forecast_direction: Direction,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    /// Primary path, same as `forecast_arima`
    pub forecast: Vec<PricePoint>,
    pub forecast_arima: Vec<PricePoint>,
    pub forecast_sarima: Vec<PricePoint>,
    pub forecast_garch: Vec<PricePoint>,
    pub history: Vec<PricePoint>,
}

pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Combine a forecast with sentiment. Pure; nothing is cached.
    pub fn decide(
        &self,
        forecast: &ForecastResult,
        sentiment: &SentimentReport,
        history: &PriceSeries,
    ) -> DecisionSignal {
        let signal = signal_for(forecast.direction, sentiment.label);
        tracing::info!(
            "Decision {}: {} (forecast {}, sentiment {})",
            forecast.symbol,
            signal,
            forecast.direction,
            sentiment.label
        );

        DecisionSignal {
            symbol: forecast.symbol.clone(),
            signal,
            forecast_direction: forecast.direction,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
            forecast: forecast.arima_path.clone(),
            forecast_arima: forecast.arima_path.clone(),
            forecast_sarima: forecast.sarima_path.clone(),
            forecast_garch: forecast.garch_path.clone(),
            history: history.tail(HISTORY_WINDOW),
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::FitSummary;
    use chrono::{Duration, NaiveDate};

    fn forecast(direction: Direction) -> ForecastResult {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let path = |base: f64| {
            (1..=3)
                .map(|i| PricePoint {
                    date: date + Duration::days(i),
                    price: base + i as f64,
                })
                .collect::<Vec<_>>()
        };
        ForecastResult {
            symbol: "X".to_string(),
            direction,
            last_actual: 100.0,
            last_date: date,
            arima_path: path(100.0),
            sarima_path: path(200.0),
            garch_path: path(300.0),
            fit: FitSummary {
                ar_order: 1,
                seasonal_ar_order: 0,
                seasonal_lag_used: false,
                garch_omega: 1e-6,
                garch_alpha: 0.1,
                garch_beta: 0.85,
            },
        }
    }

    #[test]
    fn test_rule_table() {
        use Direction::*;
        use SentimentLabel::*;
        assert_eq!(signal_for(Up, Positive), Signal::Buy);
        assert_eq!(signal_for(Up, Negative), Signal::Wait);
        assert_eq!(signal_for(Down, Negative), Signal::Avoid);
        assert_eq!(signal_for(Down, Positive), Signal::Hold);
        assert_eq!(signal_for(Up, Neutral), Signal::Hold);
        assert_eq!(signal_for(Down, Neutral), Signal::Hold);
    }

    #[test]
    fn test_decide_assembles_paths_and_history() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let history = PriceSeries::new(
            "X",
            (0..1000)
                .map(|i| PricePoint {
                    date: start + Duration::days(i),
                    price: 50.0 + i as f64,
                })
                .collect(),
        );
        let report = SentimentReport {
            symbol: "X".to_string(),
            score: 0.25,
            label: SentimentLabel::Positive,
            news: Vec::new(),
        };

        let decision = DecisionEngine::new().decide(&forecast(Direction::Up), &report, &history);
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.sentiment_score, 0.25);
        assert_eq!(decision.forecast, decision.forecast_arima);
        assert_eq!(decision.forecast_sarima[0].price, 201.0);
        assert_eq!(decision.forecast_garch.len(), 3);
        assert_eq!(decision.history.len(), HISTORY_WINDOW);
        assert_eq!(decision.history.last().unwrap().price, 1049.0);
    }

    #[test]
    fn test_signal_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Signal::Avoid).unwrap(), "\"AVOID\"");
        assert_eq!(Signal::Wait.to_string(), "WAIT");
    }
}
