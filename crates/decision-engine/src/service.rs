use crate::config::DsfmConfig;
use crate::rules::{DecisionEngine, DecisionSignal};
use analysis_core::{AnalysisError, ForecastResult, PriceMatrix, SentimentProvider, SentimentReport};
use forecast_engine::ForecastEngine;
use market_analytics::{
    IndexPoint, IndexSnapshot, MarketAnalyticsEngine, MarketInsights, MarketMovers, Mover,
    PortfolioSummary, StockSnapshot, INDEX_HISTORY_POINTS,
};
use market_data::TimeSeriesStore;
use quant_analysis::{RiskMetricsEngine, TopStocks};
use sentiment_analysis::{NewsDataClient, SentimentAnalysisEngine};
use std::sync::Arc;
use std::time::Duration;

/// Async entry point over the analytics engines.
///
/// Every query reloads the price matrix from the store. Forecasts run on the
/// blocking pool under a timeout; failures and timeouts come back as `None`.
pub struct DsfmService {
    store: TimeSeriesStore,
    risk: Arc<RiskMetricsEngine>,
    forecaster: Arc<ForecastEngine>,
    analytics: MarketAnalyticsEngine,
    sentiment: Arc<dyn SentimentProvider>,
    decisions: DecisionEngine,
    forecast_timeout: Duration,
}

impl DsfmService {
    pub fn new(
        store: TimeSeriesStore,
        forecaster: Arc<ForecastEngine>,
        sentiment: Arc<dyn SentimentProvider>,
        forecast_timeout: Duration,
    ) -> Self {
        Self {
            store,
            risk: Arc::new(RiskMetricsEngine::new()),
            forecaster,
            analytics: MarketAnalyticsEngine::new(),
            sentiment,
            decisions: DecisionEngine::new(),
            forecast_timeout,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &DsfmConfig) -> anyhow::Result<Self> {
        let news = NewsDataClient::new(
            config.news_api_url.clone(),
            config.news_api_key.clone(),
            config.news_timeout(),
        )?;
        if !news.has_api_key() {
            tracing::warn!("NEWSCATCHER_API_KEY not set, sentiment will be NEUTRAL");
        }

        let forecaster = match config.forecast_seed {
            Some(seed) => ForecastEngine::with_seed(seed),
            None => ForecastEngine::new(),
        };

        Ok(Self::new(
            TimeSeriesStore::new(config.data_csv.clone()),
            Arc::new(forecaster),
            Arc::new(SentimentAnalysisEngine::new(news)),
            config.forecast_timeout(),
        ))
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    async fn load(&self) -> PriceMatrix {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(matrix) => matrix,
            Err(e) => {
                tracing::warn!("Market data load task failed: {}", e);
                PriceMatrix::empty()
            }
        }
    }

    pub async fn top_stocks(&self) -> TopStocks {
        let matrix = self.load().await;
        let risk = Arc::clone(&self.risk);
        match tokio::task::spawn_blocking(move || risk.top_stocks(&matrix)).await {
            Ok(top) => top,
            Err(e) => {
                tracing::warn!("Risk ranking task failed: {}", e);
                TopStocks::default()
            }
        }
    }

    /// Cached forecast when available, otherwise a fresh fit bounded by the
    /// forecast timeout.
    pub async fn forecast(&self, symbol: &str) -> Option<Arc<ForecastResult>> {
        match self.try_forecast(symbol).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("No forecast for {}: {}", symbol, e);
                None
            }
        }
    }

    async fn try_forecast(
        &self,
        symbol: &str,
    ) -> Result<Option<Arc<ForecastResult>>, AnalysisError> {
        // a fit still running from an earlier request reads as a miss
        if let Some(hit) = self.forecaster.cached(symbol) {
            return Ok(Some(hit));
        }

        let matrix = self.load().await;
        if matrix.is_empty() {
            return Ok(None);
        }
        if !matrix.has_symbol(symbol) {
            return Err(AnalysisError::SymbolNotFound(symbol.to_string()));
        }

        let forecaster = Arc::clone(&self.forecaster);
        let owned_symbol = symbol.to_string();
        let task =
            tokio::task::spawn_blocking(move || forecaster.forecast(&matrix, &owned_symbol));

        match tokio::time::timeout(self.forecast_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(AnalysisError::ModelFit(format!("forecast task aborted: {}", e))),
            Err(_) => Err(AnalysisError::Timeout(format!(
                "forecast fit exceeded {:?}",
                self.forecast_timeout
            ))),
        }
    }

    pub async fn sentiment(&self, symbol: &str) -> SentimentReport {
        self.sentiment.sentiment(symbol).await
    }

    /// Forecast, then sentiment, then the rule table. `None` when no
    /// forecast is available.
    pub async fn decision(&self, symbol: &str) -> Option<DecisionSignal> {
        let forecast = self.forecast(symbol).await?;
        let sentiment = self.sentiment(symbol).await;
        let matrix = self.load().await;
        let history = market_data::extract(&matrix, symbol);
        Some(self.decisions.decide(&forecast, &sentiment, &history))
    }

    pub async fn market_insights(&self) -> Option<MarketInsights> {
        let matrix = self.load().await;
        self.analytics.insights(&matrix)
    }

    pub async fn market_movers(&self) -> Option<MarketMovers> {
        let matrix = self.load().await;
        self.analytics.market_movers(&matrix)
    }

    pub async fn most_bought(&self) -> Option<Mover> {
        let matrix = self.load().await;
        self.analytics.most_bought(&matrix)
    }

    pub async fn index_snapshot(&self) -> Option<IndexSnapshot> {
        let matrix = self.load().await;
        self.analytics.index_snapshot(&matrix)
    }

    pub async fn index_history(&self) -> Vec<IndexPoint> {
        let matrix = self.load().await;
        self.analytics.index_history(&matrix, INDEX_HISTORY_POINTS)
    }

    pub async fn stock_snapshot(&self, symbol: &str) -> Option<StockSnapshot> {
        let matrix = self.load().await;
        self.analytics.stock_snapshot(&matrix, symbol)
    }

    pub async fn portfolio(&self) -> Option<PortfolioSummary> {
        let matrix = self.load().await;
        self.analytics.portfolio(&matrix)
    }
}
