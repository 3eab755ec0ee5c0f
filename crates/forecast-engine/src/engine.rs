use crate::ar::ArModel;
use crate::cache::{ForecastCache, SingleFlightCache};
use crate::garch::GarchModel;
use crate::seasonal::SeasonalArModel;
use analysis_core::stats::log_returns;
use analysis_core::{
    AnalysisError, Direction, FitSummary, ForecastResult, PriceMatrix, PricePoint, PriceSeries,
};
use chrono::{Duration, NaiveDate};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use statrs::distribution::Normal;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Forecast length in trading steps when the caller does not pick one.
pub const DEFAULT_HORIZON: usize = 30;

/// Fewest prices that still produce one log-return.
pub const MIN_PRICE_POINTS: usize = 2;

/// Fits AR, seasonal AR and GARCH(1,1) models on log-returns and projects
/// price paths. Results are cached per symbol and horizon for the life of
/// the engine.
pub struct ForecastEngine {
    cache: Arc<dyn ForecastCache>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ForecastEngine {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(SingleFlightCache::new()),
            Box::new(StdRng::from_entropy()),
        )
    }

    /// Engine whose GARCH noise is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_parts(
            Arc::new(SingleFlightCache::new()),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    pub fn with_parts(cache: Arc<dyn ForecastCache>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            cache,
            rng: Mutex::new(rng),
        }
    }

    pub fn forecast(
        &self,
        matrix: &PriceMatrix,
        symbol: &str,
    ) -> Result<Option<Arc<ForecastResult>>, AnalysisError> {
        self.forecast_with_horizon(matrix, symbol, DEFAULT_HORIZON)
    }

    /// Cached forecast for `symbol`, fitting on a miss.
    ///
    /// `Ok(None)` means fewer than two prices (or an unknown symbol). Fit
    /// failures are returned as `ModelFit` and are not cached.
    pub fn forecast_with_horizon(
        &self,
        matrix: &PriceMatrix,
        symbol: &str,
        horizon: usize,
    ) -> Result<Option<Arc<ForecastResult>>, AnalysisError> {
        if horizon == 0 {
            return Err(AnalysisError::InvalidData(
                "forecast horizon must be at least 1".to_string(),
            ));
        }

        let key = cache_key(symbol, horizon);
        self.cache
            .get_or_try_insert_with(&key, &mut || self.fit(matrix, symbol, horizon))
    }

    /// Previously computed default-horizon forecast, if any. Returns `None`
    /// instead of waiting while a fit for the same key is running.
    pub fn cached(&self, symbol: &str) -> Option<Arc<ForecastResult>> {
        self.cache.get(&cache_key(symbol, DEFAULT_HORIZON))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    fn fit(
        &self,
        matrix: &PriceMatrix,
        symbol: &str,
        horizon: usize,
    ) -> Result<Option<ForecastResult>, AnalysisError> {
        let series = market_data::extract(matrix, symbol);
        if series.len() < MIN_PRICE_POINTS {
            tracing::debug!(
                "No forecast for {}: {} prices, need {}",
                symbol,
                series.len(),
                MIN_PRICE_POINTS
            );
            return Ok(None);
        }

        let start = Instant::now();
        let result = self.fit_series(&series, horizon)?;
        tracing::info!(
            "Forecast {} ({} days): {} AR({}) SAR({}{}) in {:?}",
            symbol,
            horizon,
            result.direction,
            result.fit.ar_order,
            result.fit.seasonal_ar_order,
            if result.fit.seasonal_lag_used { "+12" } else { "" },
            start.elapsed()
        );
        Ok(Some(result))
    }

    fn fit_series(
        &self,
        series: &PriceSeries,
        horizon: usize,
    ) -> Result<ForecastResult, AnalysisError> {
        let last = series.last().copied().ok_or(AnalysisError::NoData)?;
        let prices = series.prices();
        if prices.iter().any(|p| *p <= 0.0) {
            return Err(AnalysisError::ModelFit(format!(
                "{}: non-positive prices have no log-return",
                series.symbol
            )));
        }

        let returns = log_returns(&prices);
        let ar = ArModel::fit_auto(&returns)?;
        let seasonal = SeasonalArModel::fit_auto(&returns)?;
        let garch = GarchModel::fit(&returns)?;

        let shocks = self.draw_shocks(&garch.variance_forecast(horizon))?;

        let arima_path = reconstruct_path(last, &ar.forecast(horizon))?;
        let sarima_path = reconstruct_path(last, &seasonal.forecast(horizon))?;
        let garch_path = reconstruct_path(last, &shocks)?;

        let direction = match arima_path.last() {
            Some(p) if p.price > last.price => Direction::Up,
            _ => Direction::Down,
        };

        Ok(ForecastResult {
            symbol: series.symbol.clone(),
            direction,
            last_actual: last.price,
            last_date: last.date,
            arima_path,
            sarima_path,
            garch_path,
            fit: FitSummary {
                ar_order: ar.order(),
                seasonal_ar_order: seasonal.order(),
                seasonal_lag_used: seasonal.uses_seasonal_lag(),
                garch_omega: garch.omega(),
                garch_alpha: garch.alpha(),
                garch_beta: garch.beta(),
            },
        })
    }

    /// One N(0, sigma_k) draw per forecast step.
    fn draw_shocks(&self, variances: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        variances
            .iter()
            .map(|v| {
                let sd = v.max(0.0).sqrt();
                if sd > 0.0 && sd.is_finite() {
                    let normal = Normal::new(0.0, sd)
                        .map_err(|e| AnalysisError::ModelFit(format!("GARCH draw: {}", e)))?;
                    Ok(normal.sample(&mut **rng))
                } else {
                    Ok(0.0)
                }
            })
            .collect()
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(symbol: &str, horizon: usize) -> String {
    format!("{}#{}", symbol, horizon)
}

/// `price[k] = last * exp(r[1] + .. + r[k])`, dated one calendar day apart.
fn reconstruct_path(last: PricePoint, returns: &[f64]) -> Result<Vec<PricePoint>, AnalysisError> {
    let mut cumulative: f64 = 0.0;
    returns
        .iter()
        .enumerate()
        .map(|(i, r)| {
            cumulative += r;
            let price = last.price * cumulative.exp();
            if !price.is_finite() {
                return Err(AnalysisError::ModelFit(
                    "forecast produced a non-finite price".to_string(),
                ));
            }
            Ok(PricePoint {
                date: future_date(last.date, i + 1),
                price,
            })
        })
        .collect()
}

fn future_date(from: NaiveDate, days: usize) -> NaiveDate {
    from + Duration::days(days as i64)
}
