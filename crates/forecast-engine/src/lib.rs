//! Price forecasting on log-returns: autoregressive, seasonal autoregressive
//! and GARCH(1,1) volatility paths with a per-symbol result cache.

pub mod ar;
pub mod cache;
pub mod engine;
pub mod garch;
pub mod seasonal;

pub use ar::ArModel;
pub use cache::{ForecastCache, SingleFlightCache};
pub use engine::{ForecastEngine, DEFAULT_HORIZON, MIN_PRICE_POINTS};
pub use garch::GarchModel;
pub use seasonal::{SeasonalArModel, SEASONAL_PERIOD};
