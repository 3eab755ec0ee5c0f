use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DsfmConfig {
    /// Wide `Date,SYM1,SYM2,..` price table
    pub data_csv: PathBuf,
    pub holdings_csv: PathBuf,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub news_timeout_secs: u64,
    pub forecast_timeout_secs: u64,
    /// Fixed seed for the GARCH noise; random when unset
    pub forecast_seed: Option<u64>,
}

impl DsfmConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            data_csv: env::var("DSFM_DATA_CSV")
                .unwrap_or_else(|_| "data/market_data.csv".to_string())
                .into(),
            holdings_csv: env::var("DSFM_HOLDINGS_CSV")
                .unwrap_or_else(|_| "data/holdings.csv".to_string())
                .into(),
            news_api_key: env::var("NEWSCATCHER_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            news_api_url: env::var("NEWS_API_URL")
                .unwrap_or_else(|_| sentiment_analysis::DEFAULT_NEWS_API_URL.to_string()),
            news_timeout_secs: env::var("NEWS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("NEWS_TIMEOUT_SECS must be a whole number of seconds")?,
            forecast_timeout_secs: env::var("FORECAST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("FORECAST_TIMEOUT_SECS must be a whole number of seconds")?,
            forecast_seed: env::var("FORECAST_SEED")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .context("FORECAST_SEED must be an unsigned integer")?,
        };

        Ok(config)
    }

    pub fn news_timeout(&self) -> Duration {
        Duration::from_secs(self.news_timeout_secs)
    }

    pub fn forecast_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // the process environment is shared, keep every env mutation in this test
    #[test]
    fn test_from_env_defaults_and_overrides() {
        for key in [
            "DSFM_DATA_CSV",
            "DSFM_HOLDINGS_CSV",
            "NEWSCATCHER_API_KEY",
            "NEWS_API_URL",
            "NEWS_TIMEOUT_SECS",
            "FORECAST_TIMEOUT_SECS",
            "FORECAST_SEED",
        ] {
            env::remove_var(key);
        }

        let config = DsfmConfig::from_env().unwrap();
        assert_eq!(config.data_csv, PathBuf::from("data/market_data.csv"));
        assert_eq!(config.holdings_csv, PathBuf::from("data/holdings.csv"));
        assert!(config.news_api_key.is_none());
        assert_eq!(config.news_api_url, "https://newsdata.io/api/1/news");
        assert_eq!(config.news_timeout(), Duration::from_secs(10));
        assert_eq!(config.forecast_timeout(), Duration::from_secs(60));
        assert!(config.forecast_seed.is_none());

        env::set_var("FORECAST_SEED", "7");
        env::set_var("NEWSCATCHER_API_KEY", "");
        let config = DsfmConfig::from_env().unwrap();
        assert_eq!(config.forecast_seed, Some(7));
        assert!(config.news_api_key.is_none());

        env::set_var("FORECAST_SEED", "seven");
        assert!(DsfmConfig::from_env().is_err());
        env::remove_var("FORECAST_SEED");
        env::remove_var("NEWSCATCHER_API_KEY");
    }
}
