use anyhow::{Context, Result};
use engine_application::{RetryPolicy, DEFAULT_NEWS_QUERY};
use engine_domain::{CpiDerivation, DEFAULT_FRESHNESS_WINDOW_SECS};
use std::str::FromStr;
use std::time::Duration;

pub const FRED_API_KEY: &str = "FRED_API_KEY";
pub const ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const NEWS_API_KEY: &str = "NEWS_API_KEY";

/// Runtime settings, layered as defaults, then environment, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub fred_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub freshness_window_secs: u64,
    pub refresh_interval_secs: u64,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub cpi: CpiDerivation,
    pub news_query: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            alpha_vantage_api_key: None,
            news_api_key: None,
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            refresh_interval_secs: 300,
            max_retries: 3,
            base_backoff_ms: 1000,
            request_timeout_secs: 10,
            cpi: CpiDerivation::default(),
            news_query: DEFAULT_NEWS_QUERY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlays every variable `lookup` knows about. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(FRED_API_KEY) {
            self.fred_api_key = Some(key);
        }
        if let Some(key) = get(ALPHA_VANTAGE_API_KEY) {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Some(key) = get(NEWS_API_KEY) {
            self.news_api_key = Some(key);
        }
        if let Some(query) = get("UBI_NEWS_QUERY") {
            self.news_query = query;
        }

        parse_into(&get, "UBI_FRESHNESS_WINDOW_SECS", &mut self.freshness_window_secs)?;
        parse_into(&get, "UBI_REFRESH_INTERVAL_SECS", &mut self.refresh_interval_secs)?;
        parse_into(&get, "UBI_MAX_RETRIES", &mut self.max_retries)?;
        parse_into(&get, "UBI_BASE_BACKOFF_MS", &mut self.base_backoff_ms)?;
        parse_into(&get, "UBI_REQUEST_TIMEOUT_SECS", &mut self.request_timeout_secs)?;
        parse_into(
            &get,
            "UBI_CPI_INFLATION_COEFFICIENT",
            &mut self.cpi.inflation_coefficient,
        )?;
        parse_into(
            &get,
            "UBI_CPI_COL_COEFFICIENT",
            &mut self.cpi.cost_of_living_coefficient,
        )?;

        if self.refresh_interval_secs == 0 {
            anyhow::bail!("UBI_REFRESH_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Names of the provider keys that are not configured.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            (FRED_API_KEY, &self.fred_api_key),
            (ALPHA_VANTAGE_API_KEY, &self.alpha_vantage_api_key),
            (NEWS_API_KEY, &self.news_api_key),
        ]
        .into_iter()
        .filter(|(_, key)| key.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Live gateways need every key; anything less runs on simulated providers.
    pub fn use_offline(&self, forced: bool) -> bool {
        forced || !self.missing_keys().is_empty()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_backoff_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn parse_into<T, G>(get: &G, key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        *target = raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw))?;
    }
    Ok(())
}
