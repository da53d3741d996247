use async_trait::async_trait;
use engine_application::{ProviderClient, ProviderError, StatisticsClient};
use engine_domain::Provider;
use reqwest::Client;
use serde::Deserialize;
use shaku::Component;

use super::http::get_text;

pub const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// FRED reports a missing observation as a literal dot.
const MISSING_VALUE: &str = ".";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    value: String,
}

/// Latest observation of a FRED series, newest first.
#[derive(Component)]
#[shaku(interface = StatisticsClient)]
pub struct FredClient {
    client: Client,
    api_key: String,
    #[shaku(default = FRED_BASE_URL.to_string())]
    base_url: String,
}

impl FredClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: FRED_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl ProviderClient for FredClient {
    fn provider(&self) -> Provider {
        Provider::Fred
    }

    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError> {
        let params = [
            ("series_id", signal_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("limit", "1"),
            ("sort_order", "desc"),
        ];
        let body = get_text(
            &self.client,
            Provider::Fred,
            &self.base_url,
            &params,
            &self.api_key,
        )
        .await?;
        parse_latest_observation(&body)
    }
}

impl StatisticsClient for FredClient {}

pub(crate) fn parse_latest_observation(body: &str) -> Result<String, ProviderError> {
    let response: ObservationsResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::empty(
            Provider::Fred,
            format!("Failed to parse observations: {}", e),
        )
    })?;

    let value = response
        .observations
        .into_iter()
        .next()
        .map(|o| o.value.trim().to_string())
        .filter(|v| !v.is_empty() && v != MISSING_VALUE)
        .ok_or_else(|| ProviderError::empty(Provider::Fred, "no observation available"))?;

    Ok(value)
}
