use async_trait::async_trait;
use engine_application::{ProviderClient, ProviderError, QuoteClient};
use engine_domain::Provider;
use reqwest::Client;
use serde::Deserialize;
use shaku::Component;
use std::collections::HashMap;

use super::http::get_text;

pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

const PRICE_KEY: &str = "05. price";

/// GLOBAL_QUOTE response. API-level failures arrive as 200s with one of the
/// message fields set.
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Component)]
#[shaku(interface = QuoteClient)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    #[shaku(default = ALPHA_VANTAGE_BASE_URL.to_string())]
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl ProviderClient for AlphaVantageClient {
    fn provider(&self) -> Provider {
        Provider::AlphaVantage
    }

    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError> {
        let params = [
            ("function", "GLOBAL_QUOTE"),
            ("symbol", signal_id),
            ("apikey", self.api_key.as_str()),
        ];
        let body = get_text(
            &self.client,
            Provider::AlphaVantage,
            &self.base_url,
            &params,
            &self.api_key,
        )
        .await?;
        parse_global_quote(&body)
    }
}

impl QuoteClient for AlphaVantageClient {}

pub(crate) fn parse_global_quote(body: &str) -> Result<String, ProviderError> {
    let response: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::empty(
            Provider::AlphaVantage,
            format!("Failed to parse quote: {}", e),
        )
    })?;

    if let Some(message) = response.error_message {
        return Err(ProviderError::http(Provider::AlphaVantage, 400, message));
    }
    if let Some(message) = response.note.or(response.information) {
        return Err(ProviderError::empty(Provider::AlphaVantage, message));
    }

    response
        .global_quote
        .and_then(|mut quote| quote.remove(PRICE_KEY))
        .map(|price| price.trim().to_string())
        .filter(|price| !price.is_empty())
        .ok_or_else(|| ProviderError::empty(Provider::AlphaVantage, "quote has no price"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_application::ProviderErrorKind;

    #[test]
    fn test_parses_price() {
        let body = r#"{
            "Global Quote": {
                "01. symbol": "SPY",
                "02. open": "571.0000",
                "05. price": "575.4600",
                "07. latest trading day": "2025-03-07"
            }
        }"#;

        assert_eq!(parse_global_quote(body).unwrap(), "575.4600");
    }

    #[test]
    fn test_error_message_is_client_error() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;

        let err = parse_global_quote(body).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::HttpError { status: 400 });
        assert!(!err.is_transient());
    }

    #[test]
    fn test_throttle_note_is_empty_response() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;

        let err = parse_global_quote(body).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyResponse);
    }

    #[test]
    fn test_empty_quote_object() {
        let err = parse_global_quote(r#"{"Global Quote": {}}"#).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyResponse);
    }
}
