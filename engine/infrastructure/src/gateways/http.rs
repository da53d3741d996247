use engine_application::ProviderError;
use engine_domain::Provider;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("ubi-engine/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 200;

/// HTTP client shared by every live gateway. The timeout bounds each call.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Issues a GET and returns the body of a 2xx response.
///
/// `secret` is scrubbed from the logged URL and from transport errors.
pub(crate) async fn get_text(
    client: &Client,
    provider: Provider,
    base_url: &str,
    params: &[(&str, &str)],
    secret: &str,
) -> Result<String, ProviderError> {
    let url = Url::parse_with_params(base_url, params)
        .map_err(|e| ProviderError::network(provider, format!("Failed to build URL: {}", e)))?;

    debug!(%provider, url = %redact(url.as_str(), secret), "Provider request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            truncate(&redact(&body, secret))
        };
        return Err(ProviderError::http(provider, status.as_u16(), message));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    if body.trim().is_empty() {
        return Err(ProviderError::empty(provider, "response body was empty"));
    }
    Ok(body)
}

fn transport_error(provider: Provider, error: reqwest::Error) -> ProviderError {
    let error = error.without_url();
    if error.is_timeout() {
        ProviderError::timeout(provider, error.to_string())
    } else {
        ProviderError::network(provider, error.to_string())
    }
}

pub(crate) fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "***")
    }
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
