use async_trait::async_trait;
use engine_domain::{Provider, RawArticle};
use shaku::Interface;
use std::fmt;

/// One HTTP call to one upstream provider for one named signal. Implementations
/// never retry.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Returns the provider's raw, unparsed value for `signal_id`.
    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError>;
}

/// Macroeconomic series keyed by series id.
pub trait StatisticsClient: ProviderClient + Interface {}

/// Latest market quote keyed by ticker symbol.
pub trait QuoteClient: ProviderClient + Interface {}

#[async_trait]
pub trait NewsClient: Interface {
    fn provider(&self) -> Provider;

    async fn search(&self, query: &str) -> Result<Vec<RawArticle>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Timeout,
    HttpError { status: u16 },
    EmptyResponse,
    NetworkError,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::HttpError { status } => write!(f, "http_error ({})", status),
            ProviderErrorKind::EmptyResponse => write!(f, "empty_response"),
            ProviderErrorKind::NetworkError => write!(f, "network_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} {kind}: {message}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(provider: Provider, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Timeout, message)
    }

    pub fn network(provider: Provider, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::NetworkError, message)
    }

    pub fn http(provider: Provider, status: u16, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::HttpError { status }, message)
    }

    pub fn empty(provider: Provider, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::EmptyResponse, message)
    }

    /// Timeouts, network failures, throttling (429) and server errors (5xx) may
    /// succeed on a later attempt; other client errors and empty payloads will not.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            ProviderErrorKind::Timeout | ProviderErrorKind::NetworkError => true,
            ProviderErrorKind::HttpError { status } => status == 429 || status >= 500,
            ProviderErrorKind::EmptyResponse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::timeout(Provider::Fred, "slow").is_transient());
        assert!(ProviderError::network(Provider::Fred, "reset").is_transient());
        assert!(ProviderError::http(Provider::Fred, 503, "unavailable").is_transient());
        assert!(ProviderError::http(Provider::Fred, 429, "throttled").is_transient());
    }

    #[test]
    fn test_permanent_classification() {
        assert!(!ProviderError::http(Provider::AlphaVantage, 401, "bad key").is_transient());
        assert!(!ProviderError::http(Provider::AlphaVantage, 404, "missing").is_transient());
        assert!(!ProviderError::empty(Provider::NewsApi, "no body").is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::http(Provider::Fred, 400, "Bad Request");
        assert_eq!(error.to_string(), "fred http_error (400): Bad Request");
    }
}
