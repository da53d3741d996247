use crate::ports::{ProviderClient, ProviderError};
use crate::snapshot_store::HealthTracker;
use engine_domain::ProviderHealth;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each retry after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (1-based): base, 2 x base, 4 x base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{provider} gave up on {signal} after {attempts} attempts: {last}")]
    Exhausted {
        provider: engine_domain::Provider,
        signal: String,
        attempts: u32,
        #[source]
        last: ProviderError,
    },

    #[error("{0}")]
    Permanent(#[from] ProviderError),
}

/// Wraps a [`ProviderClient`] with bounded exponential-backoff retry and records
/// the provider's health after the call settles.
pub struct RetryingFetcher<P: ?Sized> {
    client: Arc<P>,
    health: Arc<dyn HealthTracker>,
    policy: RetryPolicy,
}

impl<P: ProviderClient + ?Sized> RetryingFetcher<P> {
    pub fn new(client: Arc<P>, health: Arc<dyn HealthTracker>, policy: RetryPolicy) -> Self {
        Self {
            client,
            health,
            policy,
        }
    }

    pub async fn fetch(&self, signal_id: &str) -> Result<String, FetchError> {
        self.fetch_with_retry(signal_id, self.policy.max_retries).await
    }

    /// Tries once, then up to `max_retries` more times for transient failures.
    pub async fn fetch_with_retry(
        &self,
        signal_id: &str,
        max_retries: u32,
    ) -> Result<String, FetchError> {
        let provider = self.client.provider();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.client.fetch(signal_id).await {
                Ok(value) => {
                    debug!(%provider, signal_id, attempt, "Provider call succeeded");
                    self.health.record(provider, ProviderHealth::Healthy);
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt <= max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        %provider,
                        signal_id,
                        attempt,
                        ?delay,
                        error = %err,
                        "Transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_transient() => {
                    warn!(%provider, signal_id, attempt, error = %err, "Retries exhausted");
                    self.health.record(provider, ProviderHealth::Error);
                    return Err(FetchError::Exhausted {
                        provider,
                        signal: signal_id.to_string(),
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    warn!(%provider, signal_id, error = %err, "Permanent provider failure");
                    self.health.record(provider, ProviderHealth::Error);
                    return Err(FetchError::Permanent(err));
                }
            }
        }
    }
}
