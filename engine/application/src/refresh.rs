use crate::ports::{NewsClient, ProviderError, QuoteClient, StatisticsClient};
use crate::retry::{FetchError, RetryPolicy, RetryingFetcher};
use crate::snapshot_store::{HealthTracker, SnapshotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_domain::{
    analyze, ApplyOutcome, CpiDerivation, EconomicUpdate, Provider, ProviderHealth, RawArticle,
    Signal,
};
use futures::future::join_all;
use serde::Serialize;
use shaku::{Component, Interface};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_NEWS_QUERY: &str =
    "unemployment OR inflation OR economy OR \"federal reserve\"";

#[async_trait]
pub trait RefreshService: Interface {
    /// Runs one full refresh cycle. Individual signal failures are reported, not
    /// raised.
    async fn refresh(&self) -> Result<RefreshReport, RefreshError>;

    fn state(&self) -> RefreshState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Applied,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalOutcome {
    pub signal: Signal,
    pub provider: Provider,
    pub status: SignalStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub signals: Vec<SignalOutcome>,
    pub articles_analyzed: usize,
    pub news_updated: bool,
}

impl RefreshReport {
    pub fn failed_signals(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| s.status != SignalStatus::Applied)
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Refresh task for {task} did not complete: {reason}")]
    TaskFailed { task: String, reason: String },
}

#[derive(Component)]
#[shaku(interface = RefreshService)]
pub struct RefreshServiceImpl {
    #[shaku(inject)]
    statistics: Arc<dyn StatisticsClient>,

    #[shaku(inject)]
    quotes: Arc<dyn QuoteClient>,

    #[shaku(inject)]
    news: Arc<dyn NewsClient>,

    #[shaku(inject)]
    store: Arc<dyn SnapshotStore>,

    #[shaku(inject)]
    health: Arc<dyn HealthTracker>,

    #[shaku(default)]
    retry_policy: RetryPolicy,
    #[shaku(default)]
    derivation: CpiDerivation,
    #[shaku(default = DEFAULT_NEWS_QUERY.to_string())]
    news_query: String,
    #[shaku(default)]
    in_flight: AtomicUsize,
}

impl RefreshServiceImpl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        statistics: Arc<dyn StatisticsClient>,
        quotes: Arc<dyn QuoteClient>,
        news: Arc<dyn NewsClient>,
        store: Arc<dyn SnapshotStore>,
        health: Arc<dyn HealthTracker>,
        retry_policy: RetryPolicy,
        derivation: CpiDerivation,
        news_query: String,
    ) -> Self {
        Self {
            statistics,
            quotes,
            news,
            store,
            health,
            retry_policy,
            derivation,
            news_query,
            in_flight: AtomicUsize::new(0),
        }
    }

    fn spawn_signal_fetches(&self) -> Vec<(Signal, JoinHandle<Result<String, FetchError>>)> {
        let statistics = Arc::new(RetryingFetcher::new(
            self.statistics.clone(),
            self.health.clone(),
            self.retry_policy.clone(),
        ));
        let quotes = Arc::new(RetryingFetcher::new(
            self.quotes.clone(),
            self.health.clone(),
            self.retry_policy.clone(),
        ));

        Signal::ECONOMIC
            .into_iter()
            .map(|signal| {
                let handle = match signal.provider() {
                    Provider::AlphaVantage => {
                        let fetcher = quotes.clone();
                        tokio::spawn(async move { fetcher.fetch(signal.series_id()).await })
                    }
                    _ => {
                        let fetcher = statistics.clone();
                        tokio::spawn(async move { fetcher.fetch(signal.series_id()).await })
                    }
                };
                (signal, handle)
            })
            .collect()
    }

    fn spawn_news_fetch(&self) -> JoinHandle<Result<Vec<RawArticle>, ProviderError>> {
        let client = self.news.clone();
        let health = self.health.clone();
        let query = self.news_query.clone();

        tokio::spawn(async move {
            let provider = client.provider();
            let result = client.search(&query).await;
            match &result {
                Ok(_) => health.record(provider, ProviderHealth::Healthy),
                Err(err) => {
                    warn!(%provider, error = %err, "News fetch failed");
                    health.record(provider, ProviderHealth::Error);
                }
            }
            result
        })
    }

    fn collect_signals(
        &self,
        results: Vec<(Signal, Result<String, FetchError>)>,
    ) -> (EconomicUpdate, Vec<SignalOutcome>) {
        let mut update = EconomicUpdate::default();
        let mut outcomes = Vec::with_capacity(results.len());

        for (signal, result) in results {
            let failure = match result {
                Ok(raw) => match signal.to_update(&raw, &self.derivation) {
                    Ok(partial) => {
                        update.merge(partial);
                        None
                    }
                    Err(err) => Some((SignalStatus::Rejected, err.to_string())),
                },
                Err(err) => Some((SignalStatus::Failed, err.to_string())),
            };

            // Parsed signals are settled once the store has validated them.
            let (status, detail) = match failure {
                Some((status, detail)) => (status, Some(detail)),
                None => (SignalStatus::Applied, None),
            };
            outcomes.push(SignalOutcome {
                signal,
                provider: signal.provider(),
                status,
                detail,
            });
        }

        (update, outcomes)
    }
}

fn settle_outcomes(outcomes: &mut [SignalOutcome], applied: &ApplyOutcome) {
    for outcome in outcomes.iter_mut() {
        if outcome.status != SignalStatus::Applied {
            continue;
        }
        let accepted = outcome
            .signal
            .fields()
            .iter()
            .any(|field| applied.accepted.contains(field));
        if !accepted {
            outcome.status = SignalStatus::Rejected;
            outcome.detail = Some("value outside the signal's domain bounds".to_string());
        }
    }
}

#[async_trait]
impl RefreshService for RefreshServiceImpl {
    async fn refresh(&self) -> Result<RefreshReport, RefreshError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%cycle_id, "Starting refresh cycle");

        let signal_tasks = self.spawn_signal_fetches();
        let news_task = self.spawn_news_fetch();

        let (signals, handles): (Vec<Signal>, Vec<_>) = signal_tasks.into_iter().unzip();
        let (signal_results, news_result) = tokio::join!(join_all(handles), news_task);

        let mut results = Vec::with_capacity(signals.len());
        for (signal, joined) in signals.into_iter().zip(signal_results) {
            let result = joined.map_err(|e| RefreshError::TaskFailed {
                task: signal.to_string(),
                reason: e.to_string(),
            })?;
            results.push((signal, result));
        }
        let articles = news_result.map_err(|e| RefreshError::TaskFailed {
            task: "news".to_string(),
            reason: e.to_string(),
        })?;

        let (update, mut outcomes) = self.collect_signals(results);
        let applied = self.store.apply_economic_update(update).await;
        settle_outcomes(&mut outcomes, &applied);

        let analysis = analyze(&articles.unwrap_or_default());
        let articles_analyzed = analysis.count;
        let news_updated = self.store.apply_news_update(analysis).await;

        let report = RefreshReport {
            cycle_id,
            started_at,
            finished_at: Utc::now(),
            signals: outcomes,
            articles_analyzed,
            news_updated,
        };

        info!(
            %cycle_id,
            applied = report.signals.len() - report.failed_signals(),
            failed = report.failed_signals(),
            articles_analyzed,
            news_updated,
            "Refresh cycle finished"
        );
        Ok(report)
    }

    fn state(&self) -> RefreshState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }
}

/// Marks a cycle as in flight until dropped, including on early return.
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
