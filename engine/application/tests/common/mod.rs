#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use engine_application::{
    HealthTracker, NewsClient, ProviderClient, ProviderError, QuoteClient, RefreshServiceImpl,
    RetryPolicy, SnapshotStore, StatisticsClient, StoreSnapshot, UbiEngineImpl,
    DEFAULT_NEWS_QUERY,
};
use engine_domain::{
    ApplyOutcome, CpiDerivation, EconomicState, EconomicUpdate, Freshness, NewsSnapshot, Provider,
    ProviderHealth, RawArticle, SentimentAnalysis,
};
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Clone)]
pub enum Behavior {
    Value(&'static str),
    AlwaysTimeout,
    HttpStatus(u16),
    /// Fails with a network error `n` times, then returns the value.
    FlakyThen(u32, &'static str),
}

pub struct ScriptedClient {
    provider: Provider,
    script: HashMap<&'static str, Behavior>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedClient {
    pub fn new(provider: Provider, script: Vec<(&'static str, Behavior)>) -> Self {
        Self {
            provider,
            script: script.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls_for(&self, signal_id: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == signal_id)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((signal_id.to_string(), Instant::now()));
            calls.iter().filter(|(id, _)| id == signal_id).count() as u32
        };

        match self.script.get(signal_id) {
            Some(Behavior::Value(v)) => Ok(v.to_string()),
            Some(Behavior::AlwaysTimeout) => {
                Err(ProviderError::timeout(self.provider, "deadline elapsed"))
            }
            Some(Behavior::HttpStatus(status)) => {
                Err(ProviderError::http(self.provider, *status, "rejected"))
            }
            Some(Behavior::FlakyThen(failures, v)) => {
                if attempt <= *failures {
                    Err(ProviderError::network(self.provider, "connection reset"))
                } else {
                    Ok(v.to_string())
                }
            }
            None => Err(ProviderError::empty(self.provider, "unknown series")),
        }
    }
}

impl StatisticsClient for ScriptedClient {}
impl QuoteClient for ScriptedClient {}

/// Serves one batch per search; the last batch repeats.
pub struct ScriptedNews {
    batches: Mutex<VecDeque<Result<Vec<RawArticle>, ProviderError>>>,
}

impl ScriptedNews {
    pub fn ok(articles: Vec<RawArticle>) -> Self {
        Self::sequence(vec![Ok(articles)])
    }

    pub fn failing() -> Self {
        Self::sequence(vec![Err(ProviderError::http(
            Provider::NewsApi,
            401,
            "apiKeyInvalid",
        ))])
    }

    pub fn sequence(batches: Vec<Result<Vec<RawArticle>, ProviderError>>) -> Self {
        Self {
            batches: Mutex::new(batches.into_iter().collect()),
        }
    }
}

#[async_trait]
impl NewsClient for ScriptedNews {
    fn provider(&self) -> Provider {
        Provider::NewsApi
    }

    async fn search(&self, _query: &str) -> Result<Vec<RawArticle>, ProviderError> {
        let mut batches = self.batches.lock().unwrap();
        if batches.len() > 1 {
            batches.pop_front().unwrap()
        } else {
            batches.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

#[derive(Default)]
pub struct RecordingHealth {
    current: Mutex<BTreeMap<Provider, ProviderHealth>>,
    history: Mutex<Vec<(Provider, ProviderHealth)>>,
}

impl RecordingHealth {
    pub fn history(&self) -> Vec<(Provider, ProviderHealth)> {
        self.history.lock().unwrap().clone()
    }

    pub fn get(&self, provider: Provider) -> ProviderHealth {
        self.statuses()[&provider]
    }
}

impl HealthTracker for RecordingHealth {
    fn record(&self, provider: Provider, health: ProviderHealth) {
        self.current.lock().unwrap().insert(provider, health);
        self.history.lock().unwrap().push((provider, health));
    }

    fn statuses(&self) -> BTreeMap<Provider, ProviderHealth> {
        let current = self.current.lock().unwrap();
        Provider::ALL
            .iter()
            .map(|p| (*p, current.get(p).copied().unwrap_or_default()))
            .collect()
    }
}

pub struct InMemoryStore {
    state: RwLock<(EconomicState, NewsSnapshot)>,
    health: Arc<RecordingHealth>,
}

impl InMemoryStore {
    pub fn new(health: Arc<RecordingHealth>) -> Self {
        Self {
            state: RwLock::new((EconomicState::new(), NewsSnapshot::default())),
            health,
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn apply_economic_update(&self, update: EconomicUpdate) -> ApplyOutcome {
        self.state.write().await.0.apply(&update, Utc::now())
    }

    async fn apply_news_update(&self, analysis: SentimentAnalysis) -> bool {
        self.state.write().await.1.apply(analysis, Utc::now())
    }

    async fn snapshot(&self) -> StoreSnapshot {
        let guard = self.state.read().await;
        let freshness = Freshness::classify(
            guard.0.last_updated(),
            Utc::now(),
            chrono::Duration::minutes(5),
        );
        StoreSnapshot {
            economic: guard.0.to_snapshot(self.health.statuses(), freshness),
            news: guard.1.clone(),
        }
    }
}

pub struct Harness {
    pub statistics: Arc<ScriptedClient>,
    pub quotes: Arc<ScriptedClient>,
    pub health: Arc<RecordingHealth>,
    pub store: Arc<InMemoryStore>,
    pub refresher: Arc<RefreshServiceImpl>,
    pub engine: Arc<UbiEngineImpl>,
}

pub fn healthy_statistics() -> Vec<(&'static str, Behavior)> {
    vec![
        ("UNRATE", Behavior::Value("6.2")),
        ("CPIAUCSL", Behavior::Value("310.0")),
        ("MEHOINUSA646N", Behavior::Value("45000")),
        ("GDP", Behavior::Value("29000.5")),
    ]
}

pub fn harness(
    statistics: Vec<(&'static str, Behavior)>,
    quote: Behavior,
    news: ScriptedNews,
) -> Harness {
    let statistics = Arc::new(ScriptedClient::new(Provider::Fred, statistics));
    let quotes = Arc::new(ScriptedClient::new(
        Provider::AlphaVantage,
        vec![("SPY", quote)],
    ));
    let health = Arc::new(RecordingHealth::default());
    let store = Arc::new(InMemoryStore::new(health.clone()));

    let refresher = Arc::new(RefreshServiceImpl::new(
        statistics.clone(),
        quotes.clone(),
        Arc::new(news),
        store.clone(),
        health.clone(),
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        },
        CpiDerivation::default(),
        DEFAULT_NEWS_QUERY.to_string(),
    ));
    let engine = Arc::new(UbiEngineImpl::new(store.clone(), refresher.clone()));

    Harness {
        statistics,
        quotes,
        health,
        store,
        refresher,
        engine,
    }
}

pub fn article(title: &str, description: &str) -> RawArticle {
    RawArticle {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        source: Some("Reuters".to_string()),
        published_at: Some(Utc::now()),
    }
}
