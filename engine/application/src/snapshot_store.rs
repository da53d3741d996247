use async_trait::async_trait;
use engine_domain::{
    ApplyOutcome, EconomicSnapshot, EconomicUpdate, NewsSnapshot, Provider, ProviderHealth,
    SentimentAnalysis,
};
use serde::Serialize;
use shaku::Interface;
use std::collections::BTreeMap;

/// Immutable copy of both snapshots taken under one read lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub economic: EconomicSnapshot,
    pub news: NewsSnapshot,
}

/// Sole owner of the current economic and news state.
///
/// Every mutation is atomic with respect to readers; readers only ever receive
/// copies.
#[async_trait]
pub trait SnapshotStore: Interface {
    /// Applies the valid, in-range fields of `update` and keeps the rest.
    async fn apply_economic_update(&self, update: EconomicUpdate) -> ApplyOutcome;

    /// Replaces the news snapshot when `analysis` covered at least one article.
    async fn apply_news_update(&self, analysis: SentimentAnalysis) -> bool;

    async fn snapshot(&self) -> StoreSnapshot;
}

/// Per-provider health, written by fetchers and read into economic snapshots.
pub trait HealthTracker: Interface {
    fn record(&self, provider: Provider, health: ProviderHealth);

    /// Every known provider, `unknown` until its first recorded attempt.
    fn statuses(&self) -> BTreeMap<Provider, ProviderHealth>;
}
