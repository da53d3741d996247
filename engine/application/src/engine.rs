use crate::refresh::{RefreshError, RefreshReport, RefreshService, RefreshState};
use crate::snapshot_store::SnapshotStore;
use async_trait::async_trait;
use chrono::Utc;
use engine_domain::{
    calculate_payout, confidence_score, EconomicOverrides, EconomicSnapshot, InvalidInputError,
    NewsSnapshot, PayoutBreakdown, Scenario,
};
use shaku::{Component, Interface};
use std::sync::Arc;
use tracing::warn;

/// Entry points consumed by the transport layer and the schedulers.
#[async_trait]
pub trait UbiEngine: Interface {
    async fn economic_snapshot(&self) -> EconomicSnapshot;

    async fn news_snapshot(&self) -> NewsSnapshot;

    /// Computes a payout from the live snapshots. With overrides the calculation
    /// runs on a merged copy (simulation mode); the stored snapshot is never touched
    /// and sentiment always comes from the live news snapshot.
    async fn compute_payout(
        &self,
        overrides: Option<EconomicOverrides>,
    ) -> Result<PayoutBreakdown, PayoutError>;

    /// Shared by the periodic scheduler and manual refresh requests.
    async fn trigger_refresh(&self) -> Result<RefreshReport, RefreshError>;

    fn refresh_state(&self) -> RefreshState;

    fn scenarios(&self) -> Vec<Scenario>;
}

#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error("Invalid payout input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

#[derive(Component)]
#[shaku(interface = UbiEngine)]
pub struct UbiEngineImpl {
    #[shaku(inject)]
    store: Arc<dyn SnapshotStore>,

    #[shaku(inject)]
    refresher: Arc<dyn RefreshService>,
}

impl UbiEngineImpl {
    pub fn new(store: Arc<dyn SnapshotStore>, refresher: Arc<dyn RefreshService>) -> Self {
        Self { store, refresher }
    }
}

#[async_trait]
impl UbiEngine for UbiEngineImpl {
    async fn economic_snapshot(&self) -> EconomicSnapshot {
        self.store.snapshot().await.economic
    }

    async fn news_snapshot(&self) -> NewsSnapshot {
        self.store.snapshot().await.news
    }

    async fn compute_payout(
        &self,
        overrides: Option<EconomicOverrides>,
    ) -> Result<PayoutBreakdown, PayoutError> {
        let snapshot = self.store.snapshot().await;
        let economic = &snapshot.economic;

        let confidence = confidence_score(
            &economic.provider_health,
            economic.freshness,
            economic.fallback_fields.len(),
        );

        let overrides = overrides.filter(|o| !o.is_empty());
        let indicators = match &overrides {
            Some(o) => economic.indicators.with_overrides(o),
            None => economic.indicators.clone(),
        };

        let mut breakdown = calculate_payout(
            &indicators,
            snapshot.news.aggregate_sentiment,
            confidence,
            Utc::now(),
        )
        .inspect_err(|e| warn!(error = %e, "Rejected payout request"))?;

        breakdown.simulated = overrides.is_some();
        Ok(breakdown)
    }

    async fn trigger_refresh(&self) -> Result<RefreshReport, RefreshError> {
        self.refresher.refresh().await
    }

    fn refresh_state(&self) -> RefreshState {
        self.refresher.state()
    }

    fn scenarios(&self) -> Vec<Scenario> {
        Scenario::library()
    }
}
