use async_trait::async_trait;
use chrono::Utc;
use engine_application::{HealthTracker, SnapshotStore, StoreSnapshot};
use engine_domain::{
    ApplyOutcome, EconomicState, EconomicUpdate, Freshness, NewsSnapshot, SentimentAnalysis,
    DEFAULT_FRESHNESS_WINDOW_SECS,
};
use shaku::Component;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct StoreState {
    economic: EconomicState,
    news: NewsSnapshot,
}

/// Process-local snapshot store. One lock guards both snapshots, so a reader
/// never sees a partially applied update.
#[derive(Component)]
#[shaku(interface = SnapshotStore)]
pub struct InMemorySnapshotStore {
    #[shaku(inject)]
    health: Arc<dyn HealthTracker>,

    #[shaku(default)]
    state: RwLock<StoreState>,
    #[shaku(default = DEFAULT_FRESHNESS_WINDOW_SECS)]
    freshness_window_secs: u64,
}

impl InMemorySnapshotStore {
    pub fn new(health: Arc<dyn HealthTracker>, freshness_window_secs: u64) -> Self {
        Self {
            health,
            state: RwLock::new(StoreState::default()),
            freshness_window_secs,
        }
    }

    fn freshness_window(&self) -> chrono::Duration {
        i64::try_from(self.freshness_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn apply_economic_update(&self, update: EconomicUpdate) -> ApplyOutcome {
        let mut state = self.state.write().await;
        let outcome = state.economic.apply(&update, Utc::now());

        for rejected in &outcome.rejected {
            warn!(field = %rejected.field, value = %rejected.value, "Rejected out-of-range value");
        }
        debug!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Applied economic update"
        );
        outcome
    }

    async fn apply_news_update(&self, analysis: SentimentAnalysis) -> bool {
        let mut state = self.state.write().await;
        let count = analysis.count;
        let applied = state.news.apply(analysis, Utc::now());
        if !applied {
            debug!("No qualifying articles, keeping previous sentiment");
        } else {
            debug!(count, aggregate = state.news.aggregate_sentiment, "Applied news update");
        }
        applied
    }

    async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        let freshness = Freshness::classify(
            state.economic.last_updated(),
            Utc::now(),
            self.freshness_window(),
        );
        StoreSnapshot {
            economic: state
                .economic
                .to_snapshot(self.health.statuses(), freshness),
            news: state.news.clone(),
        }
    }
}
