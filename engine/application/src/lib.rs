pub mod engine;
pub mod ports;
pub mod refresh;
pub mod retry;
pub mod snapshot_store;

pub use engine::{PayoutError, UbiEngine, UbiEngineImpl};
pub use ports::{
    NewsClient, ProviderClient, ProviderError, ProviderErrorKind, QuoteClient, StatisticsClient,
};
pub use refresh::{
    RefreshError, RefreshReport, RefreshService, RefreshServiceImpl, RefreshServiceImplParameters,
    RefreshState, SignalOutcome, SignalStatus, DEFAULT_NEWS_QUERY,
};
pub use retry::{FetchError, RetryPolicy, RetryingFetcher};
pub use snapshot_store::{HealthTracker, SnapshotStore, StoreSnapshot};
