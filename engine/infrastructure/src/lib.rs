pub mod gateways;
pub mod state;

pub use gateways::{
    build_client, AlphaVantageClient, FredClient, NewsApiClient, SimulatedNewsClient,
    SimulatedQuoteClient, SimulatedStatisticsClient, DEFAULT_REQUEST_TIMEOUT,
};
pub use state::{InMemoryHealthTracker, InMemorySnapshotStore};
