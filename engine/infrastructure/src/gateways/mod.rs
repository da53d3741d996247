pub mod alpha_vantage;
pub mod fred;
pub mod http;
pub mod news_api;
pub mod simulated;

pub use alpha_vantage::AlphaVantageClient;
pub use fred::FredClient;
pub use http::{build_client, DEFAULT_REQUEST_TIMEOUT};
pub use news_api::NewsApiClient;
pub use simulated::{SimulatedNewsClient, SimulatedQuoteClient, SimulatedStatisticsClient};
