pub mod confidence;
pub mod economic;
pub mod freshness;
pub mod news;
pub mod payout;
pub mod provider;
pub mod scenario;
pub mod sentiment;
pub mod signal;

pub use confidence::confidence_score;
pub use economic::{
    ApplyOutcome, Bounds, EconomicField, EconomicIndicators, EconomicOverrides, EconomicSnapshot,
    EconomicState, EconomicUpdate, RejectedField,
};
pub use freshness::{Freshness, DEFAULT_FRESHNESS_WINDOW_SECS};
pub use news::{NewsSnapshot, RawArticle, ScoredArticle};
pub use payout::{
    calculate_payout, group_thousands, round_half_up, InvalidInputError, PayoutBreakdown,
    PayoutFactors,
};
pub use provider::{Provider, ProviderHealth, UnknownProviderError};
pub use scenario::Scenario;
pub use sentiment::{analyze, SentimentAnalysis};
pub use signal::{CpiDerivation, Signal, SignalParseError};
