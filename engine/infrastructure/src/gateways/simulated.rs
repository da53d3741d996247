//! Offline stand-ins for the live providers.
//!
//! Values wander around recent real-world levels so the engine produces
//! plausible payouts without network access or API keys.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use engine_application::{
    NewsClient, ProviderClient, ProviderError, QuoteClient, StatisticsClient,
};
use engine_domain::{Provider, RawArticle};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use shaku::Component;
use tracing::debug;

/// Relative jitter applied to every simulated value.
pub const DEFAULT_JITTER: f64 = 0.02;

const HEADLINES: &[(&str, &str)] = &[
    (
        "Hiring picks up as labor market shows resilient growth",
        "Employers added more jobs than expected, a positive sign for household income.",
    ),
    (
        "Consumer prices ease for a second month",
        "Relief at the grocery store as inflation concerns fade.",
    ),
    (
        "Factory layoffs spread across the Midwest",
        "Workers worry about a slowdown as orders decline.",
    ),
    (
        "Federal Reserve signals patience on rates",
        "Officials see stable conditions but warn of risks from debt levels.",
    ),
    (
        "Rent burden hits record for young workers",
        "Housing costs strain budgets and deepen hardship in large cities.",
    ),
    (
        "Retail sales rebound on strong holiday demand",
        "Shoppers returned with confidence, boosting profits for major chains.",
    ),
    (
        "Small businesses report uncertainty over supply costs",
        "Owners cite volatile input prices and a shortage of skilled labor.",
    ),
];

fn jitter(base: f64, spread: f64) -> f64 {
    let spread = spread.abs();
    let mut rng = rand::rng();
    base * (1.0 + rng.random_range(-spread..=spread))
}

/// Macroeconomic series around early-2025 levels.
#[derive(Component)]
#[shaku(interface = StatisticsClient)]
pub struct SimulatedStatisticsClient {
    #[shaku(default = DEFAULT_JITTER)]
    spread: f64,
}

impl SimulatedStatisticsClient {
    pub fn new(spread: f64) -> Self {
        Self { spread }
    }

    fn baseline(series_id: &str) -> Option<(f64, usize)> {
        match series_id {
            "UNRATE" => Some((4.1, 1)),
            "CPIAUCSL" => Some((319.1, 3)),
            "MEHOINUSA646N" => Some((80_610.0, 0)),
            "GDP" => Some((29_723.9, 1)),
            _ => None,
        }
    }
}

#[async_trait]
impl ProviderClient for SimulatedStatisticsClient {
    fn provider(&self) -> Provider {
        Provider::Fred
    }

    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError> {
        let (base, precision) = Self::baseline(signal_id).ok_or_else(|| {
            ProviderError::empty(Provider::Fred, format!("unknown series {}", signal_id))
        })?;
        let value = format!("{:.*}", precision, jitter(base, self.spread));
        debug!(signal_id, %value, "Simulated observation");
        Ok(value)
    }
}

impl StatisticsClient for SimulatedStatisticsClient {}

#[derive(Component)]
#[shaku(interface = QuoteClient)]
pub struct SimulatedQuoteClient {
    #[shaku(default = 575.0)]
    base_price: f64,
    #[shaku(default = DEFAULT_JITTER)]
    spread: f64,
}

impl SimulatedQuoteClient {
    pub fn new(base_price: f64, spread: f64) -> Self {
        Self { base_price, spread }
    }
}

#[async_trait]
impl ProviderClient for SimulatedQuoteClient {
    fn provider(&self) -> Provider {
        Provider::AlphaVantage
    }

    async fn fetch(&self, signal_id: &str) -> Result<String, ProviderError> {
        let price = Decimal::from_f64_retain(jitter(self.base_price, self.spread))
            .map(|p| p.round_dp(4))
            .ok_or_else(|| ProviderError::empty(Provider::AlphaVantage, "price out of range"))?;
        debug!(signal_id, %price, "Simulated quote");
        Ok(price.to_string())
    }
}

impl QuoteClient for SimulatedQuoteClient {}

/// Serves a shuffled subset of canned headlines, newest first.
#[derive(Component)]
#[shaku(interface = NewsClient)]
pub struct SimulatedNewsClient {
    #[shaku(default = 5)]
    articles_per_search: usize,
}

impl SimulatedNewsClient {
    pub fn new(articles_per_search: usize) -> Self {
        Self {
            articles_per_search,
        }
    }

    fn draw(&self) -> Vec<RawArticle> {
        let mut rng = rand::rng();
        let mut pool: Vec<&(&str, &str)> = HEADLINES.iter().collect();
        pool.shuffle(&mut rng);

        let now = Utc::now();
        pool.into_iter()
            .take(self.articles_per_search)
            .enumerate()
            .map(|(i, (title, description))| RawArticle {
                title: Some(title.to_string()),
                description: Some(description.to_string()),
                source: Some("Simulated Wire".to_string()),
                published_at: Some(now - Duration::minutes(15 * i as i64)),
            })
            .collect()
    }
}

#[async_trait]
impl NewsClient for SimulatedNewsClient {
    fn provider(&self) -> Provider {
        Provider::NewsApi
    }

    async fn search(&self, query: &str) -> Result<Vec<RawArticle>, ProviderError> {
        let articles = self.draw();
        debug!(query, count = articles.len(), "Simulated news search");
        Ok(articles)
    }
}
