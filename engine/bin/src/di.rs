use crate::config::EngineConfig;
use anyhow::{Context, Result};
use engine_application::{
    RefreshServiceImpl, RefreshServiceImplParameters, UbiEngine, UbiEngineImpl,
};
use engine_infrastructure::gateways::alpha_vantage::{
    AlphaVantageClientParameters, ALPHA_VANTAGE_BASE_URL,
};
use engine_infrastructure::gateways::fred::{FredClientParameters, FRED_BASE_URL};
use engine_infrastructure::gateways::news_api::{NewsApiClientParameters, NEWS_API_BASE_URL};
use engine_infrastructure::gateways::simulated::{
    SimulatedNewsClientParameters, SimulatedQuoteClientParameters,
    SimulatedStatisticsClientParameters, DEFAULT_JITTER,
};
use engine_infrastructure::state::memory::InMemorySnapshotStoreParameters;
use engine_infrastructure::{
    build_client, AlphaVantageClient, FredClient, InMemoryHealthTracker, InMemorySnapshotStore,
    NewsApiClient, SimulatedNewsClient, SimulatedQuoteClient, SimulatedStatisticsClient,
};
use shaku::{module, HasComponent};
use std::sync::Arc;

module! {
    pub LiveModule {
        components = [
            InMemoryHealthTracker,
            InMemorySnapshotStore,
            FredClient,
            AlphaVantageClient,
            NewsApiClient,
            RefreshServiceImpl,
            UbiEngineImpl
        ],
        providers = []
    }
}

module! {
    pub OfflineModule {
        components = [
            InMemoryHealthTracker,
            InMemorySnapshotStore,
            SimulatedStatisticsClient,
            SimulatedQuoteClient,
            SimulatedNewsClient,
            RefreshServiceImpl,
            UbiEngineImpl
        ],
        providers = []
    }
}

fn store_parameters(config: &EngineConfig) -> InMemorySnapshotStoreParameters {
    InMemorySnapshotStoreParameters {
        freshness_window_secs: config.freshness_window_secs,
        ..Default::default()
    }
}

fn refresh_parameters(config: &EngineConfig) -> RefreshServiceImplParameters {
    RefreshServiceImplParameters {
        retry_policy: config.retry_policy(),
        derivation: config.cpi,
        news_query: config.news_query.clone(),
        ..Default::default()
    }
}

pub fn create_live_module(config: &EngineConfig) -> Result<LiveModule> {
    let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let key = |k: &Option<String>| k.clone().unwrap_or_default();

    Ok(LiveModule::builder()
        .with_component_parameters::<InMemorySnapshotStore>(store_parameters(config))
        .with_component_parameters::<FredClient>(FredClientParameters {
            client: client.clone(),
            api_key: key(&config.fred_api_key),
            base_url: FRED_BASE_URL.to_string(),
        })
        .with_component_parameters::<AlphaVantageClient>(AlphaVantageClientParameters {
            client: client.clone(),
            api_key: key(&config.alpha_vantage_api_key),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        })
        .with_component_parameters::<NewsApiClient>(NewsApiClientParameters {
            client,
            api_key: key(&config.news_api_key),
            base_url: NEWS_API_BASE_URL.to_string(),
        })
        .with_component_parameters::<RefreshServiceImpl>(refresh_parameters(config))
        .build())
}

pub fn create_offline_module(config: &EngineConfig) -> OfflineModule {
    OfflineModule::builder()
        .with_component_parameters::<InMemorySnapshotStore>(store_parameters(config))
        .with_component_parameters::<SimulatedStatisticsClient>(
            SimulatedStatisticsClientParameters {
                spread: DEFAULT_JITTER,
            },
        )
        .with_component_parameters::<SimulatedQuoteClient>(SimulatedQuoteClientParameters {
            base_price: 575.0,
            spread: DEFAULT_JITTER,
        })
        .with_component_parameters::<SimulatedNewsClient>(SimulatedNewsClientParameters {
            articles_per_search: 5,
        })
        .with_component_parameters::<RefreshServiceImpl>(refresh_parameters(config))
        .build()
}

pub fn build_engine(config: &EngineConfig, offline: bool) -> Result<Arc<dyn UbiEngine>> {
    if offline {
        let module = create_offline_module(config);
        Ok(module.resolve())
    } else {
        let module = create_live_module(config)?;
        Ok(module.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_module_serves_payouts() {
        let engine = build_engine(&EngineConfig::default(), true).unwrap();

        engine.trigger_refresh().await.unwrap();
        let breakdown = engine.compute_payout(None).await.unwrap();

        assert!(breakdown.adjusted_payout > 0);
        assert!(!breakdown.simulated);
    }

    #[tokio::test]
    async fn test_live_module_resolves_without_network() {
        let mut config = EngineConfig::default();
        config.fred_api_key = Some("fred".to_string());
        let engine = build_engine(&config, false).unwrap();

        assert_eq!(engine.scenarios().len(), 3);
        assert_eq!(
            engine.economic_snapshot().await.freshness,
            engine_domain::Freshness::Initializing
        );
    }

    #[test]
    fn test_refresh_parameters_keep_configured_values() {
        let mut config = EngineConfig::default();
        config.max_retries = 1;
        let params = refresh_parameters(&config);

        assert_eq!(params.retry_policy.max_retries, 1);
        assert_eq!(params.news_query, config.news_query);
        assert_eq!(store_parameters(&config).freshness_window_secs, 300);
    }
}
