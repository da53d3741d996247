use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream data provider feeding the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Fred,
    AlphaVantage,
    NewsApi,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Fred, Provider::AlphaVantage, Provider::NewsApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Fred => "fred",
            Provider::AlphaVantage => "alpha_vantage",
            Provider::NewsApi => "news_api",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider '{0}'")]
pub struct UnknownProviderError(pub String);

impl FromStr for Provider {
    type Err = UnknownProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fred" => Ok(Provider::Fred),
            "alpha_vantage" => Ok(Provider::AlphaVantage),
            "news_api" => Ok(Provider::NewsApi),
            other => Err(UnknownProviderError(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealth {
    Healthy,
    Error,
    #[default]
    Unknown,
}

impl ProviderHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderHealth::Healthy => "healthy",
            ProviderHealth::Error => "error",
            ProviderHealth::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
        }
        assert_eq!(
            "bloomberg".parse::<Provider>(),
            Err(UnknownProviderError("bloomberg".to_string()))
        );
    }

    #[test]
    fn test_health_map_serializes_with_provider_names() {
        let mut health = BTreeMap::new();
        health.insert(Provider::Fred, ProviderHealth::Healthy);
        health.insert(Provider::NewsApi, ProviderHealth::Error);

        let json = serde_json::to_string(&health).unwrap();
        assert_eq!(json, r#"{"fred":"healthy","news_api":"error"}"#);
    }
}
