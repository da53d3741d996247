use crate::freshness::Freshness;
use crate::provider::{Provider, ProviderHealth};
use std::collections::BTreeMap;

const FALLBACK_PENALTY: f64 = 0.9;

fn health_weight(health: ProviderHealth) -> f64 {
    match health {
        ProviderHealth::Healthy => 1.0,
        ProviderHealth::Unknown => 0.5,
        ProviderHealth::Error => 0.0,
    }
}

fn freshness_weight(freshness: Freshness) -> f64 {
    match freshness {
        Freshness::Fresh => 1.0,
        Freshness::Stale => 0.6,
        Freshness::Initializing => 0.3,
    }
}

/// Trust in a payout figure, in [0, 1], rounded to two decimals.
///
/// Providers missing from `health` count as `unknown`.
pub fn confidence_score(
    health: &BTreeMap<Provider, ProviderHealth>,
    freshness: Freshness,
    fallback_fields: usize,
) -> f64 {
    let provider_mean = Provider::ALL
        .iter()
        .map(|p| health_weight(health.get(p).copied().unwrap_or_default()))
        .sum::<f64>()
        / Provider::ALL.len() as f64;

    let score = provider_mean
        * freshness_weight(freshness)
        * FALLBACK_PENALTY.powi(fallback_fields as i32);

    (score.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(health: ProviderHealth) -> BTreeMap<Provider, ProviderHealth> {
        Provider::ALL.iter().map(|p| (*p, health)).collect()
    }

    #[test]
    fn test_all_healthy_and_fresh_is_full_confidence() {
        assert_eq!(confidence_score(&all(ProviderHealth::Healthy), Freshness::Fresh, 0), 1.0);
    }

    #[test]
    fn test_all_errors_is_zero() {
        assert_eq!(confidence_score(&all(ProviderHealth::Error), Freshness::Fresh, 0), 0.0);
    }

    #[test]
    fn test_missing_providers_count_as_unknown() {
        let score = confidence_score(&BTreeMap::new(), Freshness::Initializing, 4);
        // 0.5 * 0.3 * 0.9^4
        assert_eq!(score, 0.1);
    }

    #[test]
    fn test_staleness_and_one_failure_reduce_confidence() {
        let mut health = all(ProviderHealth::Healthy);
        health.insert(Provider::NewsApi, ProviderHealth::Error);

        let fresh = confidence_score(&health, Freshness::Fresh, 0);
        let stale = confidence_score(&health, Freshness::Stale, 0);

        assert_eq!(fresh, 0.67);
        assert_eq!(stale, 0.4);
    }
}
