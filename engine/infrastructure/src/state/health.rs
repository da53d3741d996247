use engine_application::HealthTracker;
use engine_domain::{Provider, ProviderHealth};
use shaku::Component;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::info;

#[derive(Component, Default)]
#[shaku(interface = HealthTracker)]
pub struct InMemoryHealthTracker {
    #[shaku(default)]
    statuses: RwLock<BTreeMap<Provider, ProviderHealth>>,
}

impl InMemoryHealthTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HealthTracker for InMemoryHealthTracker {
    fn record(&self, provider: Provider, health: ProviderHealth) {
        let mut statuses = self
            .statuses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = statuses.insert(provider, health);
        if previous.is_some_and(|p| p != health) {
            info!(%provider, from = ?previous, to = ?health, "Provider health changed");
        }
    }

    fn statuses(&self) -> BTreeMap<Provider, ProviderHealth> {
        let statuses = self
            .statuses
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Provider::ALL
            .iter()
            .map(|p| (*p, statuses.get(p).copied().unwrap_or_default()))
            .collect()
    }
}
