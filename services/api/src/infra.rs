use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use wholesale_rates::shipping::wholesale::{RuleStore, RuleStoreError, WholesaleRule};
use wholesale_rates::shipping::ShopDomain;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local rule store for development and the demo command. Writes are
/// last-write-wins; reads see whatever was stored most recently.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRuleStore {
    rules: Arc<Mutex<HashMap<ShopDomain, WholesaleRule>>>,
}

impl RuleStore for InMemoryRuleStore {
    async fn fetch(&self, shop: &ShopDomain) -> Result<Option<WholesaleRule>, RuleStoreError> {
        let guard = self.rules.lock().expect("rule store mutex poisoned");
        Ok(guard.get(shop).cloned())
    }

    async fn save(&self, shop: &ShopDomain, rule: &WholesaleRule) -> Result<(), RuleStoreError> {
        let mut guard = self.rules.lock().expect("rule store mutex poisoned");
        guard.insert(shop.clone(), rule.clone());
        Ok(())
    }
}
