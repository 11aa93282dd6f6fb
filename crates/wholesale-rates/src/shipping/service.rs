use std::sync::Arc;

use tracing::warn;

use super::rates::engine;
use super::rates::{RateOffer, RateRequest};
use super::wholesale::{
    RuleStore, RuleStoreError, RuleValidationError, WholesaleRule, WholesaleRuleDraft,
};
use super::ShopDomain;

/// Service composing the rule store with the pure quoting rules.
///
/// The quoting path is fail-open: whatever goes wrong while loading the
/// shop's rule, the caller still gets a quote (computed from the default
/// rule) so checkout is never blocked. The configuration path surfaces every
/// failure to the administrative caller.
pub struct ShippingRateService<S> {
    store: Arc<S>,
}

impl<S> ShippingRateService<S>
where
    S: RuleStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Quote shipping options for an inbound carrier callback. `None` for the
    /// shop means the callback carried no usable shop identity; the default
    /// rule applies.
    pub async fn quote(&self, shop: Option<&ShopDomain>, request: &RateRequest) -> Vec<RateOffer> {
        let rule = match shop {
            Some(shop) => self.rule_or_default(shop).await,
            None => WholesaleRule::default(),
        };

        engine::quote(&rule, request)
    }

    async fn rule_or_default(&self, shop: &ShopDomain) -> WholesaleRule {
        match self.store.fetch(shop).await {
            Ok(Some(rule)) => rule,
            Ok(None) => WholesaleRule::default(),
            Err(err) => {
                warn!(%shop, %err, "rule store read failed, quoting with default rule");
                WholesaleRule::default()
            }
        }
    }

    /// The rule currently in effect for a shop: the stored one, or the
    /// built-in default when none was ever written. Storage failures surface.
    pub async fn effective_rule(&self, shop: &ShopDomain) -> Result<WholesaleRule, RuleStoreError> {
        Ok(self.store.fetch(shop).await?.unwrap_or_default())
    }

    /// Validate and persist an updated rule, returning the stored value. No
    /// partial write happens on validation failure.
    pub async fn update_rule(
        &self,
        shop: &ShopDomain,
        draft: WholesaleRuleDraft,
    ) -> Result<WholesaleRule, ConfigUpdateError> {
        let rule = draft.resolve()?;
        self.store.save(shop, &rule).await?;
        Ok(rule)
    }
}

/// Error raised by the configuration path.
#[derive(Debug, thiserror::Error)]
pub enum ConfigUpdateError {
    #[error(transparent)]
    Validation(#[from] RuleValidationError),
    #[error(transparent)]
    Store(#[from] RuleStoreError),
}
