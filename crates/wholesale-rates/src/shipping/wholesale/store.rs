use std::future::Future;

use super::rule::WholesaleRule;
use crate::shipping::ShopDomain;

/// Storage abstraction so rate quoting and configuration can be exercised in
/// isolation. Implementations must be safe to share across concurrent
/// requests; last write wins, and in-flight reads may observe either value.
pub trait RuleStore: Send + Sync {
    /// The stored rule for the shop, or `None` if never configured. A missing
    /// record is a normal outcome, not an error.
    fn fetch(
        &self,
        shop: &ShopDomain,
    ) -> impl Future<Output = Result<Option<WholesaleRule>, RuleStoreError>> + Send;

    /// Persist an already-validated rule. A subsequent `fetch` for the same
    /// shop observes the new value.
    fn save(
        &self,
        shop: &ShopDomain,
        rule: &WholesaleRule,
    ) -> impl Future<Output = Result<(), RuleStoreError>> + Send;
}

/// Error enumeration for rule store failures. Transient failures are not
/// retried here; the caller decides.
#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
    #[error("rule store rejected the operation: {0}")]
    Rejected(String),
}
