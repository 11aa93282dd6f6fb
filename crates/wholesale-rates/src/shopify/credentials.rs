use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::shipping::ShopDomain;

/// Opaque per-shop Admin API capability token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredential(String);

impl AccessCredential {
    /// Wrap a raw token. Blank input yields `None` so empty env vars and
    /// query params never masquerade as credentials.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// The token value stays out of logs and error messages.
impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential(..)")
    }
}

/// Lookup for credentials captured by the OAuth install flow. Injected into
/// the metafield store adapter and any other outbound collaborator.
pub trait CredentialProvider: Send + Sync {
    fn credential_for(&self, shop: &ShopDomain) -> Option<AccessCredential>;
}

/// Process-local token cache, seeded by the OAuth collaborator or by an
/// admin request that carried its own token.
#[derive(Default)]
pub struct ShopTokenCache {
    tokens: Mutex<HashMap<ShopDomain, AccessCredential>>,
}

impl ShopTokenCache {
    pub fn insert(&self, shop: ShopDomain, credential: AccessCredential) {
        let mut guard = self.tokens.lock().expect("token cache mutex poisoned");
        guard.insert(shop, credential);
    }
}

impl CredentialProvider for ShopTokenCache {
    fn credential_for(&self, shop: &ShopDomain) -> Option<AccessCredential> {
        let guard = self.tokens.lock().expect("token cache mutex poisoned");
        guard.get(shop).cloned()
    }
}

/// Candidate credentials for one request, in resolution order.
#[derive(Debug, Default)]
pub struct CredentialSources<'a> {
    pub query: Option<&'a str>,
    pub header: Option<&'a str>,
    pub stored: Option<AccessCredential>,
    pub environment: Option<&'a AccessCredential>,
}

/// Single ordered resolution policy: request query param, request header,
/// cached token, then the environment token. Blank candidates are skipped.
pub fn resolve_credential(sources: CredentialSources<'_>) -> Option<AccessCredential> {
    sources
        .query
        .and_then(AccessCredential::new)
        .or_else(|| sources.header.and_then(AccessCredential::new))
        .or(sources.stored)
        .or_else(|| sources.environment.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(raw: &str) -> AccessCredential {
        AccessCredential::new(raw).expect("non-blank credential")
    }

    #[test]
    fn query_wins_over_everything() {
        let resolved = resolve_credential(CredentialSources {
            query: Some("from-query"),
            header: Some("from-header"),
            stored: Some(credential("from-cache")),
            environment: Some(&credential("from-env")),
        });
        assert_eq!(resolved, Some(credential("from-query")));
    }

    #[test]
    fn falls_through_in_order() {
        let resolved = resolve_credential(CredentialSources {
            header: Some("from-header"),
            stored: Some(credential("from-cache")),
            ..CredentialSources::default()
        });
        assert_eq!(resolved, Some(credential("from-header")));

        let resolved = resolve_credential(CredentialSources {
            stored: Some(credential("from-cache")),
            environment: Some(&credential("from-env")),
            ..CredentialSources::default()
        });
        assert_eq!(resolved, Some(credential("from-cache")));
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let resolved = resolve_credential(CredentialSources {
            query: Some("   "),
            header: Some(""),
            environment: Some(&credential("from-env")),
            ..CredentialSources::default()
        });
        assert_eq!(resolved, Some(credential("from-env")));
    }

    #[test]
    fn resolves_to_none_when_no_source_has_a_token() {
        assert_eq!(resolve_credential(CredentialSources::default()), None);
    }

    #[test]
    fn cache_round_trips_by_shop() {
        let cache = ShopTokenCache::default();
        let shop = ShopDomain::parse("demo-shop.myshopify.com").expect("valid shop");
        assert!(cache.credential_for(&shop).is_none());

        cache.insert(shop.clone(), credential("shpat_example"));
        assert_eq!(cache.credential_for(&shop), Some(credential("shpat_example")));
    }

    #[test]
    fn debug_never_reveals_the_token() {
        let formatted = format!("{:?}", credential("shpat_secret"));
        assert!(!formatted.contains("secret"));
    }
}
