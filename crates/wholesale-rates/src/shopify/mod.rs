//! Adapters for the commerce platform this service integrates with:
//! credential plumbing populated by the OAuth install flow, and the
//! metafield-backed rule store.

pub mod credentials;
pub mod metafields;

pub use credentials::{
    resolve_credential, AccessCredential, CredentialProvider, CredentialSources, ShopTokenCache,
};
pub use metafields::{MetafieldRuleStore, METAFIELD_KEY, METAFIELD_NAMESPACE};
