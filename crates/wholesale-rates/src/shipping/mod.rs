pub mod rates;
mod service;
pub mod wholesale;

pub use service::{ConfigUpdateError, ShippingRateService};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Myshopify domain identifying the merchant tenant. All configuration and
/// rate lookups are partitioned by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopDomain(String);

impl ShopDomain {
    pub fn parse(raw: &str) -> Result<Self, ShopDomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.to_ascii_lowercase().ends_with(".myshopify.com") {
            return Err(ShopDomainError {
                raw: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("'{raw}' is not a *.myshopify.com domain")]
pub struct ShopDomainError {
    raw: String,
}
