//! Wholesale shipping rates for merchant shops.
//!
//! The crate answers a commerce platform's carrier-service callback with
//! shipping quotes derived from cart contents and customer tags, and persists
//! the per-shop wholesale rule the quotes are computed from. Storage sits
//! behind the [`shipping::wholesale::RuleStore`] trait so the serving path can
//! run against an in-memory map while production writes through to shop
//! metafields.

pub mod config;
pub mod error;
pub mod shipping;
pub mod shopify;
pub mod telemetry;
