use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::shipping::{ShopDomain, ShopDomainError};
use crate::shopify::credentials::AccessCredential;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Which backend the rule store writes through to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStoreBackend {
    Memory,
    Metafields,
}

impl RuleStoreBackend {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "metafields" | "shopify" => Self::Metafields,
            _ => Self::Memory,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub shopify: ShopifyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            shopify: ShopifyConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Platform-facing settings: which store backend to use and the fallback
/// shop/credential an unscoped admin request resolves to.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub backend: RuleStoreBackend,
    pub default_shop: Option<ShopDomain>,
    pub access_token: Option<AccessCredential>,
    pub api_version: String,
}

impl ShopifyConfig {
    fn load() -> Result<Self, ConfigError> {
        let backend =
            RuleStoreBackend::from_str(&env::var("RULE_STORE").unwrap_or_else(|_| String::new()));

        let default_shop = match env::var("SHOPIFY_SHOP_DOMAIN") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                ShopDomain::parse(&raw).map_err(|source| ConfigError::InvalidShop { source })?,
            ),
            _ => None,
        };

        let access_token = env::var("SHOPIFY_ACCESS_TOKEN")
            .ok()
            .and_then(AccessCredential::new);

        let api_version =
            env::var("SHOPIFY_API_VERSION").unwrap_or_else(|_| "2023-10".to_string());

        Ok(Self {
            backend,
            default_shop,
            access_token,
            api_version,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidShop { source: ShopDomainError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidShop { .. } => {
                write!(f, "SHOPIFY_SHOP_DOMAIN must be a *.myshopify.com domain")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidShop { source } => Some(source),
        }
    }
}
