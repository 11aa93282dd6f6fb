use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRuleStore};
use crate::routes::with_shipping_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use wholesale_rates::config::{AppConfig, RuleStoreBackend};
use wholesale_rates::error::AppError;
use wholesale_rates::shipping::wholesale::{RuleStore, WholesaleConfigState};
use wholesale_rates::shipping::ShippingRateService;
use wholesale_rates::shopify::{MetafieldRuleStore, ShopTokenCache};
use wholesale_rates::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let tokens = Arc::new(ShopTokenCache::default());
    if let (Some(shop), Some(token)) = (
        config.shopify.default_shop.clone(),
        config.shopify.access_token.clone(),
    ) {
        tokens.insert(shop, token);
    }

    match config.shopify.backend {
        RuleStoreBackend::Metafields => {
            let store = Arc::new(MetafieldRuleStore::new(
                config.shopify.api_version.clone(),
                tokens.clone(),
            ));
            serve(config, tokens, store).await
        }
        RuleStoreBackend::Memory => {
            let store = Arc::new(InMemoryRuleStore::default());
            serve(config, tokens, store).await
        }
    }
}

async fn serve<S>(
    config: AppConfig,
    tokens: Arc<ShopTokenCache>,
    store: Arc<S>,
) -> Result<(), AppError>
where
    S: RuleStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(ShippingRateService::new(store));
    let config_state = Arc::new(WholesaleConfigState {
        service: service.clone(),
        tokens,
        fallback_token: config.shopify.access_token.clone(),
        default_shop: config.shopify.default_shop.clone(),
    });

    let app = with_shipping_routes(service, config_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "wholesale shipping rate service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
