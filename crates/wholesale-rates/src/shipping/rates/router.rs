use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::domain::{RateOffer, RateRequest};
use crate::shipping::wholesale::RuleStore;
use crate::shipping::{ShippingRateService, ShopDomain};

/// Header the platform stamps on carrier callbacks to identify the shop.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Router builder exposing the carrier service rate callback.
pub fn rate_router<S>(service: Arc<ShippingRateService<S>>) -> Router
where
    S: RuleStore + 'static,
{
    Router::new()
        .route("/api/shipping-rates", post(rates_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct RatesResponse {
    rates: Vec<RateOffer>,
}

pub(crate) async fn rates_handler<S>(
    State(service): State<Arc<ShippingRateService<S>>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    S: RuleStore + 'static,
{
    let shop = shop_from_headers(&headers);
    debug!(shop = ?shop, "carrier rate callback received");

    match RateRequest::from_body(&body) {
        Ok(request) => {
            let rates = service.quote(shop.as_ref(), &request).await;
            (StatusCode::OK, axum::Json(RatesResponse { rates })).into_response()
        }
        Err(_) => {
            let payload = json!({ "error": "Invalid rate payload" });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

fn shop_from_headers(headers: &HeaderMap) -> Option<ShopDomain> {
    headers
        .get(SHOP_DOMAIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| ShopDomain::parse(raw).ok())
}
