use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::rule::WholesaleRuleDraft;
use super::store::RuleStore;
use crate::shipping::{ConfigUpdateError, ShippingRateService, ShopDomain};
use crate::shopify::credentials::{
    resolve_credential, AccessCredential, CredentialProvider, CredentialSources, ShopTokenCache,
};

/// Header admin requests may use to carry the Admin API token.
pub const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Shared state for the configuration endpoints: the service plus everything
/// needed to resolve which shop and credential a request acts on.
pub struct WholesaleConfigState<S> {
    pub service: Arc<ShippingRateService<S>>,
    pub tokens: Arc<ShopTokenCache>,
    pub fallback_token: Option<AccessCredential>,
    pub default_shop: Option<ShopDomain>,
}

/// Router builder exposing the wholesale rule configuration endpoints.
pub fn config_router<S>(state: Arc<WholesaleConfigState<S>>) -> Router
where
    S: RuleStore + 'static,
{
    Router::new()
        .route(
            "/api/wholesale/config",
            get(read_config_handler::<S>).post(write_config_handler::<S>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigQuery {
    #[serde(default)]
    shop: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    shop: ShopDomain,
    wholesale_tag: String,
    threshold_cents: i64,
}

pub(crate) async fn read_config_handler<S>(
    State(state): State<Arc<WholesaleConfigState<S>>>,
    Query(query): Query<ConfigQuery>,
    headers: HeaderMap,
) -> Response
where
    S: RuleStore + 'static,
{
    let shop = match resolve_shop(&state, query.shop.as_deref()) {
        Ok(shop) => shop,
        Err(response) => return response,
    };

    // A token on the request is handed to the store's backing credential
    // provider so metafield-backed reads can authenticate.
    if let Some(credential) = request_credential(&state, &shop, query.token.as_deref(), &headers) {
        state.tokens.insert(shop.clone(), credential);
    }

    match state.service.effective_rule(&shop).await {
        Ok(rule) => {
            let view = ConfigView {
                status: None,
                shop,
                wholesale_tag: rule.wholesale_tag,
                threshold_cents: rule.threshold_cents,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => {
            let payload = json!({
                "error": "Failed to load config",
                "message": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn write_config_handler<S>(
    State(state): State<Arc<WholesaleConfigState<S>>>,
    Query(query): Query<ConfigQuery>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    S: RuleStore + 'static,
{
    let shop = match resolve_shop(&state, query.shop.as_deref()) {
        Ok(shop) => shop,
        Err(response) => return response,
    };

    let Some(credential) = request_credential(&state, &shop, query.token.as_deref(), &headers)
    else {
        let payload = json!({ "error": "Missing access token" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };
    state.tokens.insert(shop.clone(), credential);

    let draft = if body.trim().is_empty() {
        WholesaleRuleDraft::default()
    } else {
        match serde_json::from_str::<WholesaleRuleDraft>(&body) {
            Ok(draft) => draft,
            Err(err) => {
                let payload = json!({ "error": format!("Invalid config payload: {err}") });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        }
    };

    match state.service.update_rule(&shop, draft).await {
        Ok(rule) => {
            let view = ConfigView {
                status: Some("saved"),
                shop,
                wholesale_tag: rule.wholesale_tag,
                threshold_cents: rule.threshold_cents,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ConfigUpdateError::Validation(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(ConfigUpdateError::Store(err)) => {
            let payload = json!({
                "error": "Failed to save config",
                "message": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn resolve_shop<S>(
    state: &WholesaleConfigState<S>,
    query_shop: Option<&str>,
) -> Result<ShopDomain, Response> {
    let resolved = match query_shop {
        Some(raw) => ShopDomain::parse(raw).ok(),
        None => state.default_shop.clone(),
    };

    resolved.ok_or_else(|| {
        let payload = json!({ "error": "Missing or invalid ?shop=" });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    })
}

fn request_credential<S>(
    state: &WholesaleConfigState<S>,
    shop: &ShopDomain,
    query_token: Option<&str>,
    headers: &HeaderMap,
) -> Option<AccessCredential> {
    resolve_credential(CredentialSources {
        query: query_token,
        header: headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok()),
        stored: state.tokens.credential_for(shop),
        environment: state.fallback_token.as_ref(),
    })
}
