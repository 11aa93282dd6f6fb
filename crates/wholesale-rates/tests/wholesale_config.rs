//! Integration coverage of the wholesale rule configuration endpoints:
//! round-trips, validation failures, credential resolution, and how storage
//! failures surface on the admin path.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use wholesale_rates::shipping::wholesale::{
        RuleStore, RuleStoreError, WholesaleConfigState, WholesaleRule,
    };
    use wholesale_rates::shipping::{ShippingRateService, ShopDomain};
    use wholesale_rates::shopify::{AccessCredential, ShopTokenCache};

    #[derive(Default, Clone)]
    pub(super) struct MemoryRuleStore {
        rules: Arc<Mutex<HashMap<ShopDomain, WholesaleRule>>>,
    }

    impl RuleStore for MemoryRuleStore {
        async fn fetch(&self, shop: &ShopDomain) -> Result<Option<WholesaleRule>, RuleStoreError> {
            let guard = self.rules.lock().expect("lock");
            Ok(guard.get(shop).cloned())
        }

        async fn save(
            &self,
            shop: &ShopDomain,
            rule: &WholesaleRule,
        ) -> Result<(), RuleStoreError> {
            let mut guard = self.rules.lock().expect("lock");
            guard.insert(shop.clone(), rule.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct FailingRuleStore;

    impl RuleStore for FailingRuleStore {
        async fn fetch(
            &self,
            _shop: &ShopDomain,
        ) -> Result<Option<WholesaleRule>, RuleStoreError> {
            Err(RuleStoreError::Unavailable("backend offline".to_string()))
        }

        async fn save(
            &self,
            _shop: &ShopDomain,
            _rule: &WholesaleRule,
        ) -> Result<(), RuleStoreError> {
            Err(RuleStoreError::Unavailable("backend offline".to_string()))
        }
    }

    pub(super) fn shop() -> ShopDomain {
        ShopDomain::parse("demo-shop.myshopify.com").expect("valid shop")
    }

    pub(super) fn config_state<S>(
        store: S,
        fallback_token: Option<&str>,
        default_shop: Option<ShopDomain>,
    ) -> Arc<WholesaleConfigState<S>>
    where
        S: RuleStore + 'static,
    {
        Arc::new(WholesaleConfigState {
            service: Arc::new(ShippingRateService::new(Arc::new(store))),
            tokens: Arc::new(ShopTokenCache::default()),
            fallback_token: fallback_token.and_then(AccessCredential::new),
            default_shop,
        })
    }
}

mod config {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wholesale_rates::shipping::wholesale::config_router;

    async fn dispatch(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("router dispatch");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json");
        (status, payload)
    }

    fn write_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn read_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn write_then_read_round_trips_the_rule() {
        let state = config_state(MemoryRuleStore::default(), None, None);
        let uri = format!(
            "/api/wholesale/config?shop={}&token=shpat_test",
            shop().as_str()
        );

        let (status, payload) = dispatch(
            config_router(state.clone()),
            write_request(&uri, json!({ "wholesaleTag": "  VIP  ", "thresholdCents": 50_000 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "saved");
        assert_eq!(payload["shop"], shop().as_str());
        assert_eq!(payload["wholesaleTag"], "VIP");
        assert_eq!(payload["thresholdCents"], 50_000);

        let (status, payload) =
            dispatch(config_router(state), read_request(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["wholesaleTag"], "VIP");
        assert_eq!(payload["thresholdCents"], 50_000);
        assert!(payload.get("status").is_none());
    }

    #[tokio::test]
    async fn unconfigured_shop_reads_the_default_rule() {
        let state = config_state(MemoryRuleStore::default(), None, None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(config_router(state), read_request(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["wholesaleTag"], "Wholesaler");
        assert_eq!(payload["thresholdCents"], 100_000);
    }

    #[tokio::test]
    async fn invalid_threshold_is_rejected_without_a_partial_write() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(
            config_router(state.clone()),
            write_request(&uri, json!({ "thresholdCents": -5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .contains("thresholdCents"));

        // The prior (default) value is still what reads observe.
        let (status, payload) = dispatch(config_router(state), read_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["thresholdCents"], 100_000);
    }

    #[tokio::test]
    async fn blank_tag_is_rejected() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(
            config_router(state),
            write_request(&uri, json!({ "wholesaleTag": "   " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.get("error").is_some());
    }

    #[tokio::test]
    async fn write_without_any_credential_is_a_400() {
        let state = config_state(MemoryRuleStore::default(), None, None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(
            config_router(state),
            write_request(&uri, json!({ "thresholdCents": 50_000 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Missing access token");
    }

    #[tokio::test]
    async fn header_token_satisfies_the_credential_requirement() {
        let state = config_state(MemoryRuleStore::default(), None, None);
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/wholesale/config?shop={}", shop().as_str()))
            .header("content-type", "application/json")
            .header("x-shopify-access-token", "shpat_from_header")
            .body(Body::from(json!({ "thresholdCents": 25_000 }).to_string()))
            .expect("request");

        let (status, payload) = dispatch(config_router(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["thresholdCents"], 25_000);
    }

    #[tokio::test]
    async fn missing_shop_without_a_default_is_a_400() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);

        let (status, payload) = dispatch(
            config_router(state),
            write_request("/api/wholesale/config", json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Missing or invalid ?shop=");
    }

    #[tokio::test]
    async fn non_shopify_shop_parameter_is_a_400() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);

        let (status, _) = dispatch(
            config_router(state),
            read_request("/api/wholesale/config?shop=example.com"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn configured_default_shop_fills_in_for_a_missing_parameter() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), Some(shop()));

        let (status, payload) = dispatch(
            config_router(state),
            write_request("/api/wholesale/config", json!({ "thresholdCents": 75_000 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["shop"], shop().as_str());
        assert_eq!(payload["thresholdCents"], 75_000);
    }

    #[tokio::test]
    async fn storage_failure_on_write_surfaces_as_500() {
        let state = config_state(FailingRuleStore, Some("shpat_test"), None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(
            config_router(state),
            write_request(&uri, json!({ "thresholdCents": 50_000 })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], "Failed to save config");
    }

    #[tokio::test]
    async fn wrongly_typed_payload_is_a_400() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);
        let uri = format!("/api/wholesale/config?shop={}", shop().as_str());

        let (status, payload) = dispatch(
            config_router(state),
            write_request(&uri, json!({ "wholesaleTag": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .starts_with("Invalid config payload"));
    }

    #[tokio::test]
    async fn empty_body_writes_the_default_rule() {
        let state = config_state(MemoryRuleStore::default(), Some("shpat_test"), None);
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/wholesale/config?shop={}", shop().as_str()))
            .body(Body::empty())
            .expect("request");

        let (status, payload) = dispatch(config_router(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["wholesaleTag"], "Wholesaler");
        assert_eq!(payload["thresholdCents"], 100_000);
    }
}
