use std::sync::Arc;

use serde_json::{json, Value};

use super::credentials::CredentialProvider;
use crate::shipping::wholesale::{RuleStore, RuleStoreError, WholesaleRule};
use crate::shipping::ShopDomain;

pub const METAFIELD_NAMESPACE: &str = "wholesale";
pub const METAFIELD_KEY: &str = "shipping_rules";

const RULE_QUERY: &str = r#"
query WholesaleShippingRule($namespace: String!, $key: String!) {
  shop {
    metafield(namespace: $namespace, key: $key) {
      value
    }
  }
}"#;

const SHOP_ID_QUERY: &str = "query { shop { id } }";

const RULE_MUTATION: &str = r#"
mutation SetWholesaleShippingRule($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    userErrors {
      field
      message
    }
  }
}"#;

/// Rule store backed by a shop metafield on the Admin GraphQL API. One `json`
/// metafield per shop holds the serialized rule; consistency across instances
/// is whatever the platform provides.
pub struct MetafieldRuleStore<C> {
    http: reqwest::Client,
    api_version: String,
    credentials: Arc<C>,
}

impl<C> MetafieldRuleStore<C>
where
    C: CredentialProvider,
{
    pub fn new(api_version: impl Into<String>, credentials: Arc<C>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_version: api_version.into(),
            credentials,
        }
    }

    fn endpoint(&self, shop: &ShopDomain) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            shop, self.api_version
        )
    }

    async fn execute(
        &self,
        shop: &ShopDomain,
        query: &str,
        variables: Value,
    ) -> Result<Value, RuleStoreError> {
        let credential = self.credentials.credential_for(shop).ok_or_else(|| {
            RuleStoreError::Unavailable(format!("no access credential for {shop}"))
        })?;

        let response = self
            .http
            .post(self.endpoint(shop))
            .header("X-Shopify-Access-Token", credential.expose())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|err| RuleStoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|err| RuleStoreError::Unavailable(err.to_string()))?;

        if !status.is_success() {
            return Err(RuleStoreError::Rejected(format!("GraphQL {status}: {body}")));
        }
        if let Some(messages) = graphql_errors(&body) {
            return Err(RuleStoreError::Rejected(messages));
        }

        Ok(body)
    }

    async fn shop_owner_id(&self, shop: &ShopDomain) -> Result<String, RuleStoreError> {
        let body = self.execute(shop, SHOP_ID_QUERY, json!({})).await?;
        body.pointer("/data/shop/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RuleStoreError::Rejected("response missing shop id".to_string()))
    }
}

impl<C> RuleStore for MetafieldRuleStore<C>
where
    C: CredentialProvider + 'static,
{
    async fn fetch(&self, shop: &ShopDomain) -> Result<Option<WholesaleRule>, RuleStoreError> {
        let variables = json!({ "namespace": METAFIELD_NAMESPACE, "key": METAFIELD_KEY });
        let body = self.execute(shop, RULE_QUERY, variables).await?;

        match body
            .pointer("/data/shop/metafield/value")
            .and_then(Value::as_str)
        {
            Some(raw) => decode_rule(raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, shop: &ShopDomain, rule: &WholesaleRule) -> Result<(), RuleStoreError> {
        let owner_id = self.shop_owner_id(shop).await?;
        let value = serde_json::to_string(rule)
            .map_err(|err| RuleStoreError::Rejected(err.to_string()))?;

        let variables = json!({
            "metafields": [{
                "ownerId": owner_id,
                "namespace": METAFIELD_NAMESPACE,
                "key": METAFIELD_KEY,
                "type": "json",
                "value": value,
            }],
        });
        let body = self.execute(shop, RULE_MUTATION, variables).await?;

        let user_errors = body
            .pointer("/data/metafieldsSet/userErrors")
            .and_then(Value::as_array)
            .filter(|errors| !errors.is_empty());
        if let Some(errors) = user_errors {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|error| error.get("message").and_then(Value::as_str))
                .collect();
            return Err(RuleStoreError::Rejected(messages.join("; ")));
        }

        Ok(())
    }
}

fn decode_rule(raw: &str) -> Result<WholesaleRule, RuleStoreError> {
    serde_json::from_str(raw)
        .map_err(|err| RuleStoreError::Rejected(format!("stored rule is malformed: {err}")))
}

fn graphql_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors").and_then(Value::as_array)?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|error| error.get("message").and_then(Value::as_str))
        .collect();
    Some(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_stored_metafield_value() {
        let rule = decode_rule(r#"{"wholesaleTag":"VIP","thresholdCents":50000}"#)
            .expect("valid stored rule");
        assert_eq!(rule.wholesale_tag, "VIP");
        assert_eq!(rule.threshold_cents, 50_000);
    }

    #[test]
    fn malformed_stored_values_are_rejected() {
        assert!(matches!(
            decode_rule("not json"),
            Err(RuleStoreError::Rejected(_))
        ));
    }

    #[test]
    fn collects_graphql_error_messages() {
        let body = json!({ "errors": [{ "message": "throttled" }, { "message": "bad query" }] });
        assert_eq!(
            graphql_errors(&body).as_deref(),
            Some("throttled; bad query")
        );
        assert!(graphql_errors(&json!({ "data": {} })).is_none());
    }
}
