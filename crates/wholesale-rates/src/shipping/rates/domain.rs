use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_CURRENCY: &str = "USD";

/// One line item on the inbound rate callback. Prices are minor units per
/// unit of quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct RateItem {
    pub price: f64,
    pub quantity: i64,
}

/// Decoded carrier callback request.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRequest {
    pub currency: String,
    pub items: Vec<RateItem>,
    pub customer_tags: Vec<String>,
}

impl Default for RateRequest {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            items: Vec::new(),
            customer_tags: Vec::new(),
        }
    }
}

/// The request body did not contain a `rate` object. This is the only
/// protocol break the callback reports; everything else degrades to defaults.
#[derive(Debug, thiserror::Error)]
#[error("request body is missing a rate object")]
pub struct InvalidRatePayload;

impl RateRequest {
    /// Decode a callback body. Only an unparseable body or a missing/non-object
    /// `rate` key is an error; malformed fields inside the rate object fall
    /// back to defaults so a quote can always be produced.
    pub fn from_body(body: &str) -> Result<Self, InvalidRatePayload> {
        let value: Value = serde_json::from_str(body).map_err(|_| InvalidRatePayload)?;
        let rate = value
            .get("rate")
            .filter(|rate| rate.is_object())
            .ok_or(InvalidRatePayload)?;
        Ok(Self::from_value(rate))
    }

    fn from_value(rate: &Value) -> Self {
        let currency = rate
            .get("currency")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|currency| !currency.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string();

        let items = rate
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RateItem::from_value).collect())
            .unwrap_or_default();

        let customer_tags = rate.get("customer").map(customer_tags).unwrap_or_default();

        Self {
            currency,
            items,
            customer_tags,
        }
    }
}

impl RateItem {
    fn from_value(item: &Value) -> Self {
        Self {
            price: lenient_number(item.get("price")),
            quantity: lenient_number(item.get("quantity")) as i64,
        }
    }
}

/// Numeric coercion matching what the platform actually sends: numbers,
/// numeric strings, or junk. Anything unparseable counts as 0 so a single bad
/// line item cannot take down the quote.
fn lenient_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite()).unwrap_or(0.0)
}

/// Tags arrive either as a comma-joined string or as an array; some payloads
/// use the singular `tag` key. Each tag is trimmed, empties dropped.
fn customer_tags(customer: &Value) -> Vec<String> {
    match customer.get("tags").or_else(|| customer.get("tag")) {
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Outbound rate offer in the carrier service response shape. `total_price`
/// is a string-encoded integer of minor units, as the platform expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateOffer {
    pub service_name: String,
    pub service_code: String,
    pub total_price: String,
    pub currency: String,
    pub description: String,
}
