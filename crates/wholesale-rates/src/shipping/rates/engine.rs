use super::domain::{RateItem, RateOffer, RateRequest};
use crate::shipping::wholesale::WholesaleRule;

pub const STANDARD_RATE_CENTS: i64 = 899;
pub const EXPRESS_RATE_CENTS: i64 = 1599;

pub const FREE_SHIPPING_CODE: &str = "FREE_SHIPPING";
pub const STANDARD_CODE: &str = "STANDARD";
pub const EXPRESS_CODE: &str = "EXPRESS";

/// Order subtotal in minor units. Each line contributes
/// `round(price) * quantity` with negative quantities clamped to zero —
/// the price is rounded *before* multiplying, not after.
pub fn order_subtotal_cents(items: &[RateItem]) -> i64 {
    items.iter().map(line_total_cents).sum()
}

fn line_total_cents(item: &RateItem) -> i64 {
    let unit_price = if item.price.is_finite() {
        item.price.round() as i64
    } else {
        0
    };
    unit_price * item.quantity.max(0)
}

/// Exact, case-sensitive tag membership.
pub fn is_wholesale_customer(rule: &WholesaleRule, tags: &[String]) -> bool {
    tags.iter().any(|tag| tag == &rule.wholesale_tag)
}

/// Apply the decision table. Non-wholesale customers get an empty list so the
/// platform falls back to the shop's own rate setup; wholesale customers get
/// free shipping at or above the threshold, or the fixed standard/express
/// pair under it.
pub fn quote(rule: &WholesaleRule, request: &RateRequest) -> Vec<RateOffer> {
    if !is_wholesale_customer(rule, &request.customer_tags) {
        return Vec::new();
    }

    let subtotal = order_subtotal_cents(&request.items);
    if subtotal >= rule.threshold_cents {
        vec![free_shipping_offer(rule, &request.currency)]
    } else {
        vec![
            standard_offer(rule, &request.currency),
            express_offer(rule, &request.currency),
        ]
    }
}

fn free_shipping_offer(rule: &WholesaleRule, currency: &str) -> RateOffer {
    RateOffer {
        service_name: "Free Shipping".to_string(),
        service_code: FREE_SHIPPING_CODE.to_string(),
        total_price: "0".to_string(),
        currency: currency.to_string(),
        description: format!(
            "Free shipping for wholesale orders of {} or more",
            format_dollars(rule.threshold_cents)
        ),
    }
}

fn standard_offer(rule: &WholesaleRule, currency: &str) -> RateOffer {
    RateOffer {
        service_name: "Standard Shipping".to_string(),
        service_code: STANDARD_CODE.to_string(),
        total_price: STANDARD_RATE_CENTS.to_string(),
        currency: currency.to_string(),
        description: format!(
            "Standard shipping for wholesale orders under {}",
            format_dollars(rule.threshold_cents)
        ),
    }
}

fn express_offer(rule: &WholesaleRule, currency: &str) -> RateOffer {
    RateOffer {
        service_name: "Express Shipping".to_string(),
        service_code: EXPRESS_CODE.to_string(),
        total_price: EXPRESS_RATE_CENTS.to_string(),
        currency: currency.to_string(),
        description: format!(
            "Express shipping for wholesale orders under {}",
            format_dollars(rule.threshold_cents)
        ),
    }
}

fn format_dollars(cents: i64) -> String {
    if cents % 100 == 0 {
        format!("${}", cents / 100)
    } else {
        format!("${:.2}", cents as f64 / 100.0)
    }
}
