use crate::infra::InMemoryRuleStore;
use clap::Args;
use std::sync::Arc;
use wholesale_rates::error::AppError;
use wholesale_rates::shipping::rates::{RateItem, RateRequest};
use wholesale_rates::shipping::wholesale::WholesaleRuleDraft;
use wholesale_rates::shipping::{ShippingRateService, ShopDomain};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Shop domain the demo rule is stored under
    #[arg(long, default_value = "demo-shop.myshopify.com")]
    pub(crate) shop: String,
    /// Wholesale tag to store before quoting (defaults to Wholesaler)
    #[arg(long)]
    pub(crate) wholesale_tag: Option<String>,
    /// Free-shipping threshold in cents to store before quoting (defaults to 100000)
    #[arg(long)]
    pub(crate) threshold_cents: Option<f64>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        shop,
        wholesale_tag,
        threshold_cents,
    } = args;

    let shop = ShopDomain::parse(&shop)?;
    let service = Arc::new(ShippingRateService::new(Arc::new(
        InMemoryRuleStore::default(),
    )));

    let rule = service
        .update_rule(
            &shop,
            WholesaleRuleDraft {
                wholesale_tag,
                threshold_cents,
            },
        )
        .await?;

    println!("Wholesale shipping demo for {shop}");
    println!(
        "Rule: tag '{}', free shipping from {} cents",
        rule.wholesale_tag, rule.threshold_cents
    );

    let above = RateRequest {
        items: vec![RateItem {
            price: 50_000.0,
            quantity: 3,
        }],
        customer_tags: vec![rule.wholesale_tag.clone()],
        ..RateRequest::default()
    };
    let below = RateRequest {
        items: vec![RateItem {
            price: 10_000.0,
            quantity: 2,
        }],
        customer_tags: vec![rule.wholesale_tag.clone()],
        ..RateRequest::default()
    };
    let retail = RateRequest {
        items: vec![RateItem {
            price: 500_000.0,
            quantity: 1,
        }],
        customer_tags: vec!["VIP".to_string()],
        ..RateRequest::default()
    };

    let scenarios = [
        ("Wholesale order at or above the threshold", above),
        ("Wholesale order under the threshold", below),
        ("Retail customer without the wholesale tag", retail),
    ];

    for (label, request) in scenarios {
        let offers = service.quote(Some(&shop), &request).await;
        println!("\n{label}");
        if offers.is_empty() {
            println!("- no offers (platform default rates apply)");
        }
        for offer in &offers {
            println!(
                "- {} [{}] {} {}: {}",
                offer.service_name,
                offer.service_code,
                offer.total_price,
                offer.currency,
                offer.description
            );
        }
    }

    Ok(())
}
