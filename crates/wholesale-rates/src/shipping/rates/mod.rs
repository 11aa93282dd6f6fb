mod domain;
pub(crate) mod engine;
mod router;

pub use domain::{InvalidRatePayload, RateItem, RateOffer, RateRequest, DEFAULT_CURRENCY};
pub use engine::{
    is_wholesale_customer, order_subtotal_cents, EXPRESS_RATE_CENTS, STANDARD_RATE_CENTS,
};
pub use router::{rate_router, SHOP_DOMAIN_HEADER};
