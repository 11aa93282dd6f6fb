mod router;
mod rule;
mod store;

pub use router::{config_router, WholesaleConfigState, ACCESS_TOKEN_HEADER};
pub use rule::{
    RuleValidationError, WholesaleRule, WholesaleRuleDraft, DEFAULT_THRESHOLD_CENTS,
    DEFAULT_WHOLESALE_TAG,
};
pub use store::{RuleStore, RuleStoreError};
