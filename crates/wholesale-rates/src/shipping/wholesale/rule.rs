use serde::{Deserialize, Serialize};

pub const DEFAULT_WHOLESALE_TAG: &str = "Wholesaler";
pub const DEFAULT_THRESHOLD_CENTS: i64 = 100_000;

/// Per-shop rule controlling wholesale shipping treatment: which customer tag
/// marks a wholesale buyer, and the order subtotal (minor units) from which
/// shipping becomes free.
///
/// Field names serialize in camelCase so the stored metafield value keeps the
/// `{"wholesaleTag":...,"thresholdCents":...}` shape the admin UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleRule {
    pub wholesale_tag: String,
    pub threshold_cents: i64,
}

impl WholesaleRule {
    /// Validate and build a rule. The tag is trimmed and must be non-empty;
    /// the threshold must be finite and non-negative, and is stored as whole
    /// cents.
    pub fn new(tag: &str, threshold_cents: f64) -> Result<Self, RuleValidationError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(RuleValidationError::EmptyTag);
        }
        if !threshold_cents.is_finite() || threshold_cents < 0.0 {
            return Err(RuleValidationError::InvalidThreshold {
                value: threshold_cents,
            });
        }

        Ok(Self {
            wholesale_tag: tag.to_string(),
            threshold_cents: threshold_cents.round() as i64,
        })
    }
}

impl Default for WholesaleRule {
    fn default() -> Self {
        Self {
            wholesale_tag: DEFAULT_WHOLESALE_TAG.to_string(),
            threshold_cents: DEFAULT_THRESHOLD_CENTS,
        }
    }
}

/// Partial update accepted by the configuration endpoint. Absent fields fall
/// back to the built-in defaults rather than the currently stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleRuleDraft {
    #[serde(default)]
    pub wholesale_tag: Option<String>,
    #[serde(default)]
    pub threshold_cents: Option<f64>,
}

impl WholesaleRuleDraft {
    pub fn resolve(self) -> Result<WholesaleRule, RuleValidationError> {
        let tag = self
            .wholesale_tag
            .unwrap_or_else(|| DEFAULT_WHOLESALE_TAG.to_string());
        let threshold = self
            .threshold_cents
            .unwrap_or(DEFAULT_THRESHOLD_CENTS as f64);
        WholesaleRule::new(&tag, threshold)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleValidationError {
    #[error("wholesaleTag must not be empty")]
    EmptyTag,
    #[error("thresholdCents must be a finite number >= 0, got {value}")]
    InvalidThreshold { value: f64 },
}
