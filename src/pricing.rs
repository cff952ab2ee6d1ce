// Static pricing table for the supported generative models.
// Free-tier quotas and paid rates are the published estimates for the
// Google AI API; they feed both quota derivation and per-event cost.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model used when the caller does not name one, or names one we don't know.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Models accepted by the generation and enhancement endpoints.
pub const KNOWN_MODELS: [&str; 3] = [
    "gemini-2.5-flash-image-preview",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Daily free-tier quotas for one model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FreeTierLimits {
    pub requests_per_day: u64,
    pub tokens_per_day: u64,
}

/// Paid rates applied once the free tier is exhausted (and used for the
/// running cost estimate regardless of tier).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaidRates {
    pub cost_per_request: f64,
    pub cost_per_token: f64,
}

/// Quota caps and cost rates associated with one model identifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingEntry {
    pub free_tier: FreeTierLimits,
    pub paid: PaidRates,
}

impl PricingEntry {
    /// Incremental cost of one recorded event under this entry.
    pub fn event_cost(&self, tokens_used: u64) -> f64 {
        self.paid.cost_per_request + tokens_used as f64 * self.paid.cost_per_token
    }
}

const fn entry(
    requests_per_day: u64,
    tokens_per_day: u64,
    cost_per_request: f64,
    cost_per_token: f64,
) -> PricingEntry {
    PricingEntry {
        free_tier: FreeTierLimits {
            requests_per_day,
            tokens_per_day,
        },
        paid: PaidRates {
            cost_per_request,
            cost_per_token,
        },
    }
}

/// Resolves the pricing entry for a model identifier, falling back to the
/// default model's entry when the identifier is unknown. Never fails.
pub fn pricing_for_model(model: &str) -> PricingEntry {
    match model {
        "gemini-2.5-flash-image-preview" => entry(100, 10_000, 0.0005, 0.000_001),
        "gemini-1.5-flash" => entry(150, 15_000, 0.0003, 0.000_000_8),
        "gemini-1.5-pro" => entry(50, 5_000, 0.001, 0.000_002),
        _ => default_pricing(),
    }
}

pub fn default_pricing() -> PricingEntry {
    pricing_for_model(DEFAULT_MODEL)
}

pub fn is_known_model(model: &str) -> bool {
    KNOWN_MODELS.contains(&model)
}

/// Full table, keyed by model identifier, for the usage summary payload.
pub fn pricing_table() -> BTreeMap<&'static str, PricingEntry> {
    KNOWN_MODELS
        .iter()
        .map(|model| (*model, pricing_for_model(model)))
        .collect()
}
