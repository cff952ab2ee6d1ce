// Core domain types for usage accounting and the usage summary payload.
// Serialized with camelCase keys to match the dashboard wire format.

use crate::pricing::{FreeTierLimits, PricingEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// One day's accumulated usage, keyed by ISO date (YYYY-MM-DD, UTC).
// Created on the first event for a date, mutated by every subsequent event,
// never deleted for the lifetime of the process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageRecord {
    pub date: String,
    pub requests: u64,
    pub tokens_used: u64,
    pub estimated_cost: f64,
}

impl DailyUsageRecord {
    pub fn zeroed(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            requests: 0,
            tokens_used: 0,
            estimated_cost: 0.0,
        }
    }
}

// Ledger-wide totals across all dates.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UsageTotals {
    pub requests: u64,
    pub tokens: u64,
    pub cost: f64,
}

// Today's consumption as a share of the default model's free tier,
// rounded to the nearest whole percent for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsagePercentages {
    pub requests: u64,
    pub tokens: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub is_approaching_limit: bool,
    pub is_over_limit: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub free_tier_active: bool,
    pub estimated_monthly_cost: f64,
    pub next_billing_date: String,
    pub payment_method: String,
}

/// Everything the usage dashboard needs in one read.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub current_usage: DailyUsageRecord,
    pub total_usage: UsageTotals,
    pub free_tier_limits: FreeTierLimits,
    pub usage_percentages: UsagePercentages,
    pub status: QuotaStatus,
    pub pricing: BTreeMap<&'static str, PricingEntry>,
    pub recent_usage: Vec<DailyUsageRecord>,
    pub billing_info: BillingInfo,
}
