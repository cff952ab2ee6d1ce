// Usage accounting: the daily ledger and the operations on it.
//
// The service owns the ledger exclusively; it is constructed in main and
// shared with the handlers behind an Arc<RwLock<...>>, so concurrent
// requests serialize their increments instead of racing. State lives for
// the process only; a restart starts an empty ledger.

use crate::models::{
    BillingInfo, DailyUsageRecord, QuotaStatus, UsagePercentages, UsageSummary, UsageTotals,
};
use crate::pricing;
use chrono::Utc;
use tracing::debug;

const OVER_LIMIT_MESSAGE: &str =
    "You have exceeded your free tier limits. Charges will apply to additional usage.";
const APPROACHING_LIMIT_MESSAGE: &str =
    "You are approaching your free tier limits. Consider monitoring your usage.";
const WITHIN_LIMITS_MESSAGE: &str = "You are within your free tier limits.";

/// Result of recording one usage event: the updated day record and the
/// incremental cost of just this event.
#[derive(Debug, Clone)]
pub struct RecordedUsage {
    pub record: DailyUsageRecord,
    pub incremental_cost: f64,
}

/// Accumulates per-day request/token counters and derives quota status and
/// cost estimates from them plus the static pricing table.
#[derive(Default)]
pub struct UsageAccounting {
    // Insertion-ordered, one record per distinct date.
    ledger: Vec<DailyUsageRecord>,
}

impl UsageAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one usage event against today's record (UTC).
    pub fn record_usage(
        &mut self,
        model: &str,
        tokens_used: u64,
        request_type: &str,
    ) -> RecordedUsage {
        let today = today_key();
        self.record_usage_on(&today, model, tokens_used, request_type)
    }

    /// Records one usage event against an explicit date key.
    pub fn record_usage_on(
        &mut self,
        date: &str,
        model: &str,
        tokens_used: u64,
        request_type: &str,
    ) -> RecordedUsage {
        let entry = pricing::pricing_for_model(model);
        let cost = entry.event_cost(tokens_used);

        let index = match self.ledger.iter().position(|r| r.date == date) {
            Some(index) => index,
            None => {
                self.ledger.push(DailyUsageRecord::zeroed(date));
                self.ledger.len() - 1
            }
        };
        let record = &mut self.ledger[index];

        record.requests += 1;
        record.tokens_used += tokens_used;
        record.estimated_cost += cost;

        debug!(
            date,
            model,
            tokens_used,
            request_type,
            cost,
            "recorded usage event"
        );

        RecordedUsage {
            record: record.clone(),
            incremental_cost: cost,
        }
    }

    /// Derives the dashboard summary relative to today (UTC). Pure read.
    pub fn summary(&self) -> UsageSummary {
        self.summary_on(&today_key())
    }

    /// Derives the dashboard summary relative to an explicit date key.
    pub fn summary_on(&self, today: &str) -> UsageSummary {
        let current_usage = self
            .ledger
            .iter()
            .find(|r| r.date == today)
            .cloned()
            .unwrap_or_else(|| DailyUsageRecord::zeroed(today));

        let total_usage = self.ledger.iter().fold(UsageTotals::default(), |mut acc, r| {
            acc.requests += r.requests;
            acc.tokens += r.tokens_used;
            acc.cost += r.estimated_cost;
            acc
        });

        let limits = pricing::default_pricing().free_tier;
        let requests_percent =
            current_usage.requests as f64 / limits.requests_per_day as f64 * 100.0;
        let tokens_percent = current_usage.tokens_used as f64 / limits.tokens_per_day as f64 * 100.0;

        // Threshold checks are strict and use the unrounded percentages;
        // rounding is display-only.
        let is_approaching_limit = requests_percent > 80.0 || tokens_percent > 80.0;
        let is_over_limit = requests_percent > 100.0 || tokens_percent > 100.0;

        let message = if is_over_limit {
            OVER_LIMIT_MESSAGE
        } else if is_approaching_limit {
            APPROACHING_LIMIT_MESSAGE
        } else {
            WITHIN_LIMITS_MESSAGE
        };

        let recent_start = self.ledger.len().saturating_sub(7);
        let recent_usage = self.ledger[recent_start..].to_vec();

        let estimated_monthly_cost = total_usage.cost * 30.0;

        UsageSummary {
            current_usage,
            total_usage,
            free_tier_limits: limits,
            usage_percentages: UsagePercentages {
                requests: requests_percent.round() as u64,
                tokens: tokens_percent.round() as u64,
            },
            status: QuotaStatus {
                is_approaching_limit,
                is_over_limit,
                message: message.to_string(),
            },
            pricing: pricing::pricing_table(),
            recent_usage,
            billing_info: BillingInfo {
                free_tier_active: !is_over_limit,
                estimated_monthly_cost,
                next_billing_date: "N/A (Free Tier)".to_string(),
                payment_method: "Credit Card on file".to_string(),
            },
        }
    }
}

fn today_key() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "2024-03-01";

    #[test]
    fn test_first_event_creates_record() {
        let mut accounting = UsageAccounting::new();
        let recorded = accounting.record_usage_on(DAY, "gemini-1.5-flash", 1000, "image-generation");

        assert_eq!(recorded.record.date, DAY);
        assert_eq!(recorded.record.requests, 1);
        assert_eq!(recorded.record.tokens_used, 1000);
        // 0.0003 + 1000 * 0.0000008
        assert!((recorded.record.estimated_cost - 0.0011).abs() < 1e-9);
        assert!((recorded.incremental_cost - 0.0011).abs() < 1e-9);
        assert_eq!(accounting.summary_on(DAY).recent_usage.len(), 1);
    }

    #[test]
    fn test_same_day_events_accumulate() {
        let mut accounting = UsageAccounting::new();
        let first = accounting.record_usage_on(DAY, "gemini-1.5-flash", 500, "image-generation");
        let second = accounting.record_usage_on(DAY, "gemini-1.5-flash", 500, "image-generation");

        assert_eq!(second.record.requests, 2);
        assert_eq!(second.record.tokens_used, 1000);
        let expected = first.incremental_cost + second.incremental_cost;
        assert!((second.record.estimated_cost - expected).abs() < 1e-12);
        assert_eq!(accounting.summary_on(DAY).recent_usage.len(), 1);
    }

    #[test]
    fn test_cost_is_sum_of_per_event_costs_across_models() {
        let mut accounting = UsageAccounting::new();
        let events = [
            ("gemini-1.5-flash", 250_u64),
            ("gemini-1.5-pro", 1200),
            ("gemini-2.5-flash-image-preview", 0),
            ("unknown-model", 333),
        ];

        let mut expected = 0.0;
        for (model, tokens) in events {
            let recorded = accounting.record_usage_on(DAY, model, tokens, "image-generation");
            expected += pricing::pricing_for_model(model).event_cost(tokens);
            assert!((recorded.record.estimated_cost - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cost_is_monotonically_non_decreasing() {
        let mut accounting = UsageAccounting::new();
        let mut previous = 0.0;
        for tokens in [0, 10, 0, 5000, 1] {
            let recorded = accounting.record_usage_on(DAY, "gemini-1.5-pro", tokens, "edit");
            assert!(recorded.record.estimated_cost >= previous);
            previous = recorded.record.estimated_cost;
        }
    }

    #[test]
    fn test_unknown_model_uses_default_pricing() {
        let mut accounting = UsageAccounting::new();
        let recorded = accounting.record_usage_on(DAY, "not-a-model", 100, "image-generation");
        let expected = pricing::default_pricing().event_cost(100);
        assert!((recorded.incremental_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn test_summary_totals_cover_all_dates() {
        let mut accounting = UsageAccounting::new();
        accounting.record_usage_on("2024-03-01", "gemini-1.5-flash", 100, "image-generation");
        accounting.record_usage_on("2024-03-02", "gemini-1.5-flash", 200, "image-generation");
        accounting.record_usage_on("2024-03-02", "gemini-1.5-pro", 300, "image-generation");

        let summary = accounting.summary_on("2024-03-02");
        assert_eq!(summary.total_usage.requests, 3);
        assert_eq!(summary.total_usage.tokens, 600);

        let expected_cost = pricing::pricing_for_model("gemini-1.5-flash").event_cost(100)
            + pricing::pricing_for_model("gemini-1.5-flash").event_cost(200)
            + pricing::pricing_for_model("gemini-1.5-pro").event_cost(300);
        assert!((summary.total_usage.cost - expected_cost).abs() < 1e-12);

        assert_eq!(summary.current_usage.requests, 2);
        assert_eq!(summary.current_usage.tokens_used, 500);
    }

    #[test]
    fn test_summary_on_absent_date_is_zeroed() {
        let mut accounting = UsageAccounting::new();
        accounting.record_usage_on("2024-03-01", "gemini-1.5-flash", 100, "image-generation");

        let summary = accounting.summary_on("2024-03-05");
        assert_eq!(summary.current_usage, DailyUsageRecord::zeroed("2024-03-05"));
        // Totals still cover the whole ledger.
        assert_eq!(summary.total_usage.requests, 1);
    }

    #[test]
    fn test_percentage_rounding() {
        let mut accounting = UsageAccounting::new();
        // Default model free tier: 100 requests/day, 10000 tokens/day.
        // 33 requests -> 33%; 3333 tokens -> 33.33% -> rounds to 33.
        for _ in 0..33 {
            accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 101, "gen");
        }
        let summary = accounting.summary_on(DAY);
        assert_eq!(summary.usage_percentages.requests, 33);
        assert_eq!(summary.current_usage.tokens_used, 3333);
        assert_eq!(summary.usage_percentages.tokens, 33);
    }

    #[test]
    fn test_exactly_eighty_percent_is_not_approaching() {
        let mut accounting = UsageAccounting::new();
        for _ in 0..80 {
            accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 0, "gen");
        }
        let summary = accounting.summary_on(DAY);
        assert_eq!(summary.usage_percentages.requests, 80);
        assert!(!summary.status.is_approaching_limit);
        assert!(!summary.status.is_over_limit);
    }

    #[test]
    fn test_just_over_eighty_percent_is_approaching() {
        let mut accounting = UsageAccounting::new();
        for _ in 0..81 {
            accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 0, "gen");
        }
        let summary = accounting.summary_on(DAY);
        assert!(summary.status.is_approaching_limit);
        assert!(!summary.status.is_over_limit);
        assert_eq!(summary.status.message, APPROACHING_LIMIT_MESSAGE);
    }

    #[test]
    fn test_exactly_one_hundred_percent_is_not_over() {
        let mut accounting = UsageAccounting::new();
        for _ in 0..100 {
            accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 0, "gen");
        }
        let summary = accounting.summary_on(DAY);
        assert_eq!(summary.usage_percentages.requests, 100);
        assert!(summary.status.is_approaching_limit);
        assert!(!summary.status.is_over_limit);
        assert!(summary.billing_info.free_tier_active);
    }

    #[test]
    fn test_over_one_hundred_percent_is_over() {
        let mut accounting = UsageAccounting::new();
        for _ in 0..101 {
            accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 0, "gen");
        }
        let summary = accounting.summary_on(DAY);
        assert!(summary.status.is_over_limit);
        assert_eq!(summary.status.message, OVER_LIMIT_MESSAGE);
        assert!(!summary.billing_info.free_tier_active);
    }

    #[test]
    fn test_token_percentage_alone_can_trip_flags() {
        let mut accounting = UsageAccounting::new();
        // One request (1% of requests) but 10001 tokens (>100% of tokens).
        accounting.record_usage_on(DAY, "gemini-2.5-flash-image-preview", 10_001, "gen");
        let summary = accounting.summary_on(DAY);
        assert!(summary.status.is_over_limit);
    }

    #[test]
    fn test_recent_usage_keeps_last_seven_in_order() {
        let mut accounting = UsageAccounting::new();
        for day in 1..=9 {
            let date = format!("2024-03-{:02}", day);
            accounting.record_usage_on(&date, "gemini-1.5-flash", day, "gen");
        }

        let summary = accounting.summary_on("2024-03-09");
        assert_eq!(summary.recent_usage.len(), 7);
        assert_eq!(summary.recent_usage.first().unwrap().date, "2024-03-03");
        assert_eq!(summary.recent_usage.last().unwrap().date, "2024-03-09");
    }

    #[test]
    fn test_estimated_monthly_cost() {
        let mut accounting = UsageAccounting::new();
        accounting.record_usage_on(DAY, "gemini-1.5-flash", 1000, "gen");
        let summary = accounting.summary_on(DAY);
        assert!((summary.billing_info.estimated_monthly_cost - 0.0011 * 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_usage_resolves_today() {
        let mut accounting = UsageAccounting::new();
        let recorded = accounting.record_usage("gemini-1.5-flash", 10, "image-generation");
        assert_eq!(recorded.record.requests, 1);
        // The date key is an ISO date, e.g. 2026-08-05.
        assert_eq!(recorded.record.date.len(), 10);
        assert_eq!(&recorded.record.date[4..5], "-");
    }
}
