// API-specific data models for the web server.
// Wire keys are camelCase to match the studio front end.

use crate::models::DailyUsageRecord;
use serde::{Deserialize, Serialize};

/// Body of POST /usage.
/// Missing fields coerce to defaults rather than failing: an absent or
/// unknown model resolves to the default pricing entry, an absent or
/// negative token count counts as zero.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordUsageRequest {
    pub model: Option<String>,
    // Accepts any JSON number; the generation token heuristic can produce
    // fractional values.
    pub tokens_used: Option<f64>,
    pub request_type: Option<String>,
}

/// Response to POST /usage.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecordUsageResponse {
    pub success: bool,
    pub updated_usage: DailyUsageRecord,
    pub estimated_cost: f64,
}

/// Response to POST /generate.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub generated_image: String,
    pub error: Option<String>,
}

/// Response to POST /enhance.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceImageResponse {
    pub enhanced_image: String,
    pub enhancement_type: String,
    pub model: String,
    pub message: String,
    pub error: Option<String>,
}
