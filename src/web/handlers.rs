// API handlers for the web server

use super::{
    AppState,
    error::ApiError,
    extract_request_data::extract_studio_form,
    image_codec::{ImageProbe, probe_image},
    models::*,
};
use crate::enhancement::EnhancementType;
use crate::models::UsageSummary;
use crate::pricing;
use axum::{
    Json,
    extract::{Multipart, State},
};
use base64::prelude::{BASE64_STANDARD, Engine as _};
use tracing::{debug, info};
use uuid::Uuid;

// --- POST /generate ---
// Forwards the uploaded image and prompt to the generative model and returns
// the generated image as a data URL.
pub async fn generate_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let form = extract_studio_form(multipart).await?;

    let prompt = form.text("prompt").unwrap_or("").trim().to_string();
    if !form.has_image() || prompt.is_empty() {
        return Err(ApiError::BadRequest(
            "Image and prompt are required".to_string(),
        ));
    }

    let model = resolve_model(form.text("model"))?;

    let request_id = Uuid::new_v4();
    info!(
        "Generate request: model={}, prompt_len={}, request_id={}",
        model,
        prompt.len(),
        request_id
    );

    let (image_data, content_type) = form.into_image().expect("image presence checked above");
    let (image_data, probe) = decode_upload(image_data, content_type).await?;

    let image_base64 = BASE64_STANDARD.encode(&image_data);
    let outcome = state
        .gemini
        .generate_content(&model, &prompt, &image_base64, probe.mime_type)
        .await?;

    let generated = outcome.image.ok_or_else(|| {
        ApiError::BadGateway("Generative model returned no image data".to_string())
    })?;
    let generated_image = data_url(&generated.mime_type, &generated.data);

    // Usage recording is a side effect; the generation response never
    // depends on it. Token count is estimated from the prompt length.
    let tokens = estimated_tokens(&prompt);
    let recorded = state
        .usage
        .write()
        .await
        .record_usage(&model, tokens, "image-generation");
    debug!(
        "Usage recorded: request_id={}, tokens={}, cost={}",
        request_id, tokens, recorded.incremental_cost
    );

    Ok(Json(GenerateImageResponse {
        generated_image,
        error: None,
    }))
}

// --- POST /enhance ---
// Applies one of the fixed enhancement presets: the preset's prompt and the
// image go to the model, and the model's commentary comes back alongside the
// image data URL.
pub async fn enhance_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EnhanceImageResponse>, ApiError> {
    let form = extract_studio_form(multipart).await?;

    if !form.has_image() {
        return Err(ApiError::BadRequest("Image is required".to_string()));
    }

    let enhancement_type = match form.text("enhancementType") {
        None | Some("") => EnhancementType::default(),
        Some(value) => EnhancementType::parse(value)
            .ok_or_else(|| ApiError::BadRequest("Invalid enhancement type".to_string()))?,
    };

    let model = resolve_model(form.text("model"))?;

    let request_id = Uuid::new_v4();
    info!(
        "Enhance request: model={}, enhancement_type={}, request_id={}",
        model,
        enhancement_type.as_str(),
        request_id
    );

    let (image_data, content_type) = form.into_image().expect("image presence checked above");
    let (image_data, probe) = decode_upload(image_data, content_type).await?;

    let image_base64 = BASE64_STANDARD.encode(&image_data);
    let outcome = state
        .gemini
        .generate_content(
            &model,
            enhancement_type.prompt(),
            &image_base64,
            probe.mime_type,
        )
        .await?;

    // The enhanced result echoes the input image; the model's text is
    // surfaced as the enhancement report.
    Ok(Json(EnhanceImageResponse {
        enhanced_image: data_url(probe.mime_type, &image_base64),
        enhancement_type: enhancement_type.as_str().to_string(),
        model,
        message: outcome.text.unwrap_or_default(),
        error: None,
    }))
}

// --- POST /usage ---
// Records one usage event against today's ledger record.
pub async fn record_usage(
    State(state): State<AppState>,
    Json(payload): Json<RecordUsageRequest>,
) -> Result<Json<RecordUsageResponse>, ApiError> {
    let model = payload.model.as_deref().unwrap_or(pricing::DEFAULT_MODEL);
    let tokens_used = payload.tokens_used.unwrap_or(0.0).max(0.0) as u64;
    let request_type = payload
        .request_type
        .as_deref()
        .unwrap_or("image-generation");

    let recorded = state
        .usage
        .write()
        .await
        .record_usage(model, tokens_used, request_type);

    Ok(Json(RecordUsageResponse {
        success: true,
        updated_usage: recorded.record,
        estimated_cost: recorded.incremental_cost,
    }))
}

// --- GET /usage ---
// Returns the dashboard summary: today's record, totals, quota status,
// pricing, recent history, and the billing block.
pub async fn get_usage(State(state): State<AppState>) -> Result<Json<UsageSummary>, ApiError> {
    Ok(Json(state.usage.read().await.summary()))
}

// --- Helpers ---

fn resolve_model(requested: Option<&str>) -> Result<String, ApiError> {
    let model = match requested {
        None | Some("") => pricing::DEFAULT_MODEL,
        Some(model) => model,
    };
    if !pricing::is_known_model(model) {
        return Err(ApiError::BadRequest("Invalid model selected".to_string()));
    }
    Ok(model.to_string())
}

// Decoding runs on the blocking pool; uploads can be large.
async fn decode_upload(
    image_data: Vec<u8>,
    content_type: Option<String>,
) -> Result<(Vec<u8>, ImageProbe), ApiError> {
    tokio::task::spawn_blocking(move || {
        probe_image(&image_data, content_type.as_deref()).map(|probe| (image_data, probe))
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("Image decode task failed: {}", e)))?
}

// Rough token estimate from the prompt length; never below the floor the
// billing table assumes for a single request.
fn estimated_tokens(prompt: &str) -> u64 {
    (prompt.len() as u64 * 3 / 2).max(100)
}

fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}
