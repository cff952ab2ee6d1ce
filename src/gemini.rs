// Client for the Google Generative Language API ("Gemini").
// One operation: send a prompt plus an inline image to a model's
// generateContent endpoint and pull text / image parts out of the reply.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug)]
pub enum GeminiError {
    // No API key was configured; detected per request, not at startup.
    ApiKeyMissing,
    Request(reqwest::Error),
    UpstreamStatus { status: u16, message: String },
    EmptyResponse,
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Request(err)
    }
}

/// Text and/or inline image returned by the model for one request.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub text: Option<String>,
    pub image: Option<InlineImage>,
}

/// Base64-encoded image data as returned by the model.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("imgstudio-server/", env!("CARGO_PKG_VERSION")))
            // Avoid hanging forever on broken upstream TCP handshakes.
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");

        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends the prompt and inline image to the model and returns whatever
    /// text/image parts the first candidate carries.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
        image_mime_type: &str,
    ) -> Result<GenerateOutcome, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::ApiKeyMissing)?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let payload = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "inlineData": { "mimeType": image_mime_type, "data": image_base64 } },
                ]
            }]
        });

        debug!(model, url, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .timeout(Duration::from_secs(120))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .unwrap_or("upstream error")
                .to_string();
            return Err(GeminiError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        outcome_from_response(body)
    }
}

// --- Response decoding ---

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

fn outcome_from_response(
    response: GenerateContentResponse,
) -> Result<GenerateOutcome, GeminiError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GeminiError::EmptyResponse)?;

    let mut text: Option<String> = None;
    let mut image: Option<InlineImage> = None;

    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(t) = part.text {
            match &mut text {
                Some(existing) => existing.push_str(&t),
                None => text = Some(t),
            }
        }
        if let Some(inline) = part.inline_data {
            // Keep the first image part; later ones are ignored.
            image.get_or_insert(InlineImage {
                mime_type: inline.mime_type,
                data: inline.data,
            });
        }
    }

    Ok(GenerateOutcome { text, image })
}
