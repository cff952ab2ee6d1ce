use axum::extract::Multipart;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::error::ApiError;

/// The fields of a studio upload form: one "image" file plus any number of
/// named text fields (prompt, model, enhancementType, ...).
pub struct StudioForm {
    image_data: Option<Vec<u8>>,
    image_content_type: Option<String>,
    text_fields: HashMap<String, String>,
}

impl StudioForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(String::as_str)
    }

    pub fn has_image(&self) -> bool {
        self.image_data.is_some()
    }

    /// The uploaded image bytes and the content type the client declared
    /// for them, if any.
    pub fn into_image(self) -> Option<(Vec<u8>, Option<String>)> {
        self.image_data.map(|data| (data, self.image_content_type))
    }
}

/// Walks all multipart fields, keeping the "image" file and collecting the
/// rest as text.
pub async fn extract_studio_form(mut multipart: Multipart) -> Result<StudioForm, ApiError> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut image_content_type: Option<String> = None;
    let mut text_fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to process multipart field: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            debug!("Ignoring unnamed multipart field");
            continue;
        };

        if name == "image" {
            if image_data.is_some() {
                warn!("Multiple 'image' fields found in multipart request, using the last one");
            }

            let content_type = field.content_type().map(str::to_string);
            debug!("Received image with content type: {:?}", content_type);

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image data: {}", e)))?
                .to_vec();

            if data.is_empty() {
                return Err(ApiError::BadRequest(
                    "Uploaded 'image' field is empty.".to_string(),
                ));
            }

            image_data = Some(data);
            image_content_type = content_type;
        } else {
            let value = field.text().await.map_err(|e| {
                ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e))
            })?;
            text_fields.insert(name, value);
        }
    }

    Ok(StudioForm {
        image_data,
        image_content_type,
        text_fields,
    })
}
