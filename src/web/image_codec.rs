use tracing::debug;

use super::error::ApiError;

/// What we learned about an uploaded image: its decoded dimensions and the
/// mime type used when echoing it back as a data URL.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

fn format_hint(media_type: Option<&str>) -> Result<Option<image::ImageFormat>, ApiError> {
    match media_type {
        Some("image/jpeg") => Ok(Some(image::ImageFormat::Jpeg)),
        Some("image/png") => Ok(Some(image::ImageFormat::Png)),
        Some("image/webp") => Ok(Some(image::ImageFormat::WebP)),
        // Let the decoder sniff when the client sent nothing useful.
        None | Some("application/octet-stream") => Ok(None),
        Some(other) => Err(ApiError::UnsupportedMediaType(format!(
            "Content type '{}' is not supported.",
            other
        ))),
    }
}

/// Verifies that the upload is a decodable image and reports its dimensions
/// and mime type. The declared content type is used as a decode hint; the
/// parameters after any ';' are ignored.
pub fn probe_image(file_data: &[u8], content_type_str: Option<&str>) -> Result<ImageProbe, ApiError> {
    let media_type = content_type_str.map(|s| s[0..s.find(';').unwrap_or(s.len())].trim());

    let hint = format_hint(media_type)?;

    let (dyn_img, format) = match hint {
        Some(format) => {
            let img = image::load_from_memory_with_format(file_data, format).map_err(|e| {
                ApiError::ImageProcessingError(format!(
                    "Failed to decode image (format: {:?}): {}",
                    format, e
                ))
            })?;
            (img, format)
        }
        None => {
            let format = image::guess_format(file_data).map_err(|e| {
                ApiError::ImageProcessingError(format!(
                    "Failed to auto-detect image format: {}",
                    e
                ))
            })?;
            let img = image::load_from_memory_with_format(file_data, format).map_err(|e| {
                ApiError::ImageProcessingError(format!("Failed to decode image: {}", e))
            })?;
            (img, format)
        }
    };

    let probe = ImageProbe {
        mime_type: format.to_mime_type(),
        width: dyn_img.width(),
        height: dyn_img.height(),
    };

    debug!(
        "Input image decoded: {}x{}, mime: {}",
        probe.width, probe.height, probe.mime_type
    );

    Ok(probe)
}
