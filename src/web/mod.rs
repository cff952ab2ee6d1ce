// Web server module: HTTP API endpoints for image generation, enhancement,
// and usage accounting.

mod app;
mod error;
mod extract_request_data;
mod handlers;
mod image_codec;
mod listeners;
mod models;

pub use app::create_app;
pub use listeners::create_listener;

use crate::accounting::UsageAccounting;
use crate::gemini::GeminiClient;
use std::sync::Arc;
use tokio::sync::RwLock;

// Maximum allowed size for image upload requests
pub const MAX_IMAGE_SIZE_BYTES: usize = 100 * 1024 * 1024; // 100MB

pub type SharedUsageAccounting = Arc<RwLock<UsageAccounting>>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub usage: SharedUsageAccounting,
    pub gemini: Arc<GeminiClient>,
}
