use super::{AppState, MAX_IMAGE_SIZE_BYTES, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

pub fn create_app(state: AppState) -> Router {
    // Configure the router with all API endpoints
    Router::new()
        // Image operations
        .route("/generate", post(handlers::generate_image))
        .route("/enhance", post(handlers::enhance_image))
        // Usage accounting
        .route(
            "/usage",
            get(handlers::get_usage).post(handlers::record_usage),
        )
        // Apply a layer to limit the maximum size of request bodies
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE_BYTES))
        // The studio front end runs in the browser on another origin
        .layer(CorsLayer::permissive())
        // Add tracing for HTTP requests and responses
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        // Provide the shared state
        .with_state(state)
}
