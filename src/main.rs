// Main entry point for the imgstudio-server application.
// Sets up the Tokio runtime, initializes services (usage accounting, Gemini
// client), configures the Axum router, and starts the HTTP server.

mod accounting;
mod config;
mod enhancement;
mod gemini;
mod models;
mod pricing;
mod shutdown_signal;
mod web;

use accounting::UsageAccounting;
use clap::Parser;
use config::AppConfig;
use gemini::GeminiClient;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Level;
use web::AppState;

#[tokio::main]
async fn main() {
    // Parse command line args and environment variables
    let config = AppConfig::parse();

    // Initialize tracing subscriber for structured logging.
    // Logs will go to stdout. Adjust level and format as needed.
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true) // Include module path in logs
        .with_file(true) // Include source file name
        .with_line_number(true) // Include line numbers
        .init();

    tracing::info!("Starting imgstudio-server...");

    // --- Initialize GeminiClient ---
    let gemini_client = GeminiClient::new(config.api_key.clone(), config.gemini_base_url.clone());
    if gemini_client.has_api_key() {
        tracing::info!(
            "Gemini client initialized against {}",
            config.gemini_base_url
        );
    } else {
        tracing::warn!(
            "No API key configured (GOOGLE_GENERATIVE_AI_API_KEY). The server will run, but generation and enhancement requests will fail."
        );
    }

    // --- Initialize UsageAccounting ---
    // The ledger is in-memory and process-scoped: it starts empty on every
    // launch and is shared with the handlers behind a lock.
    let usage_accounting = Arc::new(RwLock::new(UsageAccounting::new()));
    tracing::info!("Usage accounting initialized with an empty ledger.");

    // --- Build Axum Application Router ---
    let app = web::create_app(AppState {
        usage: usage_accounting,
        gemini: Arc::new(gemini_client),
    });

    tracing::info!("Axum router configured.");

    // --- Start HTTP Server ---
    let listener = match web::create_listener(&config.host, config.port).await {
        Ok((addr, l)) => {
            tracing::info!("Server successfully bound. Listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("FATAL: Failed to bind server: {}", e);
            eprintln!("FATAL: Could not bind server. Error: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    // Run the server.
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal::shutdown_signal())
        .await
    {
        tracing::error!("Server run error: {}", e);
        eprintln!("ERROR: Server shut down unexpectedly. Error: {}", e);
    }

    tracing::info!("imgstudio-server has shut down.");
}
