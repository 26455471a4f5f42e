mod analysis;
mod config;
mod errors;
mod llm_client;
mod pdf;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::pdf::PdfiumConverter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analysis API v{}", env!("CARGO_PKG_VERSION"));

    if config.google_api_key.is_empty() {
        warn!("GOOGLE_API_KEY is not set; analysis requests will fail at the model call");
    }

    let model = Arc::new(GeminiClient::new(&config));
    info!("Model client initialized (model: {})", llm_client::MODEL);

    let converter = Arc::new(PdfiumConverter::new(
        config.pdfium_lib_path.clone(),
        config.render_width_px,
        config.render_max_height_px,
    ));
    match &config.pdfium_lib_path {
        Some(dir) => info!("PDF converter using pdfium from {}", dir.display()),
        None => info!("PDF converter using system pdfium"),
    }

    let cors = build_cors(&config)?;

    let state = AppState {
        config: config.clone(),
        converter,
        model,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port).parse()?;
    info!("Listening on {addr} (CORS origin: {})", config.allowed_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS admitting only the configured front-end origin.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .with_context(|| format!("ALLOWED_ORIGIN '{}' is not a valid origin", config.allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}
