use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelClient;
use crate::pdf::Converter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable PDF rasteriser. Default: PdfiumConverter.
    pub converter: Arc<dyn Converter>,
    /// Pluggable model gateway. Default: GeminiClient.
    pub model: Arc<dyn ModelClient>,
}
