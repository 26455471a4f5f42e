//! Axum route handler for resume analysis.

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::prompts::RESUME_REVIEW_PROMPT;
use crate::analysis::request::{read_analysis_request, MISSING_FIELDS_MESSAGE};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub response: String,
}

/// POST /analyze-resume
///
/// Validate form → render first page → ask the model. Stops at the first failure.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let multipart = multipart.map_err(|e| {
        warn!("Not a multipart request: {e}");
        AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    })?;

    let request = read_analysis_request(multipart, state.config.max_upload_bytes).await?;
    info!(
        "Analyzing resume '{}' ({} bytes, {:?}) against a {}-char job description",
        request.resume.file_name,
        request.resume.bytes.len(),
        request.resume.content_type,
        request.job_description.len()
    );

    let image = state.converter.convert(request.resume.bytes).await?;

    let text = state
        .model
        .generate(&request.job_description, &image, RESUME_REVIEW_PROMPT)
        .await?;

    Ok(Json(AnalysisResponse { response: text }))
}
